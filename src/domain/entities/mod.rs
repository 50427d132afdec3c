mod notification;
mod pending_record;
mod sync_report;

pub use notification::{NotificationEvent, NotificationKind};
pub use pending_record::{PendingCounts, PendingRecord, PendingRecordDraft, SyncState};
pub use sync_report::{KindSyncReport, SyncError, SyncReport};
