use crate::domain::entities::{PendingCounts, PendingRecord, PendingRecordDraft};
use crate::domain::value_objects::{LocalRecordId, RecordKind};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Duration;

/// Crash-durable, append-and-scan storage for queued submissions. No network
/// calls originate behind this trait.
#[async_trait]
pub trait OfflineQueue: Send + Sync {
    /// Append a new pending record. Storage failures propagate: the caller's
    /// save action must not claim success when the record is only in memory.
    async fn enqueue(&self, draft: PendingRecordDraft) -> Result<LocalRecordId, AppError>;

    /// Pending records of one kind in replay order (oldest first).
    async fn list_pending(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError>;

    /// Flip a record to synced, stamping `synced_at` once. Idempotent.
    async fn mark_synced(&self, id: LocalRecordId, kind: RecordKind) -> Result<(), AppError>;

    /// Permanently delete a record.
    async fn remove(&self, id: LocalRecordId, kind: RecordKind) -> Result<(), AppError>;

    /// Cheap aggregate for UI badges.
    async fn count_pending(&self) -> Result<PendingCounts, AppError>;

    /// Delete synced records whose `synced_at` is older than the window.
    /// Returns the number of rows removed.
    async fn sweep_synced(&self, older_than: Duration) -> Result<u64, AppError>;
}
