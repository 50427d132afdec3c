pub mod alerts;
pub mod blob_store;
pub mod notification_gateway;
pub mod offline_queue;
pub mod push_channel;
pub mod record_sink;
pub mod reference_store;
pub mod session;

pub use alerts::{AudioSink, ChimePlayer, DesktopNotifier, ToastObserver};
pub use blob_store::BlobStore;
pub use notification_gateway::NotificationGateway;
pub use offline_queue::OfflineQueue;
pub use push_channel::{PushChannel, PushSubscription, RowChange};
pub use record_sink::RecordSink;
pub use reference_store::{ReferenceEntry, ReferenceKey, ReferenceStore};
pub use session::SessionProvider;
