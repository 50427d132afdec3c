pub mod connectivity;
pub mod notification_center;
pub mod reference_cache;
pub mod sync_engine;

pub use connectivity::{ConnectivityMonitor, ConnectivityState};
pub use notification_center::NotificationCenter;
pub use reference_cache::ReferenceCache;
pub use sync_engine::{SyncEngine, SyncScheduler};
