//! Offline queue, sync and notification core for the Relato
//! field-operations client.
//!
//! Submissions captured while offline land in a crash-durable local queue
//! and are replayed to the remote backend once connectivity returns; domain
//! notifications arrive over a realtime push channel with a polling loop as
//! the correctness backstop. Everything else (forms, dashboards, auth
//! screens) lives in the embedding shell and talks to this crate through
//! the service layer.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
mod state;

pub use application::ports;
pub use application::services::{
    ConnectivityMonitor, ConnectivityState, NotificationCenter, ReferenceCache, SyncEngine,
    SyncScheduler,
};
pub use domain::entities::{
    KindSyncReport, NotificationEvent, NotificationKind, PendingCounts, PendingRecord,
    PendingRecordDraft, SyncError, SyncReport, SyncState,
};
pub use domain::value_objects::{
    EncodedImage, EventId, LocalRecordId, RecordKind, RecordPayload, UserId,
};
pub use shared::{AppConfig, AppError, ImageFailurePolicy, Result};
pub use state::AppContext;

pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relato_core=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
