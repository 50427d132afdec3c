use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

const EDGE_RESET_AFTER: Duration = Duration::from_secs(5);

/// Process-wide connectivity snapshot derived from the runtime's
/// online/offline signal. Not persisted; rebuilt from the current status on
/// every start.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConnectivityState {
    pub is_online: bool,
    /// True for a short window right after an offline→online transition,
    /// used to trigger an immediate sync attempt.
    pub just_went_online: bool,
}

/// Tracks online/offline transitions and exposes them as watchable state.
///
/// The embedding shell feeds transitions in via `handle_online` /
/// `handle_offline`; consumers either read the snapshot or subscribe to the
/// watch channel for edges.
pub struct ConnectivityMonitor {
    tx: watch::Sender<ConnectivityState>,
    /// Bumped on every transition so a pending edge reset from an earlier
    /// transition cannot clear a newer edge.
    epoch: Arc<AtomicU64>,
    reset_after: Duration,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        Self::with_reset_after(initially_online, EDGE_RESET_AFTER)
    }

    pub fn with_reset_after(initially_online: bool, reset_after: Duration) -> Self {
        let (tx, _) = watch::channel(ConnectivityState {
            is_online: initially_online,
            just_went_online: false,
        });
        Self {
            tx,
            epoch: Arc::new(AtomicU64::new(0)),
            reset_after,
        }
    }

    /// Runtime went online. Raises the edge flag and schedules its reset,
    /// which fires even if nobody reacted to the edge.
    pub fn handle_online(&self) {
        let raised_at = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(ConnectivityState {
            is_online: true,
            just_went_online: true,
        });
        debug!("connectivity: online");

        let tx = self.tx.clone();
        let epoch = Arc::clone(&self.epoch);
        let reset_after = self.reset_after;
        tokio::spawn(async move {
            tokio::time::sleep(reset_after).await;
            if epoch.load(Ordering::SeqCst) == raised_at {
                tx.send_modify(|state| state.just_went_online = false);
            }
        });
    }

    /// Runtime went offline. Clears any lingering edge immediately.
    pub fn handle_offline(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(ConnectivityState {
            is_online: false,
            just_went_online: false,
        });
        debug!("connectivity: offline");
    }

    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state().is_online
    }

    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}
