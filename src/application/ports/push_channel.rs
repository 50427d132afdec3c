use crate::domain::entities::NotificationEvent;
use crate::domain::value_objects::{EventId, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Row-level change observed on the notification table.
///
/// Inserts carry only the id: the full record (with the denormalized sender
/// name) is refetched through the gateway before delivery. Updates carry the
/// new row as decoded by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RowChange {
    Inserted { id: EventId },
    Updated { event: NotificationEvent },
    Deleted { id: EventId },
}

/// A live push subscription. Dropping or closing it tears the transport down.
pub struct PushSubscription {
    receiver: mpsc::Receiver<RowChange>,
    reader: Option<JoinHandle<()>>,
}

impl PushSubscription {
    pub fn new(receiver: mpsc::Receiver<RowChange>) -> Self {
        Self {
            receiver,
            reader: None,
        }
    }

    pub fn with_reader(receiver: mpsc::Receiver<RowChange>, reader: JoinHandle<()>) -> Self {
        Self {
            receiver,
            reader: Some(reader),
        }
    }

    /// Next change, or `None` once the channel has closed.
    pub async fn next(&mut self) -> Option<RowChange> {
        self.receiver.recv().await
    }

    pub fn close(mut self) {
        self.abort_reader();
    }

    fn abort_reader(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        self.abort_reader();
    }
}

/// Server-initiated change feed for one recipient's notifications.
#[async_trait]
pub trait PushChannel: Send + Sync {
    async fn subscribe(&self, recipient: &UserId) -> Result<PushSubscription, AppError>;
}
