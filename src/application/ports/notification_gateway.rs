use crate::domain::entities::NotificationEvent;
use crate::domain::value_objects::{EventId, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Remote notification table operations.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Most recent events for the recipient, newest first.
    async fn recent(&self, recipient: &UserId, limit: u32)
        -> Result<Vec<NotificationEvent>, AppError>;

    /// Events with `id > after`, ascending by id. The polling backstop.
    async fn after(
        &self,
        recipient: &UserId,
        after: EventId,
    ) -> Result<Vec<NotificationEvent>, AppError>;

    /// Full event record, including the denormalized sender name.
    async fn by_id(&self, id: EventId) -> Result<Option<NotificationEvent>, AppError>;

    async fn mark_read(&self, id: EventId) -> Result<(), AppError>;

    async fn mark_read_many(&self, ids: &[EventId]) -> Result<(), AppError>;

    async fn delete(&self, id: EventId) -> Result<(), AppError>;

    async fn delete_many(&self, ids: &[EventId]) -> Result<(), AppError>;
}
