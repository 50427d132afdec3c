use crate::domain::value_objects::UserId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Identity of the currently authenticated user. Queried at sync time so
/// ownership fields reflect the live session, not the one a record was
/// queued under.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<UserId>, AppError>;
}
