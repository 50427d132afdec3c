use crate::domain::value_objects::RecordKind;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Remote insert endpoint for replayed submissions. The row must already be
/// translated to the remote schema: only fields the backend accepts.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn insert(&self, kind: RecordKind, row: Value) -> Result<(), AppError>;
}
