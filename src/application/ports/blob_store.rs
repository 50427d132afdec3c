use crate::shared::error::AppError;
use async_trait::async_trait;

/// Remote blob storage. Uploads are keyed by a caller-chosen object name and
/// resolve to a publicly reachable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        object_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AppError>;
}
