use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference lists cached locally so forms keep rendering offline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKey {
    Companies,
    Sectors,
    ProblemTypes,
    SessionUser,
}

impl ReferenceKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKey::Companies => "companies",
            ReferenceKey::Sectors => "sectors",
            ReferenceKey::ProblemTypes => "problem_types",
            ReferenceKey::SessionUser => "session_user",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub payload: Value,
    pub cached_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn upsert(&self, key: ReferenceKey, entry: ReferenceEntry) -> Result<(), AppError>;

    async fn fetch(&self, key: ReferenceKey) -> Result<Option<ReferenceEntry>, AppError>;

    async fn delete(&self, key: ReferenceKey) -> Result<(), AppError>;

    /// Drop entries whose expiry has passed. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
