use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::debug;

use crate::application::ports::{ReferenceEntry, ReferenceKey, ReferenceStore};
use crate::shared::config::CacheConfig;
use crate::shared::error::AppError;

/// Locally cached reference lists (companies, sectors, problem types, the
/// session user) so forms keep working offline.
///
/// Entries carry an explicit TTL and are invalidated by key; expired entries
/// are never returned and are dropped by the opportunistic purge run at
/// startup.
pub struct ReferenceCache {
    store: Arc<dyn ReferenceStore>,
    ttl: Duration,
}

impl ReferenceCache {
    pub fn new(store: Arc<dyn ReferenceStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            ttl: Duration::seconds(config.ttl_secs as i64),
        }
    }

    pub async fn put(&self, key: ReferenceKey, value: Value) -> Result<(), AppError> {
        let now = Utc::now();
        self.store
            .upsert(
                key,
                ReferenceEntry {
                    payload: value,
                    cached_at: now,
                    expires_at: Some(now + self.ttl),
                },
            )
            .await
    }

    /// The cached value, or `None` when absent or past its TTL.
    pub async fn get(&self, key: ReferenceKey) -> Result<Option<Value>, AppError> {
        let Some(entry) = self.store.fetch(key).await? else {
            return Ok(None);
        };
        if entry.expires_at.is_some_and(|expiry| expiry <= Utc::now()) {
            debug!("reference cache: {} expired", key.as_str());
            return Ok(None);
        }
        Ok(Some(entry.payload))
    }

    pub async fn invalidate(&self, key: ReferenceKey) -> Result<(), AppError> {
        self.store.delete(key).await
    }

    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.store.purge_expired(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::offline::SqliteReferenceStore;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup(ttl_secs: u64) -> ReferenceCache {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        ReferenceCache::new(
            Arc::new(SqliteReferenceStore::new(pool)),
            &CacheConfig { ttl_secs },
        )
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = setup(3600).await;
        let companies = json!([{"id": 1, "name": "Acme"}]);

        cache
            .put(ReferenceKey::Companies, companies.clone())
            .await
            .unwrap();

        assert_eq!(cache.get(ReferenceKey::Companies).await.unwrap(), Some(companies));
        assert_eq!(cache.get(ReferenceKey::Sectors).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_are_hidden_and_purged() {
        // Zero-second TTL: the entry expires as soon as it lands.
        let cache = setup(0).await;
        cache
            .put(ReferenceKey::ProblemTypes, json!(["plumbing"]))
            .await
            .unwrap();

        assert_eq!(cache.get(ReferenceKey::ProblemTypes).await.unwrap(), None);
        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert_eq!(cache.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalidate_drops_a_single_key() {
        let cache = setup(3600).await;
        cache.put(ReferenceKey::Companies, json!([1])).await.unwrap();
        cache.put(ReferenceKey::Sectors, json!([2])).await.unwrap();

        cache.invalidate(ReferenceKey::Companies).await.unwrap();

        assert_eq!(cache.get(ReferenceKey::Companies).await.unwrap(), None);
        assert_eq!(cache.get(ReferenceKey::Sectors).await.unwrap(), Some(json!([2])));
    }

    #[tokio::test]
    async fn put_replaces_the_previous_value() {
        let cache = setup(3600).await;
        cache.put(ReferenceKey::Sectors, json!([1])).await.unwrap();
        cache.put(ReferenceKey::Sectors, json!([1, 2])).await.unwrap();

        assert_eq!(
            cache.get(ReferenceKey::Sectors).await.unwrap(),
            Some(json!([1, 2]))
        );
    }
}
