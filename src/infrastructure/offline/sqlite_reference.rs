use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::application::ports::{ReferenceEntry, ReferenceKey, ReferenceStore};
use crate::shared::error::AppError;

use super::mappers::reference_entry_from_row;
use super::rows::ReferenceRow;

/// SQLite-backed reference cache, one row per typed key.
pub struct SqliteReferenceStore {
    pool: Pool<Sqlite>,
}

impl SqliteReferenceStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReferenceStore for SqliteReferenceStore {
    async fn upsert(&self, key: ReferenceKey, entry: ReferenceEntry) -> Result<(), AppError> {
        let payload = serde_json::to_string(&entry.payload)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO reference_cache (cache_key, payload, cached_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                cached_at = excluded.cached_at,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(key.as_str())
        .bind(&payload)
        .bind(entry.cached_at.timestamp())
        .bind(entry.expires_at.map(|ts| ts.timestamp()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch(&self, key: ReferenceKey) -> Result<Option<ReferenceEntry>, AppError> {
        let row = sqlx::query_as::<_, ReferenceRow>(
            r#"SELECT * FROM reference_cache WHERE cache_key = ?1"#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(reference_entry_from_row).transpose()
    }

    async fn delete(&self, key: ReferenceKey) -> Result<(), AppError> {
        sqlx::query(r#"DELETE FROM reference_cache WHERE cache_key = ?1"#)
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM reference_cache
            WHERE expires_at IS NOT NULL AND expires_at <= ?1
            "#,
        )
        .bind(now.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
