use chrono::{Duration, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::application::ports::OfflineQueue;
use crate::domain::entities::{PendingCounts, PendingRecord, PendingRecordDraft};
use crate::domain::value_objects::{LocalRecordId, RecordKind};
use crate::shared::error::AppError;

use super::mappers::pending_record_from_row;
use super::rows::PendingRecordRow;

/// SQLite-backed durable queue. Timestamps are stored as unix seconds;
/// replay order is `queued_at` with the row id as tie-break so records
/// queued within the same second keep their insertion order.
pub struct SqliteOfflineQueue {
    pool: Pool<Sqlite>,
}

impl SqliteOfflineQueue {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OfflineQueue for SqliteOfflineQueue {
    async fn enqueue(&self, draft: PendingRecordDraft) -> Result<LocalRecordId, AppError> {
        let payload = serde_json::to_string(draft.payload.as_json())
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        let queued_at = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO pending_records (kind, payload, synced, queued_at)
            VALUES (?1, ?2, 0, ?3)
            "#,
        )
        .bind(draft.kind.as_str())
        .bind(&payload)
        .bind(queued_at)
        .execute(&self.pool)
        .await?;

        LocalRecordId::new(result.last_insert_rowid()).map_err(AppError::ValidationError)
    }

    async fn list_pending(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError> {
        let rows = sqlx::query_as::<_, PendingRecordRow>(
            r#"
            SELECT * FROM pending_records
            WHERE kind = ?1 AND synced = 0
            ORDER BY queued_at ASC, id ASC
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(pending_record_from_row).collect()
    }

    async fn mark_synced(&self, id: LocalRecordId, kind: RecordKind) -> Result<(), AppError> {
        let synced_at = Utc::now().timestamp();

        // COALESCE keeps the original stamp on a repeated call.
        sqlx::query(
            r#"
            UPDATE pending_records
            SET synced = 1, synced_at = COALESCE(synced_at, ?1)
            WHERE id = ?2 AND kind = ?3
            "#,
        )
        .bind(synced_at)
        .bind(id.value())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, id: LocalRecordId, kind: RecordKind) -> Result<(), AppError> {
        sqlx::query(r#"DELETE FROM pending_records WHERE id = ?1 AND kind = ?2"#)
            .bind(id.value())
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn count_pending(&self) -> Result<PendingCounts, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT kind, COUNT(*) as count
            FROM pending_records
            WHERE synced = 0
            GROUP BY kind
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut occurrences = 0u32;
        let mut visits = 0u32;
        for row in rows {
            let kind: String = row.try_get("kind")?;
            let count: i64 = row.try_get("count")?;
            let count = u32::try_from(count).unwrap_or(0);
            match RecordKind::parse(&kind) {
                Ok(RecordKind::Occurrence) => occurrences = count,
                Ok(RecordKind::Visit) => visits = count,
                Err(_) => {}
            }
        }

        Ok(PendingCounts::new(occurrences, visits))
    }

    async fn sweep_synced(&self, older_than: Duration) -> Result<u64, AppError> {
        let cutoff = (Utc::now() - older_than).timestamp();

        let result = sqlx::query(
            r#"
            DELETE FROM pending_records
            WHERE synced = 1 AND synced_at IS NOT NULL AND synced_at < ?1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
