use chrono::{DateTime, Utc};

use crate::application::ports::ReferenceEntry;
use crate::domain::entities::{PendingRecord, SyncState};
use crate::domain::value_objects::{LocalRecordId, RecordKind, RecordPayload};
use crate::shared::error::AppError;

use super::rows::{PendingRecordRow, ReferenceRow};

pub fn pending_record_from_row(row: PendingRecordRow) -> Result<PendingRecord, AppError> {
    let local_id = LocalRecordId::new(row.id).map_err(AppError::ValidationError)?;
    let kind = RecordKind::parse(&row.kind).map_err(AppError::ValidationError)?;
    let payload_value: serde_json::Value = serde_json::from_str(&row.payload)
        .map_err(|err| AppError::DeserializationError(err.to_string()))?;
    let payload = RecordPayload::new(payload_value).map_err(AppError::ValidationError)?;
    let sync_state = if row.synced {
        SyncState::Synced
    } else {
        SyncState::Pending
    };

    Ok(PendingRecord {
        local_id,
        kind,
        payload,
        sync_state,
        queued_at: timestamp_to_datetime(row.queued_at),
        synced_at: row.synced_at.map(timestamp_to_datetime),
    })
}

pub fn reference_entry_from_row(row: ReferenceRow) -> Result<ReferenceEntry, AppError> {
    let payload: serde_json::Value = serde_json::from_str(&row.payload)
        .map_err(|err| AppError::DeserializationError(err.to_string()))?;
    Ok(ReferenceEntry {
        payload,
        cached_at: timestamp_to_datetime(row.cached_at),
        expires_at: row.expires_at.map(timestamp_to_datetime),
    })
}

pub fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .or_else(|| DateTime::<Utc>::from_timestamp_millis(ts))
        .unwrap_or_else(Utc::now)
}
