use crate::domain::value_objects::{LocalRecordId, RecordKind, RecordPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Pending,
    Synced,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Pending => "pending",
            SyncState::Synced => "synced",
        }
    }
}

/// A submission persisted locally and not yet confirmed written remotely.
///
/// `synced_at` is set exactly when `sync_state` is `Synced`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRecord {
    pub local_id: LocalRecordId,
    pub kind: RecordKind,
    pub payload: RecordPayload,
    pub sync_state: SyncState,
    pub queued_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl PendingRecord {
    pub fn is_pending(&self) -> bool {
        self.sync_state == SyncState::Pending
    }
}

/// Draft used when enqueueing a new submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRecordDraft {
    pub kind: RecordKind,
    pub payload: RecordPayload,
}

impl PendingRecordDraft {
    pub fn new(kind: RecordKind, payload: RecordPayload) -> Self {
        Self { kind, payload }
    }
}

/// Aggregate pending counts for UI badges.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCounts {
    pub occurrences: u32,
    pub visits: u32,
    pub total: u32,
}

impl PendingCounts {
    pub fn new(occurrences: u32, visits: u32) -> Self {
        Self {
            occurrences,
            visits,
            total: occurrences + visits,
        }
    }
}
