use crate::domain::value_objects::LocalRecordId;
use serde::{Deserialize, Serialize};

/// One failed record inside a sync batch. `record` is absent when the queue
/// itself could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncError {
    pub record: Option<LocalRecordId>,
    pub message: String,
}

/// Outcome of draining one record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSyncReport {
    pub success: bool,
    pub synced: u32,
    pub total: u32,
    pub errors: Vec<SyncError>,
}

impl KindSyncReport {
    pub fn empty() -> Self {
        Self {
            success: true,
            synced: 0,
            total: 0,
            errors: Vec::new(),
        }
    }

    pub fn storage_failure(message: String) -> Self {
        Self {
            success: false,
            synced: 0,
            total: 0,
            errors: vec![SyncError {
                record: None,
                message,
            }],
        }
    }
}

/// Aggregate outcome of a full sync pass over both kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    pub total_synced: u32,
    pub total_pending: u32,
    pub occurrences: KindSyncReport,
    pub visits: KindSyncReport,
}

impl SyncReport {
    pub fn aggregate(occurrences: KindSyncReport, visits: KindSyncReport) -> Self {
        Self {
            success: occurrences.success && visits.success,
            total_synced: occurrences.synced + visits.synced,
            total_pending: occurrences.total + visits.total,
            occurrences,
            visits,
        }
    }

    /// Short human summary for the UI ("N of M synced, K failed").
    pub fn summary(&self) -> String {
        let failed = self.occurrences.errors.len() + self.visits.errors.len();
        if failed == 0 {
            format!("{} of {} synced", self.total_synced, self.total_pending)
        } else {
            format!(
                "{} of {} synced, {} failed",
                self.total_synced, self.total_pending, failed
            )
        }
    }
}
