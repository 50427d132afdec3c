use serde::{Deserialize, Serialize};
use std::fmt;

/// Row id of a locally queued record. Assigned by the local store, unique
/// and monotonic within it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalRecordId(i64);

impl LocalRecordId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Local record id must be positive".to_string());
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocalRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
