use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote-assigned notification id. Ids are monotonically increasing, which
/// is what makes them usable as the delivery high-water mark.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(i64);

impl EventId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Event id must be positive".to_string());
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
