use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a locally queued submission.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Occurrence,
    Visit,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Occurrence => "occurrence",
            RecordKind::Visit => "visit",
        }
    }

    /// Remote table the kind is replayed into.
    pub fn table_name(&self) -> &'static str {
        match self {
            RecordKind::Occurrence => "occurrences",
            RecordKind::Visit => "technical_visits",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "occurrence" => Ok(RecordKind::Occurrence),
            "visit" => Ok(RecordKind::Visit),
            other => Err(format!("Unknown record kind: {other}")),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        for kind in [RecordKind::Occurrence, RecordKind::Visit] {
            assert_eq!(RecordKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert!(RecordKind::parse("report").is_err());
    }
}
