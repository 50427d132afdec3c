use crate::domain::value_objects::{EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Occurrence,
    Visit,
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::Occurrence => "occurrence",
            NotificationKind::Visit => "visit",
            NotificationKind::Other(value) => value.as_str(),
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(value: &str) -> Self {
        match value {
            "occurrence" => NotificationKind::Occurrence,
            "visit" => NotificationKind::Visit,
            other => NotificationKind::Other(other.to_string()),
        }
    }
}

/// A domain event the current user should be told about, as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: EventId,
    pub recipient_id: UserId,
    pub sender_id: Option<UserId>,
    /// Sender display name, denormalized by the backend query.
    pub sender_name: Option<String>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn is_occurrence(&self) -> bool {
        self.kind == NotificationKind::Occurrence
    }
}
