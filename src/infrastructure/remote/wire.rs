use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::entities::{NotificationEvent, NotificationKind};
use crate::domain::value_objects::{EventId, UserId};
use crate::shared::error::AppError;

/// Notification row as the backend serializes it, shared by the REST and
/// websocket transports.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRow {
    pub id: i64,
    pub recipient_id: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Denormalized by the REST query; absent on raw change rows.
    #[serde(default)]
    pub sender_name: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

pub fn notification_from_row(row: NotificationRow) -> Result<NotificationEvent, AppError> {
    let id = EventId::new(row.id).map_err(AppError::ValidationError)?;
    let recipient_id = UserId::new(row.recipient_id).map_err(AppError::ValidationError)?;
    let sender_id = row
        .sender_id
        .map(|value| UserId::new(value).map_err(AppError::ValidationError))
        .transpose()?;

    Ok(NotificationEvent {
        id,
        recipient_id,
        sender_id,
        sender_name: row.sender_name,
        kind: NotificationKind::from(row.kind.as_str()),
        title: row.title,
        body: row.body,
        read: row.read,
        created_at: row.created_at,
    })
}
