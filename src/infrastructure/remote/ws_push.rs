use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::application::ports::{PushChannel, PushSubscription, RowChange};
use crate::domain::value_objects::{EventId, UserId};
use crate::shared::config::BackendConfig;
use crate::shared::error::AppError;

use super::wire::{notification_from_row, NotificationRow};

const NOTIFICATIONS_TABLE: &str = "notifications";
const CHANNEL_BUFFER: usize = 64;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Subscribe { table: String, filter: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Subscribed,
    Insert { record: Value },
    Update { record: Value },
    Delete { id: i64 },
}

/// Websocket adapter for the realtime change feed.
///
/// The reader task forwards decoded changes until the transport errors or
/// closes; either way it just stops. The notification center's polling loop
/// is the delivery backstop.
pub struct WsPushChannel {
    endpoint: String,
}

impl WsPushChannel {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let endpoint = config.realtime_url.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(AppError::ConfigurationError(
                "Backend realtime_url must not be empty".to_string(),
            ));
        }
        Ok(Self {
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl PushChannel for WsPushChannel {
    async fn subscribe(&self, recipient: &UserId) -> Result<PushSubscription, AppError> {
        let (stream, _) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|err| AppError::Network(format!("Push channel connect failed: {err}")))?;
        let (mut write, mut read) = stream.split();

        let frame = serde_json::to_string(&ClientMessage::Subscribe {
            table: NOTIFICATIONS_TABLE.to_string(),
            filter: format!("recipient_id=eq.{recipient}"),
        })?;
        write
            .send(Message::text(frame))
            .await
            .map_err(|err| AppError::Network(format!("Push channel subscribe failed: {err}")))?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        let reader = tokio::spawn(async move {
            // Keep the write half alive so the transport can answer pings.
            let _write = write;
            while let Some(frame) = read.next().await {
                let message = match frame {
                    Ok(message) => message,
                    Err(err) => {
                        warn!("push channel transport error: {err}");
                        break;
                    }
                };
                if message.is_close() {
                    break;
                }
                let Ok(text) = message.to_text() else {
                    continue;
                };
                match decode_frame(text) {
                    Some(change) => {
                        if tx.send(change).await.is_err() {
                            break;
                        }
                    }
                    None => debug!("push channel: ignoring frame"),
                }
            }
            debug!("push channel reader stopped");
        });

        Ok(PushSubscription::with_reader(rx, reader))
    }
}

fn decode_frame(text: &str) -> Option<RowChange> {
    match serde_json::from_str::<ServerMessage>(text).ok()? {
        ServerMessage::Subscribed => None,
        ServerMessage::Insert { record } => {
            let id = EventId::new(record.get("id")?.as_i64()?).ok()?;
            Some(RowChange::Inserted { id })
        }
        ServerMessage::Update { record } => {
            let row: NotificationRow = serde_json::from_value(record).ok()?;
            let event = notification_from_row(row).ok()?;
            Some(RowChange::Updated { event })
        }
        ServerMessage::Delete { id } => Some(RowChange::Deleted {
            id: EventId::new(id).ok()?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_frames_carry_only_the_id() {
        let change = decode_frame(
            r#"{"type": "insert", "record": {"id": 42, "title": "New occurrence"}}"#,
        )
        .unwrap();
        assert_eq!(
            change,
            RowChange::Inserted {
                id: EventId::new(42).unwrap()
            }
        );
    }

    #[test]
    fn update_frames_decode_the_full_row() {
        let change = decode_frame(
            r#"{
                "type": "update",
                "record": {
                    "id": 7,
                    "recipient_id": "user-1",
                    "kind": "visit",
                    "title": "t",
                    "body": "b",
                    "read": true,
                    "created_at": "2025-06-01T12:00:00Z"
                }
            }"#,
        )
        .unwrap();
        match change {
            RowChange::Updated { event } => {
                assert_eq!(event.id.value(), 7);
                assert!(event.read);
            }
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[test]
    fn delete_and_ack_frames() {
        assert_eq!(
            decode_frame(r#"{"type": "delete", "id": 9}"#),
            Some(RowChange::Deleted {
                id: EventId::new(9).unwrap()
            })
        );
        assert_eq!(decode_frame(r#"{"type": "subscribed"}"#), None);
    }

    #[test]
    fn garbage_frames_are_ignored() {
        assert_eq!(decode_frame("not json"), None);
        assert_eq!(decode_frame(r#"{"type": "presence"}"#), None);
        assert_eq!(decode_frame(r#"{"type": "insert", "record": {}}"#), None);
    }

    #[test]
    fn an_empty_realtime_url_is_rejected() {
        let config = BackendConfig {
            base_url: "https://api.example.com".to_string(),
            realtime_url: "  ".to_string(),
            api_key: String::new(),
            storage_bucket: "bucket".to_string(),
            request_timeout_secs: 15,
        };
        assert!(WsPushChannel::new(&config).is_err());
    }
}
