use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::application::ports::{NotificationGateway, RecordSink};
use crate::domain::entities::NotificationEvent;
use crate::domain::value_objects::{EventId, RecordKind, UserId};
use crate::shared::config::BackendConfig;
use crate::shared::error::AppError;

use super::wire::{notification_from_row, NotificationRow};

const NOTIFICATIONS_TABLE: &str = "notifications";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid backend configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Backend HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend API error: {0}")]
    Api(String),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidConfiguration(msg) => AppError::ConfigurationError(msg),
            other => AppError::Network(other.to_string()),
        }
    }
}

/// REST adapter for the remote table API. Implements both the record sink
/// the sync engine replays into and the notification gateway.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = normalize_endpoint(&config.base_url)?;
        // A bounded request keeps a hung call from blocking the next
        // scheduled sync or poll tick.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn fetch_notifications(
        &self,
        query: &[(&str, String)],
    ) -> Result<Vec<NotificationEvent>, AppError> {
        let response = self
            .client
            .get(self.table_url(NOTIFICATIONS_TABLE))
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .map_err(BackendError::Http)?;
        let response = expect_success(response).await?;
        let rows = response
            .json::<Vec<NotificationRow>>()
            .await
            .map_err(BackendError::Http)?;
        rows.into_iter().map(notification_from_row).collect()
    }

    async fn patch_notifications(&self, filter: (&str, String), body: Value) -> Result<(), AppError> {
        let response = self
            .client
            .patch(self.table_url(NOTIFICATIONS_TABLE))
            .bearer_auth(&self.api_key)
            .query(&[filter])
            .json(&body)
            .send()
            .await
            .map_err(BackendError::Http)?;
        expect_success(response).await?;
        Ok(())
    }

    async fn delete_notifications(&self, filter: (&str, String)) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.table_url(NOTIFICATIONS_TABLE))
            .bearer_auth(&self.api_key)
            .query(&[filter])
            .send()
            .await
            .map_err(BackendError::Http)?;
        expect_success(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordSink for HttpBackend {
    async fn insert(&self, kind: RecordKind, row: Value) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.table_url(kind.table_name()))
            .bearer_auth(&self.api_key)
            .json(&row)
            .send()
            .await
            .map_err(BackendError::Http)?;
        expect_success(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl NotificationGateway for HttpBackend {
    async fn recent(
        &self,
        recipient: &UserId,
        limit: u32,
    ) -> Result<Vec<NotificationEvent>, AppError> {
        self.fetch_notifications(&[
            ("recipient_id", format!("eq.{recipient}")),
            ("order", "id.desc".to_string()),
            ("limit", limit.to_string()),
        ])
        .await
    }

    async fn after(
        &self,
        recipient: &UserId,
        after: EventId,
    ) -> Result<Vec<NotificationEvent>, AppError> {
        self.fetch_notifications(&[
            ("recipient_id", format!("eq.{recipient}")),
            ("id", format!("gt.{after}")),
            ("order", "id.asc".to_string()),
        ])
        .await
    }

    async fn by_id(&self, id: EventId) -> Result<Option<NotificationEvent>, AppError> {
        let events = self
            .fetch_notifications(&[("id", format!("eq.{id}")), ("limit", "1".to_string())])
            .await?;
        Ok(events.into_iter().next())
    }

    async fn mark_read(&self, id: EventId) -> Result<(), AppError> {
        self.patch_notifications(("id", format!("eq.{id}")), json!({ "read": true }))
            .await
    }

    async fn mark_read_many(&self, ids: &[EventId]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.patch_notifications(("id", id_list_filter(ids)), json!({ "read": true }))
            .await
    }

    async fn delete(&self, id: EventId) -> Result<(), AppError> {
        self.delete_notifications(("id", format!("eq.{id}"))).await
    }

    async fn delete_many(&self, ids: &[EventId]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.delete_notifications(("id", id_list_filter(ids))).await
    }
}

pub(crate) fn normalize_endpoint(raw: &str) -> Result<String, BackendError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(BackendError::InvalidConfiguration(
            "Backend base_url must not be empty".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(BackendError::InvalidConfiguration(format!(
            "Backend base_url must be http(s): {trimmed}"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) async fn expect_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api(parse_api_error(status, &body)))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn id_list_filter(ids: &[EventId]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.value().to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({joined})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_endpoint_trims_and_validates() {
        assert_eq!(
            normalize_endpoint(" https://api.example.com/ ").unwrap(),
            "https://api.example.com"
        );
        assert!(normalize_endpoint("").is_err());
        assert!(normalize_endpoint("ftp://api.example.com").is_err());
    }

    #[test]
    fn table_urls_are_rooted_at_the_rest_prefix() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "https://api.example.com".to_string(),
            realtime_url: String::new(),
            api_key: "key".to_string(),
            storage_bucket: "bucket".to_string(),
            request_timeout_secs: 15,
        })
        .unwrap();

        assert_eq!(
            backend.table_url("occurrences"),
            "https://api.example.com/rest/v1/occurrences"
        );
    }

    #[test]
    fn api_errors_prefer_the_structured_message() {
        let message = parse_api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message": "column does not exist"}"#,
        );
        assert_eq!(message, "column does not exist (422)");

        let fallback = parse_api_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(fallback, "HTTP 502");
    }

    #[test]
    fn id_list_filters_join_with_commas() {
        let ids = [EventId::new(1).unwrap(), EventId::new(5).unwrap()];
        assert_eq!(id_list_filter(&ids), "in.(1,5)");
    }
}
