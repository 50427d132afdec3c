use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::application::ports::BlobStore;
use crate::shared::config::BackendConfig;
use crate::shared::error::AppError;

use super::http_backend::{expect_success, normalize_endpoint, BackendError};

/// Uploads occurrence images to the backend's object storage and resolves
/// their public URLs.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpBlobStore {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = normalize_endpoint(&config.base_url)?;
        if config.storage_bucket.trim().is_empty() {
            return Err(BackendError::InvalidConfiguration(
                "Backend storage_bucket must not be empty".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            bucket: config.storage_bucket.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn object_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }

    fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }
}

#[async_trait::async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        object_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.object_url(object_name))
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(BackendError::Http)?;
        expect_success(response).await?;
        Ok(self.public_url(object_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            base_url: "https://api.example.com/".to_string(),
            realtime_url: String::new(),
            api_key: "key".to_string(),
            storage_bucket: "occurrence-images".to_string(),
            request_timeout_secs: 15,
        }
    }

    #[test]
    fn urls_carry_the_bucket_and_object_name() {
        let store = HttpBlobStore::new(&config()).unwrap();
        assert_eq!(
            store.object_url("a.jpg"),
            "https://api.example.com/storage/v1/object/occurrence-images/a.jpg"
        );
        assert_eq!(
            store.public_url("a.jpg"),
            "https://api.example.com/storage/v1/object/public/occurrence-images/a.jpg"
        );
    }

    #[test]
    fn an_empty_bucket_is_a_configuration_error() {
        let mut cfg = config();
        cfg.storage_bucket = " ".to_string();
        assert!(HttpBlobStore::new(&cfg).is_err());
    }
}
