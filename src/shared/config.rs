use serde::{Deserialize, Serialize};

/// Policy applied when an embedded image fails to upload during sync.
///
/// `SubmitWithoutImage` mirrors the historical behavior: the record is
/// inserted without an image reference and the failure is logged.
/// `DeferRecord` leaves the record pending so the attachment is retried on
/// the next sync pass.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageFailurePolicy {
    #[default]
    SubmitWithoutImage,
    DeferRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub backend: BackendConfig,
    pub sync: SyncConfig,
    pub notifications: NotificationsConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Batch sweep window for long-synced queue entries, in days.
    pub retention_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub realtime_url: String,
    pub api_key: String,
    pub storage_bucket: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval_secs: u64,
    /// Grace window before a synced record is purged locally, in hours.
    pub purge_grace_hours: u32,
    #[serde(default)]
    pub image_failure_policy: ImageFailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub poll_interval_secs: u64,
    pub initial_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/relato.db?mode=rwc".to_string(),
                max_connections: 5,
                retention_days: 7,
            },
            backend: BackendConfig {
                base_url: String::new(),
                realtime_url: String::new(),
                api_key: String::new(),
                storage_bucket: "occurrence-images".to_string(),
                request_timeout_secs: 15,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval_secs: 300, // 5 minutes
                purge_grace_hours: 24,
                image_failure_policy: ImageFailurePolicy::SubmitWithoutImage,
            },
            notifications: NotificationsConfig {
                poll_interval_secs: 5,
                initial_limit: 50,
            },
            cache: CacheConfig {
                ttl_secs: 24 * 60 * 60,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("RELATO_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("RELATO_RETENTION_DAYS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.retention_days = value.max(1);
            }
        }

        if let Ok(v) = std::env::var("RELATO_BACKEND_URL") {
            cfg.backend.base_url = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("RELATO_REALTIME_URL") {
            cfg.backend.realtime_url = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("RELATO_API_KEY") {
            cfg.backend.api_key = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("RELATO_STORAGE_BUCKET") {
            if !v.trim().is_empty() {
                cfg.backend.storage_bucket = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("RELATO_REQUEST_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.backend.request_timeout_secs = value.max(1);
            }
        }

        if let Ok(v) = std::env::var("RELATO_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("RELATO_SYNC_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("RELATO_PURGE_GRACE_HOURS") {
            if let Some(value) = parse_u32(&v) {
                cfg.sync.purge_grace_hours = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("RELATO_IMAGE_FAILURE_POLICY") {
            match v.trim().to_ascii_lowercase().as_str() {
                "submit_without_image" => {
                    cfg.sync.image_failure_policy = ImageFailurePolicy::SubmitWithoutImage;
                }
                "defer_record" => {
                    cfg.sync.image_failure_policy = ImageFailurePolicy::DeferRecord;
                }
                _ => {}
            }
        }

        if let Ok(v) = std::env::var("RELATO_POLL_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.notifications.poll_interval_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("RELATO_NOTIFICATIONS_INITIAL_LIMIT") {
            if let Some(value) = parse_u32(&v) {
                cfg.notifications.initial_limit = value.max(1);
            }
        }

        if let Ok(v) = std::env::var("RELATO_CACHE_TTL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.ttl_secs = value.max(1);
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.database.retention_days == 0 {
            return Err("Database retention_days must be greater than 0".to_string());
        }
        if self.backend.request_timeout_secs == 0 {
            return Err("Backend request_timeout_secs must be greater than 0".to_string());
        }
        if self.sync.sync_interval_secs == 0 {
            return Err("Sync sync_interval_secs must be greater than 0".to_string());
        }
        if self.sync.purge_grace_hours == 0 {
            return Err("Sync purge_grace_hours must be greater than 0".to_string());
        }
        if self.notifications.poll_interval_secs == 0 {
            return Err("Notifications poll_interval_secs must be greater than 0".to_string());
        }
        if self.notifications.initial_limit == 0 {
            return Err("Notifications initial_limit must be greater than 0".to_string());
        }
        if self.cache.ttl_secs == 0 {
            return Err("Cache ttl_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
