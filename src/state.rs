use std::sync::Arc;

use chrono::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

use crate::application::ports::{
    ChimePlayer, DesktopNotifier, NotificationGateway, OfflineQueue, SessionProvider,
};
use crate::application::services::{
    ConnectivityMonitor, NotificationCenter, ReferenceCache, SyncEngine, SyncScheduler,
};
use crate::infrastructure::offline::{SqliteOfflineQueue, SqliteReferenceStore};
use crate::infrastructure::remote::{HttpBackend, HttpBlobStore, WsPushChannel};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;

/// Wires the local store, remote adapters and services together for one
/// running app instance.
pub struct AppContext {
    config: AppConfig,
    pool: Pool<Sqlite>,
    pub queue: Arc<dyn OfflineQueue>,
    pub sync_engine: Arc<SyncEngine>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub reference_cache: Arc<ReferenceCache>,
    backend: Arc<HttpBackend>,
    push: Arc<WsPushChannel>,
    session: Arc<dyn SessionProvider>,
}

impl AppContext {
    pub async fn initialize(
        config: AppConfig,
        session: Arc<dyn SessionProvider>,
        initially_online: bool,
    ) -> anyhow::Result<Self> {
        config.validate().map_err(|msg| anyhow::anyhow!(msg))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        let blobs = Arc::new(HttpBlobStore::new(&config.backend)?);
        let push = Arc::new(WsPushChannel::new(&config.backend)?);

        let queue: Arc<dyn OfflineQueue> = Arc::new(SqliteOfflineQueue::new(pool.clone()));
        let reference_cache = Arc::new(ReferenceCache::new(
            Arc::new(SqliteReferenceStore::new(pool.clone())),
            &config.cache,
        ));
        let sync_engine = Arc::new(SyncEngine::new(
            queue.clone(),
            backend.clone(),
            blobs,
            session.clone(),
            config.sync.clone(),
        ));
        let connectivity = Arc::new(ConnectivityMonitor::new(initially_online));

        // Opportunistic startup housekeeping: the batch retention sweep and
        // the reference cache purge.
        let swept = queue
            .sweep_synced(Duration::days(i64::from(config.database.retention_days)))
            .await?;
        if swept > 0 {
            info!("startup sweep removed {swept} long-synced records");
        }
        let purged = reference_cache.purge_expired().await?;
        if purged > 0 {
            debug!("startup purge removed {purged} expired cache entries");
        }

        info!("app context initialized");
        Ok(Self {
            config,
            pool,
            queue,
            sync_engine,
            connectivity,
            reference_cache,
            backend,
            push,
            session,
        })
    }

    /// Spawn the periodic + edge-triggered sync loops, honoring the
    /// `auto_sync` switch. The returned handle must be shut down on exit.
    pub fn start_auto_sync(&self) -> Option<SyncScheduler> {
        self.config
            .sync
            .auto_sync
            .then(|| self.sync_engine.schedule(&self.connectivity))
    }

    /// Build and start the notification session for the authenticated user.
    /// The chime/desktop surfaces come from the embedding shell.
    pub async fn start_notifications(
        &self,
        chime: Arc<dyn ChimePlayer>,
        desktop: Arc<dyn DesktopNotifier>,
    ) -> Result<NotificationCenter, AppError> {
        let recipient = self
            .session
            .current_user()
            .await?
            .ok_or_else(|| AppError::Auth("No authenticated session".to_string()))?;

        let gateway: Arc<dyn NotificationGateway> = self.backend.clone();
        let center = NotificationCenter::new(
            gateway,
            self.push.clone(),
            chime,
            desktop,
            recipient,
            self.config.notifications.clone(),
        );
        center.load_initial().await?;
        center.start();
        Ok(center)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
