use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::ports::{BlobStore, OfflineQueue, RecordSink, SessionProvider};
use crate::application::services::connectivity::ConnectivityMonitor;
use crate::domain::entities::{
    KindSyncReport, PendingCounts, PendingRecord, SyncError, SyncReport,
};
use crate::domain::value_objects::{EncodedImage, RecordKind, RecordPayload};
use crate::shared::config::{ImageFailurePolicy, SyncConfig};
use crate::shared::error::AppError;

/// Local bookkeeping fields, never part of the remote schema.
const CONTROL_FIELDS: &[&str] = &[
    "local_id",
    "queued_at",
    "synced",
    "synced_at",
    "kind",
    "created_offline",
];

/// Display names denormalized into the payload so forms render offline.
const DISPLAY_FIELDS: &[&str] = &["company_name", "sector_name", "problem_type_name"];

/// Locally encoded image variants, replaced by `image_url` after upload.
const IMAGE_FIELDS: &[&str] = &["image_base64", "image_preview", "image_file"];

const IMAGE_SOURCE_FIELD: &str = "image_base64";
const IMAGE_URL_FIELD: &str = "image_url";

/// Ownership fields re-stamped from the live session at sync time. A record
/// can be queued under one login and replayed under another.
fn identity_fields(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Occurrence => &[],
        RecordKind::Visit => &["user_id", "created_by"],
    }
}

/// Replays queued submissions against the remote backend.
///
/// Failures are isolated per record: one bad row never blocks the rest of
/// the batch, and callers always get a report back instead of an error.
pub struct SyncEngine {
    queue: Arc<dyn OfflineQueue>,
    sink: Arc<dyn RecordSink>,
    blobs: Arc<dyn BlobStore>,
    session: Arc<dyn SessionProvider>,
    config: SyncConfig,
    /// Serializes overlapping sync runs so a slow pass and a triggered pass
    /// cannot both replay the same pending rows. Shared across clones.
    gate: Arc<Mutex<()>>,
}

impl SyncEngine {
    pub fn new(
        queue: Arc<dyn OfflineQueue>,
        sink: Arc<dyn RecordSink>,
        blobs: Arc<dyn BlobStore>,
        session: Arc<dyn SessionProvider>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            sink,
            blobs,
            session,
            config,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Drain one kind. Empty queue returns a zero report with no remote call.
    pub async fn sync_kind(&self, kind: RecordKind) -> KindSyncReport {
        let _guard = self.gate.lock().await;
        self.sync_kind_inner(kind).await
    }

    /// Drain occurrences, then visits. The order carries no dependency.
    pub async fn sync_all(&self) -> SyncReport {
        let _guard = self.gate.lock().await;
        let occurrences = self.sync_kind_inner(RecordKind::Occurrence).await;
        let visits = self.sync_kind_inner(RecordKind::Visit).await;
        SyncReport::aggregate(occurrences, visits)
    }

    /// Delete synced records past the grace window.
    pub async fn purge_synced(&self) -> Result<u64, AppError> {
        self.queue
            .sweep_synced(Duration::hours(i64::from(self.config.purge_grace_hours)))
            .await
    }

    pub async fn pending_counts(&self) -> Result<PendingCounts, AppError> {
        self.queue.count_pending().await
    }

    async fn sync_kind_inner(&self, kind: RecordKind) -> KindSyncReport {
        let pending = match self.queue.list_pending(kind).await {
            Ok(pending) => pending,
            Err(err) => {
                warn!("sync: failed to read pending {kind} records: {err}");
                return KindSyncReport::storage_failure(err.to_string());
            }
        };

        if pending.is_empty() {
            debug!("sync: no pending {kind} records");
            return KindSyncReport::empty();
        }

        let total = pending.len() as u32;
        let mut synced = 0u32;
        let mut errors = Vec::new();

        for record in &pending {
            match self.push_record(record).await {
                Ok(()) => match self.queue.mark_synced(record.local_id, kind).await {
                    Ok(()) => {
                        synced += 1;
                        debug!("sync: {kind} record {} replayed", record.local_id);
                    }
                    Err(err) => {
                        warn!(
                            "sync: {kind} record {} inserted but not marked synced: {err}",
                            record.local_id
                        );
                        errors.push(SyncError {
                            record: Some(record.local_id),
                            message: err.to_string(),
                        });
                    }
                },
                Err(err) => {
                    warn!("sync: {kind} record {} failed: {err}", record.local_id);
                    errors.push(SyncError {
                        record: Some(record.local_id),
                        message: err.to_string(),
                    });
                }
            }
        }

        KindSyncReport {
            success: errors.is_empty(),
            synced,
            total,
            errors,
        }
    }

    /// Translate one record into a remote row and insert it.
    async fn push_record(&self, record: &PendingRecord) -> Result<(), AppError> {
        let mut row = strip_local_fields(&record.payload);

        if let Some(url) = self.upload_embedded_image(record).await? {
            row.insert(IMAGE_URL_FIELD.to_string(), Value::String(url));
        }

        let fields = identity_fields(record.kind);
        if !fields.is_empty() {
            let user = self
                .session
                .current_user()
                .await?
                .ok_or_else(|| AppError::Auth("No authenticated session".to_string()))?;
            for field in fields {
                row.insert((*field).to_string(), Value::String(user.as_str().to_string()));
            }
        }

        self.sink.insert(record.kind, Value::Object(row)).await
    }

    /// Upload the embedded image, if any, returning its public URL.
    ///
    /// Under `SubmitWithoutImage` an upload failure is logged and the record
    /// proceeds without a reference; under `DeferRecord` the failure aborts
    /// this record's sync so it is retried whole on the next pass.
    async fn upload_embedded_image(
        &self,
        record: &PendingRecord,
    ) -> Result<Option<String>, AppError> {
        let Some(raw) = record.payload.get(IMAGE_SOURCE_FIELD).and_then(Value::as_str) else {
            return Ok(None);
        };

        let image = match EncodedImage::parse(raw) {
            Ok(image) => image,
            Err(err) => {
                warn!(
                    "sync: record {} carries an unreadable image, submitting without it: {err}",
                    record.local_id
                );
                return Ok(None);
            }
        };

        let name = object_name(record.kind, image.extension());
        match self.blobs.upload(&name, image.bytes(), image.mime()).await {
            Ok(url) => Ok(Some(url)),
            Err(err) => match self.config.image_failure_policy {
                ImageFailurePolicy::SubmitWithoutImage => {
                    warn!(
                        "sync: image upload for record {} failed, submitting without it: {err}",
                        record.local_id
                    );
                    Ok(None)
                }
                ImageFailurePolicy::DeferRecord => Err(err),
            },
        }
    }

    /// Spawn the background sync loops: a periodic pass guarded by "online
    /// and pending work", and an immediate pass on each offline→online edge.
    pub fn schedule(&self, connectivity: &ConnectivityMonitor) -> SyncScheduler {
        let mut handles = Vec::new();

        let engine = Arc::new(self.clone());
        let status = connectivity.watch();
        let period = StdDuration::from_secs(self.config.sync_interval_secs);
        handles.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the loop starts one
            // period in.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !status.borrow().is_online {
                    continue;
                }
                let pending = match engine.queue.count_pending().await {
                    Ok(counts) => counts.total,
                    Err(err) => {
                        warn!("auto-sync: failed to count pending records: {err}");
                        continue;
                    }
                };
                if pending > 0 {
                    let report = engine.sync_all().await;
                    info!("auto-sync: {}", report.summary());
                }
                match engine.purge_synced().await {
                    Ok(0) => {}
                    Ok(removed) => debug!("auto-sync: purged {removed} synced records"),
                    Err(err) => warn!("auto-sync: purge failed: {err}"),
                }
            }
        }));

        let engine = Arc::new(self.clone());
        let mut rx = connectivity.watch();
        handles.push(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let edge = rx.borrow_and_update().just_went_online;
                if edge {
                    let report = engine.sync_all().await;
                    info!("connection restored: {}", report.summary());
                }
            }
        }));

        SyncScheduler { handles }
    }
}

impl Clone for SyncEngine {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            sink: self.sink.clone(),
            blobs: self.blobs.clone(),
            session: self.session.clone(),
            config: self.config.clone(),
            gate: self.gate.clone(),
        }
    }
}

/// Handles for the background sync loops. Must be shut down on logout or
/// app exit so no timer keeps firing against a stale session.
pub struct SyncScheduler {
    handles: Vec<JoinHandle<()>>,
}

impl SyncScheduler {
    pub fn shutdown(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.abort_all();
    }
}

fn strip_local_fields(payload: &RecordPayload) -> Map<String, Value> {
    let mut row = payload.to_fields();
    for key in CONTROL_FIELDS
        .iter()
        .chain(DISPLAY_FIELDS)
        .chain(IMAGE_FIELDS)
    {
        row.remove(*key);
    }
    row
}

/// Collision-resistant object name for an uploaded image.
fn object_name(kind: RecordKind, extension: &str) -> String {
    format!(
        "{}-{}-{}.{}",
        kind.as_str(),
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    )
}
