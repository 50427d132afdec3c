mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use common::{FakeBlobStore, FixedSession, RecordingSink};
use relato_core::application::services::{ConnectivityMonitor, SyncEngine};
use relato_core::infrastructure::offline::SqliteOfflineQueue;
use relato_core::ports::OfflineQueue;
use relato_core::shared::config::SyncConfig;
use relato_core::{ImageFailurePolicy, PendingRecordDraft, RecordKind, RecordPayload, UserId};

struct World {
    engine: Arc<SyncEngine>,
    queue: Arc<SqliteOfflineQueue>,
    sink: Arc<RecordingSink>,
    blobs: Arc<FakeBlobStore>,
    pool: Pool<Sqlite>,
}

async fn world() -> World {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let queue = Arc::new(SqliteOfflineQueue::new(pool.clone()));
    let sink = Arc::new(RecordingSink::new());
    let blobs = Arc::new(FakeBlobStore::new());
    let session = Arc::new(FixedSession(Some(
        UserId::new("field-agent".to_string()).unwrap(),
    )));

    let engine = Arc::new(SyncEngine::new(
        queue.clone(),
        sink.clone(),
        blobs.clone(),
        session,
        SyncConfig {
            auto_sync: true,
            sync_interval_secs: 300,
            purge_grace_hours: 24,
            image_failure_policy: ImageFailurePolicy::SubmitWithoutImage,
        },
    ));

    World {
        engine,
        queue,
        sink,
        blobs,
        pool,
    }
}

async fn enqueue(world: &World, kind: RecordKind, payload: serde_json::Value) {
    world
        .queue
        .enqueue(PendingRecordDraft::new(
            kind,
            RecordPayload::new(payload).unwrap(),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn offline_submissions_replay_in_full_once_sync_runs() {
    let w = world().await;

    enqueue(
        &w,
        RecordKind::Occurrence,
        json!({
            "title": "broken valve",
            "company_id": 3,
            "company_name": "Acme",
            "created_offline": true,
            "image_base64": "data:image/png;base64,aGVsbG8="
        }),
    )
    .await;
    enqueue(
        &w,
        RecordKind::Visit,
        json!({ "title": "quarterly inspection", "user_id": "stale" }),
    )
    .await;

    let report = w.engine.sync_all().await;

    assert!(report.success);
    assert_eq!(report.total_synced, 2);
    assert_eq!(report.total_pending, 2);

    let rows = w.sink.rows();
    assert_eq!(rows.len(), 2);

    let (kind, occurrence) = &rows[0];
    assert_eq!(*kind, RecordKind::Occurrence);
    assert!(occurrence.get("company_name").is_none());
    assert!(occurrence.get("created_offline").is_none());
    assert!(occurrence.get("image_base64").is_none());
    assert!(occurrence["image_url"]
        .as_str()
        .unwrap()
        .ends_with(".png"));
    assert_eq!(w.blobs.uploads().len(), 1);

    let (kind, visit) = &rows[1];
    assert_eq!(*kind, RecordKind::Visit);
    assert_eq!(visit["user_id"], json!("field-agent"));
    assert_eq!(visit["created_by"], json!("field-agent"));

    // Everything is drained; the local copies stay until retention.
    assert_eq!(w.queue.count_pending().await.unwrap().total, 0);
    let report = w.engine.sync_all().await;
    assert_eq!(report.total_pending, 0);
    assert_eq!(w.sink.call_count(), 2);
}

#[tokio::test]
async fn failed_records_survive_for_the_next_pass() {
    let w = world().await;
    w.sink.fail_on("second");

    for title in ["first", "second", "third"] {
        enqueue(&w, RecordKind::Occurrence, json!({ "title": title })).await;
    }

    let report = w.engine.sync_all().await;
    assert!(!report.success);
    assert_eq!(report.total_synced, 2);
    assert_eq!(report.occurrences.errors.len(), 1);
    assert_eq!(
        report.summary(),
        "2 of 3 synced, 1 failed"
    );

    // The backend recovers; only the failed record is replayed.
    w.sink.clear_failures();
    let report = w.engine.sync_all().await;
    assert!(report.success);
    assert_eq!(report.total_synced, 1);
    assert_eq!(w.queue.count_pending().await.unwrap().total, 0);
}

#[tokio::test]
async fn coming_back_online_triggers_an_immediate_sync() {
    let w = world().await;
    enqueue(&w, RecordKind::Occurrence, json!({ "title": "queued offline" })).await;

    let monitor = ConnectivityMonitor::new(false);
    let scheduler = w.engine.schedule(&monitor);

    monitor.handle_online();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    assert_eq!(w.sink.call_count(), 1);
    assert_eq!(w.queue.count_pending().await.unwrap().total, 0);
    scheduler.shutdown();
}

#[tokio::test(start_paused = true)]
async fn the_periodic_pass_skips_while_offline() {
    let w = world().await;
    enqueue(&w, RecordKind::Occurrence, json!({ "title": "stuck" })).await;

    let monitor = ConnectivityMonitor::new(false);
    let scheduler = w.engine.schedule(&monitor);

    tokio::time::sleep(std::time::Duration::from_secs(601)).await;

    assert_eq!(w.sink.call_count(), 0);
    assert_eq!(w.queue.count_pending().await.unwrap().total, 1);
    scheduler.shutdown();
}

#[tokio::test(start_paused = true)]
async fn the_periodic_pass_drains_pending_work_when_online()
{
    let w = world().await;
    enqueue(&w, RecordKind::Occurrence, json!({ "title": "waiting" })).await;

    let monitor = ConnectivityMonitor::new(true);
    let scheduler = w.engine.schedule(&monitor);

    tokio::time::sleep(std::time::Duration::from_secs(301)).await;

    assert_eq!(w.sink.call_count(), 1);
    assert_eq!(w.queue.count_pending().await.unwrap().total, 0);
    scheduler.shutdown();
}

#[tokio::test]
async fn the_grace_purge_removes_only_records_past_the_window() {
    let w = world().await;

    enqueue(&w, RecordKind::Occurrence, json!({ "title": "old" })).await;
    enqueue(&w, RecordKind::Occurrence, json!({ "title": "fresh" })).await;
    w.engine.sync_all().await;

    // Backdate one record past the 24 h grace window.
    let yesterday = (Utc::now() - Duration::hours(25)).timestamp();
    sqlx::query(
        "UPDATE pending_records SET synced_at = ?1 WHERE payload LIKE '%\"old\"%'",
    )
    .bind(yesterday)
    .execute(&w.pool)
    .await
    .unwrap();

    assert_eq!(w.engine.purge_synced().await.unwrap(), 1);
    assert_eq!(w.engine.purge_synced().await.unwrap(), 0);

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_records")
        .fetch_one(&w.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn image_upload_failure_still_submits_the_record() {
    let w = world().await;
    w.blobs.fail.store(true, Ordering::SeqCst);

    enqueue(
        &w,
        RecordKind::Occurrence,
        json!({ "title": "no image", "image_base64": "data:image/jpeg;base64,aGVsbG8=" }),
    )
    .await;

    let report = w.engine.sync_all().await;

    assert!(report.success);
    let rows = w.sink.rows();
    assert!(rows[0].1.get("image_url").is_none());
}
