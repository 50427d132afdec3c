#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;

use relato_core::ports::{
    BlobStore, ChimePlayer, DesktopNotifier, NotificationGateway, PushChannel, PushSubscription,
    RecordSink, RowChange, SessionProvider, ToastObserver,
};
use relato_core::{
    AppError, EventId, NotificationEvent, NotificationKind, RecordKind, UserId,
};

pub fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn event(id: i64, kind: NotificationKind) -> NotificationEvent {
    NotificationEvent {
        id: EventId::new(id).unwrap(),
        recipient_id: user("recipient"),
        sender_id: Some(user("sender")),
        sender_name: Some("Ana".to_string()),
        kind,
        title: format!("event {id}"),
        body: "body".to_string(),
        read: false,
        created_at: Utc::now(),
    }
}

/// Captures replayed rows; optionally rejects rows by title.
#[derive(Default)]
pub struct RecordingSink {
    rows: Mutex<Vec<(RecordKind, Value)>>,
    calls: AtomicUsize,
    fail_titles: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, title: &str) {
        self.fail_titles.lock().unwrap().push(title.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_titles.lock().unwrap().clear();
    }

    pub fn rows(&self) -> Vec<(RecordKind, Value)> {
        self.rows.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn insert(&self, kind: RecordKind, row: Value) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let title = row.get("title").and_then(Value::as_str).unwrap_or_default();
        if self.fail_titles.lock().unwrap().iter().any(|t| t == title) {
            return Err(AppError::Network("insert rejected".to_string()));
        }
        self.rows.lock().unwrap().push((kind, row));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBlobStore {
    uploads: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl FakeBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn upload(
        &self,
        object_name: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Storage("upload rejected".to_string()));
        }
        self.uploads.lock().unwrap().push(object_name.to_string());
        Ok(format!("https://cdn.example/{object_name}"))
    }
}

pub struct FixedSession(pub Option<UserId>);

#[async_trait]
impl SessionProvider for FixedSession {
    async fn current_user(&self) -> Result<Option<UserId>, AppError> {
        Ok(self.0.clone())
    }
}

/// Gateway whose responses are scripted by the test.
#[derive(Default)]
pub struct ScriptedGateway {
    pub recent: Mutex<Vec<NotificationEvent>>,
    pub after: Mutex<Vec<NotificationEvent>>,
    pub by_id: Mutex<HashMap<i64, NotificationEvent>>,
    pub fail_polls: AtomicBool,
    pub marked_read: Mutex<Vec<Vec<i64>>>,
    pub deleted: Mutex<Vec<Vec<i64>>>,
}

#[async_trait]
impl NotificationGateway for ScriptedGateway {
    async fn recent(
        &self,
        _recipient: &UserId,
        _limit: u32,
    ) -> Result<Vec<NotificationEvent>, AppError> {
        Ok(self.recent.lock().unwrap().clone())
    }

    async fn after(
        &self,
        _recipient: &UserId,
        after: EventId,
    ) -> Result<Vec<NotificationEvent>, AppError> {
        if self.fail_polls.load(Ordering::SeqCst) {
            return Err(AppError::Network("poll refused".to_string()));
        }
        let mut events: Vec<NotificationEvent> = self
            .after
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.id > after)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.id);
        Ok(events)
    }

    async fn by_id(&self, id: EventId) -> Result<Option<NotificationEvent>, AppError> {
        Ok(self.by_id.lock().unwrap().get(&id.value()).cloned())
    }

    async fn mark_read(&self, id: EventId) -> Result<(), AppError> {
        self.marked_read.lock().unwrap().push(vec![id.value()]);
        Ok(())
    }

    async fn mark_read_many(&self, ids: &[EventId]) -> Result<(), AppError> {
        self.marked_read
            .lock()
            .unwrap()
            .push(ids.iter().map(EventId::value).collect());
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<(), AppError> {
        self.deleted.lock().unwrap().push(vec![id.value()]);
        Ok(())
    }

    async fn delete_many(&self, ids: &[EventId]) -> Result<(), AppError> {
        self.deleted
            .lock()
            .unwrap()
            .push(ids.iter().map(EventId::value).collect());
        Ok(())
    }
}

/// Push channel fed by the test through an mpsc sender.
pub struct ManualPush {
    receiver: Mutex<Option<mpsc::Receiver<RowChange>>>,
}

impl ManualPush {
    pub fn new() -> (Arc<Self>, mpsc::Sender<RowChange>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Arc::new(Self {
                receiver: Mutex::new(Some(rx)),
            }),
            tx,
        )
    }
}

#[async_trait]
impl PushChannel for ManualPush {
    async fn subscribe(&self, _recipient: &UserId) -> Result<PushSubscription, AppError> {
        let rx = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| AppError::Network("already subscribed".to_string()))?;
        Ok(PushSubscription::new(rx))
    }
}

#[derive(Default)]
pub struct RecordingChime {
    pub plays: AtomicUsize,
}

impl ChimePlayer for RecordingChime {
    fn play(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingDesktop {
    pub shown: Mutex<Vec<i64>>,
}

#[async_trait]
impl DesktopNotifier for RecordingDesktop {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), AppError> {
        self.shown.lock().unwrap().push(event.id.value());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingToast {
    pub shown: Mutex<Vec<i64>>,
}

impl ToastObserver for RecordingToast {
    fn on_occurrence(&self, event: &NotificationEvent) {
        self.shown.lock().unwrap().push(event.id.value());
    }
}
