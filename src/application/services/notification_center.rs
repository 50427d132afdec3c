use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::application::ports::{
    ChimePlayer, DesktopNotifier, NotificationGateway, PushChannel, RowChange, ToastObserver,
};
use crate::domain::entities::NotificationEvent;
use crate::domain::value_objects::{EventId, UserId};
use crate::shared::config::NotificationsConfig;
use crate::shared::error::AppError;

struct CenterState {
    /// In-memory list, newest first. Mirrors the remote table for the UI.
    events: Vec<NotificationEvent>,
    /// Highest id already dispatched to side effects. Both delivery paths
    /// check and advance this mark under the same lock, which is what keeps
    /// dispatch exactly-once.
    high_water: Option<EventId>,
}

/// Delivers notification events for one logged-in session.
///
/// The push channel is the primary path; a fixed-interval poll runs in
/// parallel as the correctness backstop for events the channel misses. Both
/// paths funnel through [`NotificationCenter::deliver`].
pub struct NotificationCenter {
    gateway: Arc<dyn NotificationGateway>,
    push: Arc<dyn PushChannel>,
    chime: Arc<dyn ChimePlayer>,
    desktop: Arc<dyn DesktopNotifier>,
    toasts: Arc<StdMutex<Vec<Arc<dyn ToastObserver>>>>,
    recipient: UserId,
    config: NotificationsConfig,
    state: Arc<Mutex<CenterState>>,
    tasks: Arc<StdMutex<Vec<JoinHandle<()>>>>,
}

impl NotificationCenter {
    pub fn new(
        gateway: Arc<dyn NotificationGateway>,
        push: Arc<dyn PushChannel>,
        chime: Arc<dyn ChimePlayer>,
        desktop: Arc<dyn DesktopNotifier>,
        recipient: UserId,
        config: NotificationsConfig,
    ) -> Self {
        Self {
            gateway,
            push,
            chime,
            desktop,
            toasts: Arc::new(StdMutex::new(Vec::new())),
            recipient,
            config,
            state: Arc::new(Mutex::new(CenterState {
                events: Vec::new(),
                high_water: None,
            })),
            tasks: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    /// Register a toast receiver. Observers only ever see occurrence events.
    pub fn register_toast_observer(&self, observer: Arc<dyn ToastObserver>) {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner()).push(observer);
    }

    /// Populate the list with the most recent events and set the dedup mark.
    /// Initial load drives no side effects.
    pub async fn load_initial(&self) -> Result<(), AppError> {
        let events = self
            .gateway
            .recent(&self.recipient, self.config.initial_limit)
            .await?;

        let mut state = self.state.lock().await;
        let newest = events.iter().map(|e| e.id).max();
        state.high_water = match (state.high_water, newest) {
            (Some(current), Some(new)) => Some(current.max(new)),
            (mark, None) => mark,
            (None, new) => new,
        };
        state.events = events;
        debug!(
            "notifications: loaded {} events, mark at {:?}",
            state.events.len(),
            state.high_water
        );
        Ok(())
    }

    /// Start the push reader and the polling loop. Call once per session.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());

        let center = self.clone();
        tasks.push(tokio::spawn(async move {
            center.run_push().await;
        }));

        let center = self.clone();
        tasks.push(tokio::spawn(async move {
            center.run_poll().await;
        }));
    }

    /// Tear down the session: close the push subscription and stop polling.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    async fn run_push(&self) {
        let mut subscription = match self.push.subscribe(&self.recipient).await {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!("notifications: push subscribe failed, relying on polling: {err}");
                return;
            }
        };

        while let Some(change) = subscription.next().await {
            match change {
                RowChange::Inserted { id } => match self.gateway.by_id(id).await {
                    Ok(Some(event)) => {
                        self.deliver(event).await;
                    }
                    Ok(None) => debug!("notifications: pushed event {id} vanished before fetch"),
                    Err(err) => {
                        // The poll will pick the event up.
                        warn!("notifications: failed to fetch pushed event {id}: {err}");
                    }
                },
                RowChange::Updated { event } => self.apply_update(event).await,
                RowChange::Deleted { id } => self.drop_local(id).await,
            }
        }

        warn!("notifications: push channel closed, polling remains active");
    }

    async fn run_poll(&self) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(err) = self.poll_for_new().await {
                // The mark was not advanced; the next tick retries.
                warn!("notifications: poll failed: {err}");
            }
        }
    }

    /// Fetch and dispatch everything past the high-water mark, oldest first,
    /// so the mark advances monotonically and toasts appear in causal order.
    pub async fn poll_for_new(&self) -> Result<u32, AppError> {
        let mark = { self.state.lock().await.high_water };
        let fresh = match mark {
            Some(mark) => self.gateway.after(&self.recipient, mark).await?,
            None => {
                // No mark yet (empty table at initial load). The recent
                // fetch comes back newest-first; reorder so the oldest
                // event dispatches first and none land below the mark.
                let mut fresh = self
                    .gateway
                    .recent(&self.recipient, self.config.initial_limit)
                    .await?;
                fresh.sort_by_key(|e| e.id);
                fresh
            }
        };

        let mut dispatched = 0u32;
        for event in fresh {
            if self.deliver(event).await {
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    /// The single serialized dispatch path shared by push and poll.
    ///
    /// Checks the id against the high-water mark and advances it atomically
    /// before any side effect fires; a duplicate arriving over the other
    /// path is dropped here. Returns whether the event was dispatched.
    pub async fn deliver(&self, event: NotificationEvent) -> bool {
        let mut state = self.state.lock().await;
        if state.high_water.is_some_and(|mark| event.id <= mark) {
            debug!("notifications: event {} already delivered", event.id);
            return false;
        }
        state.high_water = Some(event.id);
        state.events.insert(0, event.clone());

        // Audio cue and toast are for occurrences only; the desktop
        // notification goes out for every kind. Deliberate asymmetry.
        if event.is_occurrence() {
            self.chime.play();
            let observers = {
                let toasts = self.toasts.lock().unwrap_or_else(|e| e.into_inner());
                toasts.clone()
            };
            for observer in observers {
                observer.on_occurrence(&event);
            }
        }
        if let Err(err) = self.desktop.notify(&event).await {
            debug!("notifications: desktop notification skipped: {err}");
        }
        true
    }

    async fn apply_update(&self, event: NotificationEvent) {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.events.iter_mut().find(|e| e.id == event.id) {
            // Push rows lack the denormalized sender name; keep the one we
            // already resolved.
            let sender_name = existing.sender_name.take().or(event.sender_name.clone());
            *existing = NotificationEvent {
                sender_name,
                ..event
            };
        }
    }

    async fn drop_local(&self, id: EventId) {
        let mut state = self.state.lock().await;
        state.events.retain(|e| e.id != id);
    }

    /// Mark one event read remotely and mirror it locally. No refetch.
    pub async fn mark_read(&self, id: EventId) -> Result<(), AppError> {
        self.gateway.mark_read(id).await?;
        let mut state = self.state.lock().await;
        if let Some(event) = state.events.iter_mut().find(|e| e.id == id) {
            event.read = true;
        }
        Ok(())
    }

    /// Mark every unread event read. A no-op without unread events.
    pub async fn mark_all_read(&self) -> Result<(), AppError> {
        let unread: Vec<EventId> = {
            let state = self.state.lock().await;
            state
                .events
                .iter()
                .filter(|e| !e.read)
                .map(|e| e.id)
                .collect()
        };
        if unread.is_empty() {
            return Ok(());
        }
        self.gateway.mark_read_many(&unread).await?;
        let mut state = self.state.lock().await;
        for event in state.events.iter_mut() {
            event.read = true;
        }
        Ok(())
    }

    /// Delete one event remotely and locally.
    pub async fn delete(&self, id: EventId) -> Result<(), AppError> {
        self.gateway.delete(id).await?;
        self.drop_local(id).await;
        Ok(())
    }

    /// Delete every already-read event.
    pub async fn delete_all_read(&self) -> Result<(), AppError> {
        let read: Vec<EventId> = {
            let state = self.state.lock().await;
            state
                .events
                .iter()
                .filter(|e| e.read)
                .map(|e| e.id)
                .collect()
        };
        if read.is_empty() {
            return Ok(());
        }
        self.gateway.delete_many(&read).await?;
        let mut state = self.state.lock().await;
        state.events.retain(|e| !e.read);
        Ok(())
    }

    /// Badge count.
    pub async fn unread_count(&self) -> u32 {
        let state = self.state.lock().await;
        state.events.iter().filter(|e| !e.read).count() as u32
    }

    /// Snapshot of the in-memory list, newest first.
    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.state.lock().await.events.clone()
    }

    pub async fn high_water(&self) -> Option<EventId> {
        self.state.lock().await.high_water
    }
}

impl Clone for NotificationCenter {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            push: self.push.clone(),
            chime: self.chime.clone(),
            desktop: self.desktop.clone(),
            toasts: self.toasts.clone(),
            recipient: self.recipient.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            tasks: self.tasks.clone(),
        }
    }
}
