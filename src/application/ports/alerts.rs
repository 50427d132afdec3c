use crate::domain::entities::NotificationEvent;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Plays the locally synthesized notification cue. Implementations must not
/// fail loudly: an unavailable audio device is swallowed.
pub trait ChimePlayer: Send + Sync {
    fn play(&self);
}

/// Raw audio output. The chime is rendered to WAV bytes once and handed to
/// whatever sink the embedding shell provides.
pub trait AudioSink: Send + Sync {
    fn play_wav(&self, wav: &[u8]) -> Result<(), AppError>;
}

/// Native desktop notification surface. Best-effort: a denied OS permission
/// is reported as an error and ignored by the caller.
#[async_trait]
pub trait DesktopNotifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), AppError>;
}

/// Receives the transient toast for occurrence events. Registered explicitly
/// on the notification center rather than broadcast over an event bus.
pub trait ToastObserver: Send + Sync {
    fn on_occurrence(&self, event: &NotificationEvent);
}
