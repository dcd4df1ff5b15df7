use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::PlaybackError;

/// A clip that has begun playing.
///
/// Cancelling `cancel` halts output; `done` resolves once the clip ends, fails
/// or is halted.
#[derive(Debug)]
pub struct ActiveClip {
    pub cancel: CancellationToken,
    pub done: oneshot::Receiver<Result<(), PlaybackError>>,
}

impl ActiveClip {
    #[must_use]
    pub fn new(
        cancel: CancellationToken,
        done: oneshot::Receiver<Result<(), PlaybackError>>,
    ) -> Self {
        Self { cancel, done }
    }

    /// A clip that already ended cleanly.
    #[must_use]
    pub fn finished() -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(()));
        Self::new(CancellationToken::new(), rx)
    }
}

/// Contract for an audio device.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Begin playing `src`. Returns only once playback has actually begun.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` when the source is rejected or the device fails
    /// to start.
    async fn start(&self, src: &str) -> Result<ActiveClip, PlaybackError>;
}
