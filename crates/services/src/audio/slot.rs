use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::output::AudioOutput;
use crate::error::PlaybackError;

#[derive(Debug)]
struct LiveClip {
    id: u64,
    cancel: CancellationToken,
}

/// Proof that a clip started through [`AudioSlot::play`]; redeem it with
/// [`AudioSlot::finish`].
#[derive(Debug)]
pub struct ClipTicket {
    id: u64,
    done: oneshot::Receiver<Result<(), PlaybackError>>,
}

/// Owns at most one live clip.
///
/// Starting a clip stops the previous one first; a clip releases the slot when
/// it ends, fails or is stopped.
pub struct AudioSlot {
    output: Arc<dyn AudioOutput>,
    current: Mutex<Option<LiveClip>>,
    next_id: AtomicU64,
}

impl AudioSlot {
    #[must_use]
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            current: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Stop whatever is playing, then start `src`.
    ///
    /// # Errors
    ///
    /// Returns the output's `PlaybackError` when the clip cannot begin.
    pub async fn play(&self, src: &str) -> Result<ClipTicket, PlaybackError> {
        self.play_if(src, || true).await
    }

    /// Like [`play`](Self::play), but only while `keep` holds. `keep` is checked
    /// before the live clip is stopped and again before the new clip takes the
    /// slot, so a caller that lost its turn never touches a newer clip.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Interrupted` when `keep` fails, otherwise the
    /// output's `PlaybackError` when the clip cannot begin.
    pub async fn play_if<F>(&self, src: &str, keep: F) -> Result<ClipTicket, PlaybackError>
    where
        F: Fn() -> bool,
    {
        if src.trim().is_empty() {
            return Err(PlaybackError::NoSource);
        }
        {
            let mut current = self.current();
            if !keep() {
                return Err(PlaybackError::Interrupted);
            }
            if let Some(previous) = current.take() {
                previous.cancel.cancel();
            }
        }

        let clip = self.output.start(src).await?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut current = self.current();
            if !keep() {
                clip.cancel.cancel();
                debug!(%src, "clip dropped before taking the slot");
                return Err(PlaybackError::Interrupted);
            }
            if let Some(previous) = current.replace(LiveClip {
                id,
                cancel: clip.cancel,
            }) {
                previous.cancel.cancel();
            }
        }

        debug!(clip = id, %src, "clip started");
        Ok(ClipTicket {
            id,
            done: clip.done,
        })
    }

    /// Wait for a clip to end and release the slot if it still owns it.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Interrupted` when the clip was stopped, or the
    /// output's error when playback failed.
    pub async fn finish(&self, ticket: ClipTicket) -> Result<(), PlaybackError> {
        let outcome = ticket
            .done
            .await
            .unwrap_or(Err(PlaybackError::Interrupted));
        self.release(ticket.id);
        outcome
    }

    /// Halt the live clip, if any.
    pub fn stop(&self) {
        if let Some(clip) = self.current().take() {
            debug!(clip = clip.id, "clip stopped");
            clip.cancel.cancel();
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.current().is_some()
    }

    fn release(&self, id: u64) {
        let mut current = self.current();
        if current.as_ref().is_some_and(|clip| clip.id == id) {
            *current = None;
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<LiveClip>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
