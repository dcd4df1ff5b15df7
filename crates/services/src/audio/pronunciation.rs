use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use remote::{Endpoint, PredictClient, replies};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::slot::AudioSlot;
use crate::error::{PlaybackError, PronunciationError};

type SharedError = Arc<Mutex<Option<String>>>;

/// Plays the backend's pronunciation of a word, one clip at a time.
pub struct PronunciationPlayer {
    client: Arc<dyn PredictClient>,
    slot: Arc<AudioSlot>,
    requesting: AtomicBool,
    error: SharedError,
}

impl PronunciationPlayer {
    #[must_use]
    pub fn new(client: Arc<dyn PredictClient>, slot: Arc<AudioSlot>) -> Self {
        Self {
            client,
            slot,
            requesting: AtomicBool::new(false),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Start `src`, replacing any live clip.
    ///
    /// Returns `true` once playback has begun, `false` when the source is
    /// rejected. A failure after the start is recorded as the player's error.
    pub async fn play(&self, src: &str) -> bool {
        let ticket = match self.slot.play(src).await {
            Ok(ticket) => ticket,
            Err(e) => {
                debug!(%src, error = %e, "source rejected");
                return false;
            }
        };

        let slot = Arc::clone(&self.slot);
        let error = Arc::clone(&self.error);
        tokio::spawn(async move {
            match slot.finish(ticket).await {
                Ok(()) | Err(PlaybackError::Interrupted) => {}
                Err(e) => {
                    warn!(error = %e, "playback failed");
                    set_error(&error, Some(e.to_string()));
                }
            }
        });
        true
    }

    /// Pronounce the session's current word. Ignored while already playing.
    pub async fn play_pronunciation(&self) -> bool {
        self.play_from(Endpoint::PlayPronunciation, Vec::new()).await
    }

    /// Pronounce an arbitrary word. Ignored while already playing.
    pub async fn play_word(&self, word: &str) -> bool {
        self.play_from(Endpoint::PlayWordPronunciation, vec![json!(word)])
            .await
    }

    pub fn stop(&self) {
        self.slot.stop();
    }

    /// Stop playback and clear the last error.
    pub fn reset(&self) {
        self.slot.stop();
        set_error(&self.error, None);
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.requesting.load(Ordering::SeqCst) || self.slot.is_playing()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn play_from(&self, endpoint: Endpoint, args: Vec<Value>) -> bool {
        if self.slot.is_playing() || self.requesting.swap(true, Ordering::SeqCst) {
            debug!(%endpoint, "already playing");
            return false;
        }
        set_error(&self.error, None);

        let outcome = self.fetch_and_play(endpoint, args).await;
        self.requesting.store(false, Ordering::SeqCst);

        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!(%endpoint, error = %e, "pronunciation failed");
                set_error(&self.error, Some(e.to_string()));
                false
            }
        }
    }

    async fn fetch_and_play(
        &self,
        endpoint: Endpoint,
        args: Vec<Value>,
    ) -> Result<(), PronunciationError> {
        let reply = self.client.predict(endpoint, args).await?;
        let candidates = replies::audio_candidates(&reply, self.client.base_url());
        if candidates.is_empty() {
            return Err(PronunciationError::NoAudio);
        }

        self.slot.stop();
        for src in &candidates {
            if self.play(src).await {
                return Ok(());
            }
        }
        Err(PronunciationError::AllCandidatesFailed)
    }
}

fn set_error(error: &Mutex<Option<String>>, value: Option<String>) {
    *error.lock().unwrap_or_else(PoisonError::into_inner) = value;
}
