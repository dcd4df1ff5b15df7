use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use remote::replies::{self, StartReply};
use remote::{Endpoint, PredictClient};
use serde_json::json;
use tracing::{info, warn};
use word_core::{ProgressSnapshot, WordEntry};

use super::session::{SessionState, StartOutcome};

const NO_WORD_DATA: &str = "no word data returned";

/// Drives a flash-card session against the backend.
///
/// Every transition is one remote call; remote failures become `false` or an
/// `Error` outcome and leave the session as it was.
pub struct WordLearningService {
    client: Arc<dyn PredictClient>,
    state: Mutex<SessionState>,
}

impl WordLearningService {
    #[must_use]
    pub fn new(client: Arc<dyn PredictClient>) -> Self {
        Self {
            client,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Open a word file and show its first word.
    pub async fn start_learning(&self, folder: &str, file: &str) -> StartOutcome {
        let reply = match self
            .client
            .predict(Endpoint::StartLearning, vec![json!(folder), json!(file)])
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(folder, file, error = %e, "start learning failed");
                return StartOutcome::Error {
                    message: e.to_string(),
                };
            }
        };

        let parsed = match replies::start_learning(&reply) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "start learning reply rejected");
                return StartOutcome::Error {
                    message: e.to_string(),
                };
            }
        };

        let mut state = self.state();
        match parsed {
            StartReply::Word { entry, progress } => {
                info!(folder, file, word = entry.word(), "learning started");
                state.show(entry, progress);
                StartOutcome::Learning
            }
            StartReply::Completed { status, progress } => {
                info!(folder, file, "word file already learned");
                if let Some(progress) = progress {
                    state.progress = progress;
                }
                state.current = None;
                StartOutcome::Completion { message: status }
            }
            StartReply::Status(message) => StartOutcome::Error { message },
            StartReply::Empty => StartOutcome::Error {
                message: NO_WORD_DATA.into(),
            },
        }
    }

    /// Advance to the next word, or clear the card when none remain.
    ///
    /// Returns `false` only when the request fails.
    pub async fn next_word(&self) -> bool {
        let reply = match self.client.predict(Endpoint::NextWord, Vec::new()).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "next word failed");
                return false;
            }
        };

        let next = replies::next_word(&reply);
        let mut state = self.state();
        match next.entry {
            Some(entry) => state.show(entry, next.progress),
            None => {
                info!("no words remain");
                state.current = None;
                state.flipped = false;
                if let Some(progress) = next.progress {
                    state.progress = progress;
                }
            }
        }
        true
    }

    /// Mark the current word as known. Requires a current word.
    pub async fn mark_as_known(&self) -> bool {
        if self.state().current.is_none() {
            return false;
        }

        match self.client.predict(Endpoint::MarkAsKnown, Vec::new()).await {
            Ok(reply) => {
                if let Some(progress) = replies::mark_as_known(&reply) {
                    self.state().progress = progress;
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "mark as known failed");
                false
            }
        }
    }

    /// Reset the backend's progress and show the first word again.
    ///
    /// Without a complete word in the reply the session is left untouched.
    pub async fn restart_learning(&self) -> bool {
        let reply = match self.client.predict(Endpoint::ResetAndRestart, Vec::new()).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "restart failed");
                return false;
            }
        };

        match replies::restart(&reply) {
            Ok(restarted) => {
                info!(word = restarted.entry.word(), "learning restarted");
                self.state().show(restarted.entry, restarted.progress);
                true
            }
            Err(e) => {
                warn!(error = %e, "restart reply rejected");
                false
            }
        }
    }

    /// Toggle the card face. Returns the new flip state.
    pub fn flip_card(&self) -> bool {
        let mut state = self.state();
        state.flipped = !state.flipped;
        state.flipped
    }

    pub fn reset(&self) {
        *self.state() = SessionState::default();
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    #[must_use]
    pub fn current_word(&self) -> Option<WordEntry> {
        self.state().current.clone()
    }

    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.state().flipped
    }

    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        self.state().progress
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state().is_complete()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
