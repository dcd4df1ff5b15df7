use serde::Serialize;
use word_core::{ProgressSnapshot, WordEntry};

/// The card on screen plus overall progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub(crate) current: Option<WordEntry>,
    pub(crate) flipped: bool,
    pub(crate) progress: ProgressSnapshot,
}

impl SessionState {
    #[must_use]
    pub fn current(&self) -> Option<&WordEntry> {
        self.current.as_ref()
    }

    /// Whether the meaning side is showing.
    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        self.progress
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress.is_complete()
    }

    pub(crate) fn show(&mut self, entry: WordEntry, progress: Option<ProgressSnapshot>) {
        self.current = Some(entry);
        self.flipped = false;
        if let Some(progress) = progress {
            self.progress = progress;
        }
    }
}

/// How `start_learning` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A word is ready to study.
    Learning,
    /// The file holds nothing left to learn.
    Completion { message: String },
    Error { message: String },
}

impl StartOutcome {
    /// True for both `Learning` and `Completion`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }
}
