use std::time::Duration;

use serde::Serialize;
use word_core::{ItemStatus, LearningItem};

pub const DEFAULT_ATTEMPTS_PER_ITEM: u32 = 3;
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_PRELOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for an auto-play pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlaySettings {
    pub attempts_per_item: u32,
    /// Pause after a clip plays through, before the item counts as completed.
    pub item_delay: Duration,
    pub preload_timeout: Duration,
}

impl Default for AutoPlaySettings {
    fn default() -> Self {
        Self {
            attempts_per_item: DEFAULT_ATTEMPTS_PER_ITEM,
            item_delay: DEFAULT_ITEM_DELAY,
            preload_timeout: DEFAULT_PRELOAD_TIMEOUT,
        }
    }
}

/// Where a pass stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoPlayPhase {
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

/// Notifications published while a pass runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoPlayEvent {
    ItemStarted { index: usize, word: String },
    Attempt { index: usize, attempt: u32 },
    ItemFinished { index: usize, status: ItemStatus },
    /// The item at `index` is up next and should be brought into view.
    ScrollTo { index: usize },
    Finished { completed: usize, failed: usize },
}

/// Flags the running loop waits on. `run` identifies the pass that owns them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Control {
    pub running: bool,
    pub paused: bool,
    pub run: u64,
    /// Bumped by every pause, so an attempt can tell it was cut short by one.
    pub pauses: u64,
}

impl Control {
    pub fn owns(&self, run: u64) -> bool {
        self.running && self.run == run
    }
}

#[derive(Debug, Default)]
pub(crate) struct SequencerState {
    pub items: Vec<LearningItem>,
    pub cursor: usize,
    pub play_count: u32,
    pub loading: bool,
    pub error: Option<String>,
    /// Set when a pass was stopped before completing.
    pub halted: bool,
    /// Bumped by reset so an in-flight preload can tell it was superseded.
    pub epoch: u64,
}

impl SequencerState {
    pub fn count(&self, status: ItemStatus) -> usize {
        self.items
            .iter()
            .filter(|item| item.status() == status)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.cursor >= self.items.len()
    }

    pub fn phase(&self, control: Control) -> AutoPlayPhase {
        match control {
            Control { running: true, paused: true, .. } => AutoPlayPhase::Paused,
            Control { running: true, .. } => AutoPlayPhase::Running,
            _ if self.halted => AutoPlayPhase::Stopped,
            _ if self.is_complete() => AutoPlayPhase::Completed,
            _ => AutoPlayPhase::Idle,
        }
    }
}
