use serde::{Deserialize, Serialize};

use crate::model::word::WordEntry;

/// Playback outcome of a learning item during an auto-play pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// A word queued for auto-play, with its resolved audio source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningItem {
    entry: WordEntry,
    audio_source: Option<String>,
    status: ItemStatus,
}

impl LearningItem {
    /// Create a pending item. Blank audio sources are stored as "no source".
    #[must_use]
    pub fn pending(entry: WordEntry, audio_source: Option<String>) -> Self {
        let audio_source = audio_source.filter(|src| !src.trim().is_empty());
        Self {
            entry,
            audio_source,
            status: ItemStatus::Pending,
        }
    }

    #[must_use]
    pub fn entry(&self) -> &WordEntry {
        &self.entry
    }

    #[must_use]
    pub fn word(&self) -> &str {
        self.entry.word()
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        self.entry.meaning()
    }

    #[must_use]
    pub fn audio_source(&self) -> Option<&str> {
        self.audio_source.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_audio_source_is_none() {
        let entry = WordEntry::new("a", "b").unwrap();
        let item = LearningItem::pending(entry, Some("  ".into()));
        assert_eq!(item.audio_source(), None);
        assert_eq!(item.status(), ItemStatus::Pending);
    }
}
