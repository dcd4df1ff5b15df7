use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("word cannot be empty")]
    EmptyWord,

    #[error("meaning cannot be empty")]
    EmptyMeaning,
}

//
// ─── WORD ENTRY ────────────────────────────────────────────────────────────────
//

/// A validated word/meaning pair. Both sides are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordEntry {
    word: String,
    meaning: String,
}

impl WordEntry {
    /// Build an entry from raw text, trimming both sides.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyWord` or `WordError::EmptyMeaning` when a side is blank.
    pub fn new(word: impl AsRef<str>, meaning: impl AsRef<str>) -> Result<Self, WordError> {
        let word = word.as_ref().trim();
        if word.is_empty() {
            return Err(WordError::EmptyWord);
        }
        let meaning = meaning.as_ref().trim();
        if meaning.is_empty() {
            return Err(WordError::EmptyMeaning);
        }
        Ok(Self {
            word: word.to_owned(),
            meaning: meaning.to_owned(),
        })
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }
}
