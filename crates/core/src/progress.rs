//! Progress extraction from the backend's free-text status lines.
//!
//! Two phrasings are recognised, in priority order:
//!
//! 1. `"进度: 12/40 (30.0%)"`: counts plus a reported percentage.
//! 2. `"已学习: 5/5 单词"`: the completion statistics, percentage derived.
//!
//! Unrecognised text is a no-op for callers, never an error.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::ProgressSnapshot;

static RATIO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)/(\d+)\s*\((\d+\.?\d*)%\)").expect("ratio pattern compiles")
});

static COMPLETION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"已学习:\s*(\d+)\s*/\s*(\d+)\s*单词").expect("completion pattern compiles")
});

/// Extract a progress snapshot from status text.
///
/// Returns `None` when neither phrasing matches or a number does not fit.
#[must_use]
pub fn parse_progress(text: &str) -> Option<ProgressSnapshot> {
    if let Some(caps) = RATIO_PATTERN.captures(text) {
        let (learned, total) = counts(&caps)?;
        let percentage = caps.get(3)?.as_str().parse::<f64>().ok()?;
        return Some(ProgressSnapshot::with_percentage(learned, total, percentage));
    }

    let caps = COMPLETION_PATTERN.captures(text)?;
    let (learned, total) = counts(&caps)?;
    Some(ProgressSnapshot::from_counts(learned, total))
}

/// True when the text is the backend's "all words learned" statistics line.
#[must_use]
pub fn is_completion_status(text: &str) -> bool {
    COMPLETION_PATTERN.is_match(text)
}

impl ProgressSnapshot {
    /// Replace this snapshot with the one parsed from `text`.
    ///
    /// Leaves the snapshot untouched and returns `false` on unrecognised text.
    pub fn apply_text(&mut self, text: &str) -> bool {
        match parse_progress(text) {
            Some(parsed) => {
                *self = parsed;
                true
            }
            None => false,
        }
    }
}

fn counts(caps: &Captures<'_>) -> Option<(u32, u32)> {
    let learned = caps.get(1)?.as_str().parse().ok()?;
    let total = caps.get(2)?.as_str().parse().ok()?;
    Some((learned, total))
}
