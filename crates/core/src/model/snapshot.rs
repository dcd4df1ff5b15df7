use serde::{Deserialize, Serialize};

/// Learning progress as `(learned, total, remaining, percentage)`.
///
/// `remaining` is always `total - learned`, clamped at zero. The percentage is
/// derived; it is only taken verbatim when the backend reports one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    total: u32,
    learned: u32,
    remaining: u32,
    percentage: f64,
}

impl ProgressSnapshot {
    /// Build a snapshot from counts, deriving the percentage (one decimal place).
    #[must_use]
    pub fn from_counts(learned: u32, total: u32) -> Self {
        Self::with_percentage(learned, total, derived_percentage(learned, total))
    }

    /// Build a snapshot with a percentage reported by the backend.
    #[must_use]
    pub fn with_percentage(learned: u32, total: u32, percentage: f64) -> Self {
        Self {
            total,
            learned,
            remaining: total.saturating_sub(learned),
            percentage,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn learned(&self) -> u32 {
        self.learned
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// True once every word of a non-empty list has been learned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.remaining == 0
    }
}

fn derived_percentage(learned: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = f64::from(learned) / f64::from(total);
    (ratio * 1000.0).round() / 10.0
}
