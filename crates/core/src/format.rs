//! Display helpers shared by front-ends.

/// `33.3` → `"33.3%"`.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// `(12, 40)` → `"12/40"`.
#[must_use]
pub fn format_progress(learned: u32, total: u32) -> String {
    format!("{learned}/{total}")
}

/// Whole seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Keep the first `max_chars` characters, appending `...` when text was cut.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}
