use serde_json::Value;

use crate::model::WordEntry;

/// Collect the well-formed `{ word, meaning }` items of a word-list payload.
///
/// Items without a non-empty string `word` and `meaning` are skipped silently;
/// a payload that is not an array yields an empty list.
#[must_use]
pub fn word_list(payload: &Value) -> Vec<WordEntry> {
    let Some(items) = payload.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let word = item.get("word").and_then(Value::as_str)?;
            let meaning = item.get("meaning").and_then(Value::as_str)?;
            WordEntry::new(word, meaning).ok()
        })
        .collect()
}
