use serde_json::Value;

/// Read a text output that may arrive as `"text"` or `{ "value": "text" }`.
///
/// The result is trimmed; any other shape reads as the empty string.
#[must_use]
pub fn text_value(value: Option<&Value>) -> String {
    let text = match value {
        Some(Value::String(text)) => Some(text.as_str()),
        Some(Value::Object(map)) => map.get("value").and_then(Value::as_str),
        _ => None,
    };
    text.map(str::trim).unwrap_or_default().to_owned()
}
