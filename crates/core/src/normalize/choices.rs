use serde_json::Value;

/// Flatten dropdown choices into their values.
///
/// A choice is either a scalar or a `[label, value]` pair; the value member is
/// preferred, falling back to the first element. Non-strings are stringified,
/// nulls and empty strings are dropped. Anything but an array yields nothing.
#[must_use]
pub fn normalize_choices(choices: &Value) -> Vec<String> {
    let Some(choices) = choices.as_array() else {
        return Vec::new();
    };

    choices
        .iter()
        .filter_map(|choice| {
            let value = match choice {
                Value::Array(pair) => pair
                    .get(1)
                    .filter(|value| !value.is_null())
                    .or_else(|| pair.first()),
                scalar => Some(scalar),
            };
            value.map(stringify).filter(|text| !text.is_empty())
        })
        .collect()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
