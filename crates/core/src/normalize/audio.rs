use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

/// Characters left untouched when encoding a path as a URI component.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// File mounts tried for bare paths, most preferred first.
const FILE_MOUNTS: [&str; 2] = ["gradio_api/file=", "file="];

/// The accepted shapes of an audio reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioPayload<'a> {
    /// A bare string: either an absolute URL or a server-side path.
    Text(&'a str),
    /// An object carrying a ready-to-use `url`.
    Url(&'a str),
    /// An object carrying only a server-side `path`.
    Path(&'a str),
    Missing,
}

impl<'a> AudioPayload<'a> {
    #[must_use]
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::String(text)) if !text.is_empty() => Self::Text(text),
            Some(Value::Object(map)) => {
                if let Some(url) = non_empty_str(map.get("url")) {
                    Self::Url(url)
                } else if let Some(path) = non_empty_str(map.get("path")) {
                    Self::Path(path)
                } else {
                    Self::Missing
                }
            }
            _ => Self::Missing,
        }
    }

    /// Playable sources for this payload, most preferred first.
    #[must_use]
    pub fn candidates(&self, base_url: &str) -> Vec<String> {
        match *self {
            Self::Url(url) => vec![url.to_owned()],
            Self::Text(reference) | Self::Path(reference) => {
                if is_absolute_http(reference) {
                    vec![reference.to_owned()]
                } else {
                    file_url_candidates(base_url, reference)
                }
            }
            Self::Missing => Vec::new(),
        }
    }
}

/// Resolve an audio payload into candidate sources.
#[must_use]
pub fn resolve_candidates(payload: Option<&Value>, base_url: &str) -> Vec<String> {
    AudioPayload::from_value(payload).candidates(base_url)
}

/// Build the primary and legacy file URLs for a server-side path.
#[must_use]
pub fn file_url_candidates(base_url: &str, path: &str) -> Vec<String> {
    let encoded = utf8_percent_encode(path, URI_COMPONENT).to_string();
    let base = base_url.trim_end_matches('/');
    FILE_MOUNTS
        .iter()
        .map(|mount| format!("{base}/{mount}{encoded}"))
        .collect()
}

/// True for `http://` and `https://` references, scheme matched case-insensitively.
#[must_use]
pub fn is_absolute_http(reference: &str) -> bool {
    let lower = reference
        .get(..8)
        .unwrap_or(reference)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://127.0.0.1:7860/";

    #[test]
    fn bare_path_yields_two_mounts_in_order() {
        let candidates = resolve_candidates(Some(&json!("/tmp/cache/apple_af_bella.wav")), BASE);
        assert_eq!(
            candidates,
            vec![
                "http://127.0.0.1:7860/gradio_api/file=%2Ftmp%2Fcache%2Fapple_af_bella.wav",
                "http://127.0.0.1:7860/file=%2Ftmp%2Fcache%2Fapple_af_bella.wav",
            ]
        );
    }

    #[test]
    fn every_bare_path_ends_with_both_mounts() {
        for path in ["a.wav", "audio cache/ice cream.wav", "词/单词.wav", "x(1)!.wav"] {
            let encoded = utf8_percent_encode(path, URI_COMPONENT).to_string();
            let candidates = file_url_candidates(BASE, path);
            assert_eq!(candidates.len(), 2);
            assert!(candidates[0].ends_with(&format!("gradio_api/file={encoded}")));
            assert!(candidates[1].ends_with(&format!("/file={encoded}")));
            assert!(!candidates[1].ends_with(&format!("gradio_api/file={encoded}")));
        }
    }

    #[test]
    fn encoding_matches_uri_component_rules() {
        let candidates = file_url_candidates("http://h", "a b+c/(d)*~'!.wav");
        assert_eq!(candidates[1], "http://h/file=a%20b%2Bc%2F(d)*~'!.wav");
    }

    #[test]
    fn absolute_urls_pass_through_alone() {
        for url in ["http://x/a.wav", "HTTPS://cdn.example/a.wav"] {
            assert_eq!(resolve_candidates(Some(&json!(url)), BASE), vec![url.to_string()]);
        }
    }

    #[test]
    fn object_url_wins_over_path() {
        let payload = json!({ "url": "http://x/f.wav", "path": "/tmp/f.wav" });
        assert_eq!(resolve_candidates(Some(&payload), BASE), vec!["http://x/f.wav"]);
    }

    #[test]
    fn object_path_resolves_like_a_bare_path() {
        let payload = json!({ "url": "", "path": "f.wav" });
        assert_eq!(resolve_candidates(Some(&payload), BASE).len(), 2);

        let payload = json!({ "path": "https://x/f.wav" });
        assert_eq!(resolve_candidates(Some(&payload), BASE), vec!["https://x/f.wav"]);
    }

    #[test]
    fn missing_shapes_yield_nothing() {
        assert!(resolve_candidates(None, BASE).is_empty());
        assert!(resolve_candidates(Some(&Value::Null), BASE).is_empty());
        assert!(resolve_candidates(Some(&json!("")), BASE).is_empty());
        assert!(resolve_candidates(Some(&json!({ "size": 3 })), BASE).is_empty());
        assert!(resolve_candidates(Some(&json!(42)), BASE).is_empty());
    }
}
