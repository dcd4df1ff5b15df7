//! Canonicalisation of loosely-typed backend payloads.
//!
//! Every function here is lenient: unexpected shapes collapse to "nothing"
//! (an empty list or empty string) instead of an error.

mod audio;
mod choices;
mod text;
mod words;

pub use audio::{AudioPayload, file_url_candidates, is_absolute_http, resolve_candidates};
pub use choices::normalize_choices;
pub use text::text_value;
pub use words::word_list;
