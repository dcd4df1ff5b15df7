#![forbid(unsafe_code)]

pub mod format;
pub mod model;
pub mod normalize;
pub mod progress;

pub use model::{ItemStatus, LearningItem, ProgressSnapshot, WordEntry, WordError};
pub use progress::{is_completion_status, parse_progress};
