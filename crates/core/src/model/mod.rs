mod item;
mod snapshot;
mod word;

pub use item::{ItemStatus, LearningItem};
pub use snapshot::ProgressSnapshot;
pub use word::{WordEntry, WordError};
