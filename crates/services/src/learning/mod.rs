//! Flash-card learning session.

mod service;
mod session;

pub use service::WordLearningService;
pub use session::{SessionState, StartOutcome};
