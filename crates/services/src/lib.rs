#![forbid(unsafe_code)]

pub mod app_services;
pub mod audio;
pub mod autoplay;
pub mod error;
pub mod file_selection;
pub mod learning;

pub use app_services::AppServices;
pub use audio::{AudioOutput, AudioSlot, CommandOutput, PronunciationPlayer, ScriptedOutput};
pub use autoplay::{AutoPlayEvent, AutoPlayPhase, AutoPlaySettings, AutoPlayer};
pub use error::{AppServicesError, AutoPlayError, PlaybackError, PronunciationError};
pub use file_selection::{FileSelectionService, SelectionState};
pub use learning::{SessionState, StartOutcome, WordLearningService};
