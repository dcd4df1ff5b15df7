//! Single-clip audio playback.
//!
//! An [`AudioOutput`] renders clips; an [`AudioSlot`] owns at most one live clip
//! on top of it. [`PronunciationPlayer`] is the one-shot "say this word" consumer.

mod command;
mod output;
mod pronunciation;
mod scripted;
mod slot;

pub use command::{CommandOutput, DEFAULT_PLAYER, DEFAULT_STARTUP_GRACE};
pub use output::{ActiveClip, AudioOutput};
pub use pronunciation::PronunciationPlayer;
pub use scripted::{ScriptedOutput, ScriptedStep};
pub use slot::{AudioSlot, ClipTicket};
