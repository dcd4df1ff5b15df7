//! Auto-play: preload a word list, then play each word's clip in order with
//! retry, pause/resume and cancellation.

mod sequencer;
mod state;

pub use sequencer::AutoPlayer;
pub use state::{
    AutoPlayEvent, AutoPlayPhase, AutoPlaySettings, DEFAULT_ATTEMPTS_PER_ITEM, DEFAULT_ITEM_DELAY,
    DEFAULT_PRELOAD_TIMEOUT,
};
