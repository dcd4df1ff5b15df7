//! Shared error types for the services crate.

use std::io;
use std::time::Duration;

use thiserror::Error;

use remote::{MalformedReply, RpcError};

/// Errors emitted by audio outputs and the audio slot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaybackError {
    #[error("no audio source")]
    NoSource,
    #[error("failed to launch player {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("player rejected {src}: {detail}")]
    Rejected { src: String, detail: String },
    #[error("playback failed: {0}")]
    Failed(String),
    #[error("playback interrupted")]
    Interrupted,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors recorded by `PronunciationPlayer`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PronunciationError {
    #[error("no audio data")]
    NoAudio,
    #[error("audio playback failed")]
    AllCandidatesFailed,
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Errors emitted by `AutoPlayer`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AutoPlayError {
    #[error("nothing to play")]
    NothingToPlay,
    #[error("auto-play is already running")]
    AlreadyRunning,
    #[error("no words in file")]
    EmptyWordList,
    #[error("preload timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("preload cancelled by reset")]
    Cancelled,
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Malformed(#[from] MalformedReply),
}

/// Errors emitted while assembling app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
}
