use std::env;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::output::{ActiveClip, AudioOutput};
use crate::error::PlaybackError;

pub const DEFAULT_PLAYER: &str = "ffplay -nodisp -autoexit -loglevel error {src}";
pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_millis(200);

const SOURCE_PLACEHOLDER: &str = "{src}";

/// Plays clips through an external player process.
///
/// A process still alive after the startup grace period counts as "playing".
/// A non-zero exit inside the grace period is a rejected start; afterwards it
/// is a playback failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    program: String,
    args: Vec<String>,
    startup_grace: Duration,
}

impl CommandOutput {
    /// Parse a whitespace-separated command line. `{src}` marks where the
    /// source goes; without it the source is appended. Returns `None` for a
    /// blank command line.
    #[must_use]
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        let mut args: Vec<String> = parts.collect();
        if !args.iter().any(|arg| arg.contains(SOURCE_PLACEHOLDER)) {
            args.push(SOURCE_PLACEHOLDER.to_owned());
        }
        Some(Self {
            program,
            args,
            startup_grace: DEFAULT_STARTUP_GRACE,
        })
    }

    /// A non-blank command line wins; otherwise [`DEFAULT_PLAYER`].
    #[must_use]
    pub fn resolve(command_line: Option<&str>) -> Self {
        command_line.and_then(Self::parse).unwrap_or_default()
    }

    /// Player from `WORD_PLAYER`, falling back to [`DEFAULT_PLAYER`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(env::var("WORD_PLAYER").ok().as_deref())
    }

    #[must_use]
    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn args_for(&self, src: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(SOURCE_PLACEHOLDER, src))
            .collect()
    }
}

impl Default for CommandOutput {
    fn default() -> Self {
        Self {
            program: "ffplay".into(),
            args: ["-nodisp", "-autoexit", "-loglevel", "error", SOURCE_PLACEHOLDER]
                .map(str::to_owned)
                .to_vec(),
            startup_grace: DEFAULT_STARTUP_GRACE,
        }
    }
}

#[async_trait]
impl AudioOutput for CommandOutput {
    async fn start(&self, src: &str) -> Result<ActiveClip, PlaybackError> {
        let mut child = Command::new(&self.program)
            .args(self.args_for(src))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        match tokio::time::timeout(self.startup_grace, child.wait()).await {
            Ok(Ok(status)) if status.success() => return Ok(ActiveClip::finished()),
            Ok(Ok(status)) => {
                return Err(PlaybackError::Rejected {
                    src: src.to_owned(),
                    detail: status.to_string(),
                });
            }
            Ok(Err(e)) => return Err(PlaybackError::Io(e)),
            Err(_still_running) => {}
        }

        debug!(program = %self.program, %src, "player started");
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => Ok(()),
                    Ok(status) => Err(PlaybackError::Failed(format!("player exited with {status}"))),
                    Err(e) => Err(PlaybackError::Io(e)),
                },
                () = token.cancelled() => {
                    let _ = child.kill().await;
                    Err(PlaybackError::Interrupted)
                }
            };
            let _ = tx.send(outcome);
        });

        Ok(ActiveClip::new(cancel, rx))
    }
}
