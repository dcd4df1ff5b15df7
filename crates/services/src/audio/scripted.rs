use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::output::{ActiveClip, AudioOutput};
use crate::error::PlaybackError;

/// How a scripted clip behaves once asked to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedStep {
    /// Start, then end cleanly after the duration.
    Finish(Duration),
    /// Refuse to start.
    Reject,
    /// Start, then fail after the duration.
    Fail(Duration),
    /// Start and play until stopped.
    Hold,
}

#[derive(Default)]
struct Script {
    queued: VecDeque<ScriptedStep>,
    by_source: HashMap<String, ScriptedStep>,
    start_delays: VecDeque<Duration>,
    started: Vec<String>,
}

/// In-memory audio output, for testing and headless runs.
///
/// The step for a clip is chosen by source first, then from the queue, then
/// the default.
pub struct ScriptedOutput {
    script: Mutex<Script>,
    default_step: ScriptedStep,
    stopped: Arc<AtomicUsize>,
}

impl ScriptedOutput {
    /// Every clip plays for 100 ms unless scripted otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            default_step: ScriptedStep::Finish(Duration::from_millis(100)),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn with_default(mut self, step: ScriptedStep) -> Self {
        self.default_step = step;
        self
    }

    /// Use `step` every time `src` is started.
    #[must_use]
    pub fn with_source(self, src: impl Into<String>, step: ScriptedStep) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.by_source.insert(src.into(), step);
        }
        self
    }

    /// Use `step` for the next clip without a per-source entry.
    pub fn push(&self, step: ScriptedStep) {
        if let Ok(mut script) = self.script.lock() {
            script.queued.push_back(step);
        }
    }

    /// Make the next start take `delay` before the clip begins.
    pub fn delay_next_start(&self, delay: Duration) {
        if let Ok(mut script) = self.script.lock() {
            script.start_delays.push_back(delay);
        }
    }

    /// Sources asked to start, rejected ones included, in order.
    #[must_use]
    pub fn started(&self) -> Vec<String> {
        self.script
            .lock()
            .map(|script| script.started.clone())
            .unwrap_or_default()
    }

    /// Number of clips halted by their owner.
    #[must_use]
    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    fn next_step(&self, src: &str) -> (ScriptedStep, Option<Duration>) {
        let Ok(mut script) = self.script.lock() else {
            return (self.default_step, None);
        };
        script.started.push(src.to_owned());
        let delay = script.start_delays.pop_front();
        let step = match script.by_source.get(src) {
            Some(step) => *step,
            None => script.queued.pop_front().unwrap_or(self.default_step),
        };
        (step, delay)
    }
}

impl Default for ScriptedOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioOutput for ScriptedOutput {
    async fn start(&self, src: &str) -> Result<ActiveClip, PlaybackError> {
        let (step, delay) = self.next_step(src);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if step == ScriptedStep::Reject {
            return Err(PlaybackError::Rejected {
                src: src.to_owned(),
                detail: "scripted rejection".into(),
            });
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let stopped = Arc::clone(&self.stopped);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                outcome = play(step) => outcome,
                () = token.cancelled() => {
                    stopped.fetch_add(1, Ordering::SeqCst);
                    Err(PlaybackError::Interrupted)
                }
            };
            let _ = tx.send(outcome);
        });

        Ok(ActiveClip::new(cancel, rx))
    }
}

async fn play(step: ScriptedStep) -> Result<(), PlaybackError> {
    match step {
        ScriptedStep::Finish(length) => {
            tokio::time::sleep(length).await;
            Ok(())
        }
        ScriptedStep::Fail(after) => {
            tokio::time::sleep(after).await;
            Err(PlaybackError::Failed("scripted failure".into()))
        }
        ScriptedStep::Hold => std::future::pending().await,
        ScriptedStep::Reject => Err(PlaybackError::Rejected {
            src: String::new(),
            detail: "scripted rejection".into(),
        }),
    }
}
