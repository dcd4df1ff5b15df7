use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;

/// Commands accepted while studying flash cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnKey {
    Flip,
    Known,
    Next,
    Pronounce,
    Restart,
    Help,
    Quit,
}

impl LearnKey {
    /// An empty line (Enter) moves on, like the arrow key in the web client.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        if line.is_empty() {
            return Some(Self::Next);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "f" | "flip" => Some(Self::Flip),
            "k" | "known" => Some(Self::Known),
            "n" | "next" => Some(Self::Next),
            "p" | "say" => Some(Self::Pronounce),
            "r" | "restart" => Some(Self::Restart),
            "h" | "?" | "help" => Some(Self::Help),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub const LEARN_HELP: &str =
    "keys: f/space flip, k known, n/enter next, p pronounce, r restart, q quit";

/// Commands accepted during auto-play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlayKey {
    Pause,
    Resume,
    Stop,
}

impl AutoPlayKey {
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "s" | "q" | "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

pub const AUTOPLAY_HELP: &str = "keys: p pause, r resume, s stop";

/// Forward stdin lines from a detached thread so a pending read never holds
/// up runtime shutdown.
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
