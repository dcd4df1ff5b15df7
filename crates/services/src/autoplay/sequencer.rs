use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use remote::{Endpoint, PredictClient, replies};
use serde_json::json;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use word_core::{ItemStatus, LearningItem, ProgressSnapshot};

use super::state::{AutoPlayEvent, AutoPlayPhase, AutoPlaySettings, Control, SequencerState};
use crate::audio::{AudioOutput, AudioSlot};
use crate::error::{AutoPlayError, PlaybackError};

const EVENT_CAPACITY: usize = 64;

//
// ─── AUTO PLAYER ───────────────────────────────────────────────────────────────
//

/// Plays a preloaded word list item by item, retrying each item's clip.
///
/// Shared as `Arc<AutoPlayer>`: `start` spawns the pass onto the runtime while
/// `pause`, `resume`, `stop` and `reset` are called from elsewhere. The pass
/// waits on a `watch` channel instead of polling, and every state write it
/// makes is checked against its run id so a superseded pass never touches a
/// newer one's state.
pub struct AutoPlayer {
    client: Arc<dyn PredictClient>,
    slot: AudioSlot,
    settings: AutoPlaySettings,
    control: watch::Sender<Control>,
    state: Mutex<SequencerState>,
    events: broadcast::Sender<AutoPlayEvent>,
}

impl AutoPlayer {
    #[must_use]
    pub fn new(
        client: Arc<dyn PredictClient>,
        output: Arc<dyn AudioOutput>,
        settings: AutoPlaySettings,
    ) -> Self {
        let (control, _) = watch::channel(Control::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            slot: AudioSlot::new(output),
            settings,
            control,
            state: Mutex::new(SequencerState::default()),
            events,
        }
    }

    //
    // ─── PRELOAD ───────────────────────────────────────────────────────────────
    //

    /// Load a word list and resolve one audio source per word.
    ///
    /// Words whose audio cannot be fetched are kept without a source. On any
    /// failure the list stays empty and the error is recorded.
    ///
    /// # Errors
    ///
    /// Returns `AutoPlayError::AlreadyRunning` during a pass,
    /// `AutoPlayError::EmptyWordList` for a list without usable words,
    /// `AutoPlayError::Timeout` when the preload timeout elapses,
    /// `AutoPlayError::Cancelled` when reset while loading, or the remote error.
    pub async fn preload(&self, folder: &str, file: &str) -> Result<usize, AutoPlayError> {
        let epoch = {
            let mut state = self.state();
            if self.control().running {
                return Err(AutoPlayError::AlreadyRunning);
            }
            state.loading = true;
            state.error = None;
            state.items.clear();
            state.cursor = 0;
            state.play_count = 0;
            state.halted = false;
            state.epoch
        };
        info!(folder, file, "preloading word list");

        let limit = self.settings.preload_timeout;
        let outcome = match tokio::time::timeout(limit, self.fetch_items(folder, file)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AutoPlayError::Timeout(limit)),
        };

        let mut state = self.state();
        if state.epoch != epoch {
            return Err(AutoPlayError::Cancelled);
        }
        state.loading = false;
        match outcome {
            Ok(items) => {
                let count = items.len();
                let without_audio = items
                    .iter()
                    .filter(|item| item.audio_source().is_none())
                    .count();
                state.items = items;
                info!(count, without_audio, "word list ready");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "preload failed");
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_items(
        &self,
        folder: &str,
        file: &str,
    ) -> Result<Vec<LearningItem>, AutoPlayError> {
        let reply = self
            .client
            .predict(Endpoint::LoadWordList, vec![json!(folder), json!(file)])
            .await?;
        let entries = replies::word_list(&reply)?;
        if entries.is_empty() {
            return Err(AutoPlayError::EmptyWordList);
        }

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let source = match self
                .client
                .predict(Endpoint::PlayWordPronunciation, vec![json!(entry.word())])
                .await
            {
                Ok(reply) => replies::audio_candidates(&reply, self.client.base_url())
                    .into_iter()
                    .next(),
                Err(e) => {
                    warn!(word = entry.word(), error = %e, "no audio for word");
                    None
                }
            };
            items.push(LearningItem::pending(entry, source));
        }
        Ok(items)
    }

    //
    // ─── CONTROL ───────────────────────────────────────────────────────────────
    //

    /// Begin a pass over the loaded items from the first one.
    ///
    /// The returned handle resolves when the pass completes or is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `AutoPlayError::NothingToPlay` when no items are loaded and
    /// `AutoPlayError::AlreadyRunning` while another pass is active.
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>, AutoPlayError> {
        let run = {
            let mut state = self.state();
            if state.items.is_empty() {
                state.error = Some(AutoPlayError::NothingToPlay.to_string());
                return Err(AutoPlayError::NothingToPlay);
            }

            let mut started = None;
            self.control.send_if_modified(|control| {
                if control.running {
                    return false;
                }
                control.running = true;
                control.paused = false;
                control.run += 1;
                started = Some(control.run);
                true
            });
            let run = started.ok_or(AutoPlayError::AlreadyRunning)?;

            state.cursor = 0;
            state.play_count = 0;
            state.halted = false;
            state.error = None;
            for item in &mut state.items {
                item.set_status(ItemStatus::Pending);
            }
            info!(run, items = state.items.len(), "auto-play started");
            run
        };

        Ok(tokio::spawn(Arc::clone(self).drive(run)))
    }

    /// Suspend the pass and halt the live clip. Returns `false` when not running
    /// or already paused.
    pub fn pause(&self) -> bool {
        let paused = self.control.send_if_modified(|control| {
            if !control.running || control.paused {
                return false;
            }
            control.paused = true;
            control.pauses += 1;
            true
        });
        if paused {
            self.slot.stop();
            info!("auto-play paused");
        }
        paused
    }

    /// Continue a paused pass with the next attempt of the current item.
    pub fn resume(&self) -> bool {
        let resumed = self.control.send_if_modified(|control| {
            if !control.running || !control.paused {
                return false;
            }
            control.paused = false;
            true
        });
        if resumed {
            info!("auto-play resumed");
        }
        resumed
    }

    /// Cancel the pass. Item statuses are left as they are.
    pub fn stop(&self) -> bool {
        let mut stopped = false;
        {
            let mut state = self.state();
            self.control.send_if_modified(|control| {
                if !control.running {
                    return false;
                }
                control.running = false;
                control.paused = false;
                stopped = true;
                true
            });
            if stopped {
                state.halted = true;
                state.play_count = 0;
            }
        }
        self.slot.stop();
        if stopped {
            info!("auto-play stopped");
        }
        stopped
    }

    /// Drop everything: items, cursor, flags, loading and error.
    pub fn reset(&self) {
        {
            let mut state = self.state();
            self.control.send_if_modified(|control| {
                let changed = control.running || control.paused;
                control.running = false;
                control.paused = false;
                changed
            });
            let epoch = state.epoch.wrapping_add(1);
            *state = SequencerState {
                epoch,
                ..SequencerState::default()
            };
        }
        self.slot.stop();
        debug!("auto-play reset");
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AutoPlayEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn items(&self) -> Vec<LearningItem> {
        self.state().items.clone()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.state().cursor
    }

    /// Attempt number within the current item, 0 between items.
    #[must_use]
    pub fn play_count(&self) -> u32 {
        self.state().play_count
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.control().running
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.control().paused
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state().is_complete()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    #[must_use]
    pub fn phase(&self) -> AutoPlayPhase {
        let state = self.state();
        state.phase(self.control())
    }

    /// Completed items over all items.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        let state = self.state();
        let learned = u32::try_from(state.count(ItemStatus::Completed)).unwrap_or(u32::MAX);
        let total = u32::try_from(state.items.len()).unwrap_or(u32::MAX);
        ProgressSnapshot::from_counts(learned, total)
    }

    #[must_use]
    pub fn settings(&self) -> &AutoPlaySettings {
        &self.settings
    }

    //
    // ─── PASS ──────────────────────────────────────────────────────────────────
    //

    async fn drive(self: Arc<Self>, run: u64) {
        let total = self.state().items.len();

        for index in 0..total {
            let Some(word) = self.begin_item(run, index) else {
                return;
            };
            self.emit(AutoPlayEvent::ItemStarted { index, word });

            let Some(status) = self.play_item(run, index).await else {
                return;
            };
            if !self.finish_item(run, index, status) {
                return;
            }
            self.emit(AutoPlayEvent::ItemFinished { index, status });

            if index + 1 < total {
                self.emit(AutoPlayEvent::ScrollTo { index: index + 1 });
            }
        }

        self.complete(run);
    }

    /// Run the attempts for one item. `None` means the pass was cancelled.
    ///
    /// An attempt halted by a pause is not used up: it is replayed after resume.
    async fn play_item(&self, run: u64, index: usize) -> Option<ItemStatus> {
        let mut attempt = 1;
        while attempt <= self.settings.attempts_per_item {
            if !self.wait_while_paused(run).await || !self.begin_attempt(run, attempt) {
                return None;
            }
            let pauses = self.control().pauses;
            self.emit(AutoPlayEvent::Attempt { index, attempt });

            match self.attempt(run, index).await {
                Ok(()) => {
                    if !self.linger(run).await {
                        return None;
                    }
                    return Some(ItemStatus::Completed);
                }
                Err(e) => {
                    let control = self.control();
                    if !control.owns(run) {
                        return None;
                    }
                    if matches!(e, PlaybackError::Interrupted) && control.pauses != pauses {
                        debug!(index, attempt, "attempt halted by pause");
                        continue;
                    }
                    debug!(index, attempt, error = %e, "attempt failed");
                    attempt += 1;
                }
            }
        }
        Some(ItemStatus::Failed)
    }

    async fn attempt(&self, run: u64, index: usize) -> Result<(), PlaybackError> {
        let source = self
            .state()
            .items
            .get(index)
            .and_then(|item| item.audio_source().map(str::to_owned));
        let Some(src) = source else {
            return Err(PlaybackError::NoSource);
        };

        let ticket = self
            .slot
            .play_if(&src, || {
                let control = self.control();
                control.owns(run) && !control.paused
            })
            .await?;
        self.slot.finish(ticket).await
    }

    async fn wait_while_paused(&self, run: u64) -> bool {
        let mut control = self.control.subscribe();
        match control.wait_for(|c| !c.owns(run) || !c.paused).await {
            Ok(current) => current.owns(run),
            Err(_) => false,
        }
    }

    /// Sit out the inter-item delay. Only cancellation cuts it short.
    async fn linger(&self, run: u64) -> bool {
        let mut control = self.control.subscribe();
        tokio::select! {
            () = tokio::time::sleep(self.settings.item_delay) => {}
            _ = control.wait_for(|c| !c.owns(run)) => {}
        }
        self.control().owns(run)
    }

    fn begin_item(&self, run: u64, index: usize) -> Option<String> {
        let mut state = self.state();
        if !self.control().owns(run) {
            return None;
        }
        let word = state.items.get(index)?.word().to_owned();
        state.cursor = index;
        state.play_count = 0;
        Some(word)
    }

    fn begin_attempt(&self, run: u64, attempt: u32) -> bool {
        let mut state = self.state();
        if !self.control().owns(run) {
            return false;
        }
        state.play_count = attempt;
        true
    }

    fn finish_item(&self, run: u64, index: usize, status: ItemStatus) -> bool {
        let mut state = self.state();
        if !self.control().owns(run) {
            return false;
        }
        match state.items.get_mut(index) {
            Some(item) => {
                item.set_status(status);
                true
            }
            None => false,
        }
    }

    fn complete(&self, run: u64) {
        let (completed, failed) = {
            let mut state = self.state();
            let mut finished = false;
            self.control.send_if_modified(|control| {
                if !control.owns(run) {
                    return false;
                }
                control.running = false;
                control.paused = false;
                finished = true;
                true
            });
            if !finished {
                return;
            }
            state.cursor = state.items.len();
            state.play_count = 0;
            (state.count(ItemStatus::Completed), state.count(ItemStatus::Failed))
        };

        info!(run, completed, failed, "auto-play finished");
        self.emit(AutoPlayEvent::Finished { completed, failed });
    }

    fn emit(&self, event: AutoPlayEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn control(&self) -> Control {
        *self.control.borrow()
    }

    fn state(&self) -> MutexGuard<'_, SequencerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use remote::ScriptedClient;

    use super::*;
    use crate::audio::ScriptedOutput;

    fn player() -> Arc<AutoPlayer> {
        Arc::new(AutoPlayer::new(
            Arc::new(ScriptedClient::connected("http://h")),
            Arc::new(ScriptedOutput::new()),
            AutoPlaySettings::default(),
        ))
    }

    #[test]
    fn fresh_player_is_idle() {
        let player = player();
        assert_eq!(player.phase(), AutoPlayPhase::Idle);
        assert_eq!(player.progress(), ProgressSnapshot::default());
        assert!(!player.pause());
        assert!(!player.resume());
        assert!(!player.stop());
    }

    #[tokio::test]
    async fn start_without_items_fails_fast() {
        let player = player();
        assert!(matches!(player.start(), Err(AutoPlayError::NothingToPlay)));
        assert_eq!(player.error().as_deref(), Some("nothing to play"));
        assert!(!player.is_playing());
    }
}
