use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use services::{
    AppServices, AutoPlayEvent, AutoPlayPhase, AutoPlayer, SessionState, StartOutcome,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use word_core::format::{format_clock, format_percentage, format_progress, truncate_text};
use word_core::{ItemStatus, ProgressSnapshot};

use crate::cli::Target;
use crate::keys::{AUTOPLAY_HELP, AutoPlayKey, LEARN_HELP, LearnKey, stdin_lines};

const MEANING_WIDTH: usize = 40;

//
// ─── FILE SELECTION ────────────────────────────────────────────────────────────
//

pub async fn folders(services: &AppServices) -> Result<()> {
    let files = services.files();
    if !files.load_folders().await {
        bail!(selection_error(&files.snapshot().error));
    }

    let state = files.snapshot();
    if state.folders.is_empty() {
        println!("no folders");
        return Ok(());
    }
    for folder in &state.folders {
        let marker = if state.selected_folder.as_ref() == Some(folder) { '*' } else { ' ' };
        println!("{marker} {folder}");
        if marker == '*' {
            for file in &state.files {
                println!("    {file}");
            }
        }
    }
    Ok(())
}

pub async fn files(services: &AppServices, folder: &str) -> Result<()> {
    let files = services.files();
    if !files.select_folder(folder).await {
        bail!(selection_error(&files.snapshot().error));
    }
    let state = files.snapshot();
    if state.files.is_empty() {
        println!("no files in {folder}");
    }
    for file in &state.files {
        println!("{file}");
    }
    Ok(())
}

/// Fill in whatever part of the target was omitted from the backend's first choices.
async fn resolve_target(services: &AppServices, target: &Target) -> Result<(String, String)> {
    if let (Some(folder), Some(file)) = (&target.folder, &target.file) {
        return Ok((folder.clone(), file.clone()));
    }

    let files = services.files();
    let loaded = match &target.folder {
        Some(folder) => files.select_folder(folder).await,
        None => files.load_folders().await,
    };
    if !loaded {
        bail!(selection_error(&files.snapshot().error));
    }

    let state = files.snapshot();
    let folder = target
        .folder
        .clone()
        .or(state.selected_folder)
        .ok_or_else(|| anyhow!("backend offers no word folders"))?;
    let file = target
        .file
        .clone()
        .or(state.selected_file)
        .ok_or_else(|| anyhow!("folder {folder} has no word files"))?;
    Ok((folder, file))
}

fn selection_error(error: &Option<String>) -> String {
    error.clone().unwrap_or_else(|| "file selection failed".into())
}

//
// ─── LEARN ─────────────────────────────────────────────────────────────────────
//

pub async fn learn(services: &AppServices, target: &Target) -> Result<()> {
    let (folder, file) = resolve_target(services, target).await?;
    let learning = services.learning();
    let pronunciation = services.pronunciation();

    match learning.start_learning(&folder, &file).await {
        StartOutcome::Learning => {}
        StartOutcome::Completion { message } => {
            println!("{message}");
            println!("press r to start over, q to quit");
        }
        StartOutcome::Error { message } => bail!("cannot start {folder}/{file}: {message}"),
    }
    println!("{LEARN_HELP}");
    render_card(&learning.snapshot());

    let mut lines = stdin_lines();
    while let Some(line) = lines.recv().await {
        let Some(key) = LearnKey::parse(&line) else {
            println!("unknown key {:?}; {LEARN_HELP}", line.trim());
            continue;
        };

        match key {
            LearnKey::Flip => {
                learning.flip_card();
            }
            LearnKey::Known => {
                if !learning.mark_as_known().await {
                    println!("could not mark the word as known");
                    continue;
                }
                println!("marked as known");
            }
            LearnKey::Next => {
                if !learning.next_word().await {
                    println!("could not fetch the next word");
                    continue;
                }
            }
            LearnKey::Pronounce => {
                if !pronunciation.play_pronunciation().await {
                    if let Some(error) = pronunciation.error() {
                        println!("{error}");
                    }
                }
                continue;
            }
            LearnKey::Restart => {
                if !learning.restart_learning().await {
                    println!("could not restart");
                    continue;
                }
            }
            LearnKey::Help => {
                println!("{LEARN_HELP}");
                continue;
            }
            LearnKey::Quit => break,
        }
        render_card(&learning.snapshot());
    }

    pronunciation.stop();
    Ok(())
}

fn render_card(state: &SessionState) {
    let progress = progress_line(state.progress());
    match state.current() {
        Some(entry) if state.is_flipped() => {
            println!("[{progress}] {}  =  {}", entry.word(), entry.meaning());
        }
        Some(entry) => println!("[{progress}] {}", entry.word()),
        None if state.is_complete() => println!("all words learned [{progress}]"),
        None => println!("no word [{progress}]"),
    }
}

fn progress_line(progress: ProgressSnapshot) -> String {
    format!(
        "{} {}",
        format_progress(progress.learned(), progress.total()),
        format_percentage(progress.percentage())
    )
}

//
// ─── AUTO-PLAY ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct AutoPlaySummary {
    folder: String,
    file: String,
    phase: AutoPlayPhase,
    progress: ProgressSnapshot,
    failed: Vec<String>,
    elapsed_secs: u64,
}

pub async fn autoplay(services: &AppServices, target: &Target, json: bool) -> Result<()> {
    let (folder, file) = resolve_target(services, target).await?;
    let player = services.autoplay();

    let count = player
        .preload(&folder, &file)
        .await
        .with_context(|| format!("cannot load {folder}/{file}"))?;
    if !json {
        println!("loaded {count} words from {folder}/{file}; {AUTOPLAY_HELP}");
    }

    let started = Instant::now();
    let mut events = player.subscribe();
    let mut run = player.start()?;
    let controls = tokio::spawn(forward_controls(Arc::clone(&player)));

    loop {
        tokio::select! {
            finished = &mut run => {
                finished.context("auto-play task failed")?;
                break;
            }
            event = events.recv() => match event {
                Ok(event) if !json => print_event(&player, &event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => debug!(missed, "auto-play events dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    while let Ok(event) = events.try_recv() {
        if !json {
            print_event(&player, &event);
        }
    }
    controls.abort();

    let summary = AutoPlaySummary {
        folder,
        file,
        phase: player.phase(),
        progress: player.progress(),
        failed: player
            .items()
            .iter()
            .filter(|item| item.status() == ItemStatus::Failed)
            .map(|item| item.word().to_owned())
            .collect(),
        elapsed_secs: started.elapsed().as_secs(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{:?}: {} in {}",
            summary.phase,
            progress_line(summary.progress),
            format_clock(summary.elapsed_secs)
        );
        if !summary.failed.is_empty() {
            println!("failed: {}", summary.failed.join(", "));
        }
    }
    Ok(())
}

async fn forward_controls(player: Arc<AutoPlayer>) {
    let mut lines = stdin_lines();
    while let Some(line) = lines.recv().await {
        match AutoPlayKey::parse(&line) {
            Some(AutoPlayKey::Pause) => {
                if player.pause() {
                    println!("paused; r to resume");
                }
            }
            Some(AutoPlayKey::Resume) => {
                if player.resume() {
                    println!("resumed");
                }
            }
            Some(AutoPlayKey::Stop) => {
                player.stop();
                return;
            }
            None => println!("{AUTOPLAY_HELP}"),
        }
    }
}

fn print_event(player: &AutoPlayer, event: &AutoPlayEvent) {
    match event {
        AutoPlayEvent::ItemStarted { index, word } => {
            let meaning = player
                .items()
                .get(*index)
                .map(|item| truncate_text(item.meaning(), MEANING_WIDTH))
                .unwrap_or_default();
            println!("{:>3}. {word}  {meaning}", index + 1);
        }
        AutoPlayEvent::Attempt { attempt, .. } if *attempt > 1 => {
            println!("     retry {attempt}");
        }
        AutoPlayEvent::ItemFinished {
            status: ItemStatus::Failed,
            ..
        } => println!("     failed"),
        _ => {}
    }
}

//
// ─── SAY ───────────────────────────────────────────────────────────────────────
//

const PLAYBACK_POLL: Duration = Duration::from_millis(100);

pub async fn say(services: &AppServices, word: &str) -> Result<()> {
    let pronunciation = services.pronunciation();
    if !pronunciation.play_word(word).await {
        let reason = pronunciation
            .error()
            .unwrap_or_else(|| "playback did not start".into());
        bail!("cannot pronounce {word}: {reason}");
    }

    while pronunciation.is_playing() {
        tokio::time::sleep(PLAYBACK_POLL).await;
    }
    match pronunciation.error() {
        Some(reason) => Err(anyhow!("playback of {word} failed: {reason}")),
        None => Ok(()),
    }
}
