use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use services::{AppServices, AutoPlaySettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod keys;

use cli::{Cli, Command};

const DEFAULT_LOG_FILTER: &str = "word_drill=info,services=info,remote=info";

fn init_tracing() {
    // stdout carries the transcript; logs go to stderr
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.remote_config();
    let output = Arc::new(cli.audio_output());
    info!(base_url = %config.base_url, player = output.program(), "starting word-drill");

    let services = AppServices::gradio(&config, output, AutoPlaySettings::default())
        .context("invalid backend configuration")?;
    services
        .connect()
        .await
        .with_context(|| format!("cannot reach backend at {}", config.base_url))?;

    let outcome = match &cli.command {
        Command::Folders => commands::folders(&services).await,
        Command::Files { folder } => commands::files(&services, folder).await,
        Command::Learn(target) => commands::learn(&services, target).await,
        Command::Autoplay { target, json } => commands::autoplay(&services, target, *json).await,
        Command::Say { word } => commands::say(&services, word).await,
    };

    services.shutdown();
    outcome
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
