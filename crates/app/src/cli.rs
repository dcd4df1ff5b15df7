use clap::{Args, Parser, Subcommand};
use remote::RemoteConfig;
use remote::config::{DEFAULT_HOST, DEFAULT_PORT};
use services::CommandOutput;

/// Drill vocabulary against a word-learning backend.
#[derive(Debug, Parser)]
#[command(name = "word-drill", version)]
pub struct Cli {
    /// Full backend URL; overrides --host and --port.
    #[arg(long, env = "WORD_GRADIO_URL", global = true)]
    pub gradio_url: Option<String>,

    #[arg(long, env = "WORD_GRADIO_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    #[arg(long, env = "WORD_GRADIO_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Audio player command line; `{src}` is replaced by the clip URL.
    #[arg(long, env = "WORD_PLAYER", global = true)]
    pub player: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List word folders and the files of the first one.
    Folders,
    /// List the word files of a folder.
    Files { folder: String },
    /// Study flash cards interactively.
    Learn(Target),
    /// Play every word of a file in order, three tries per word.
    Autoplay {
        #[command(flatten)]
        target: Target,
        /// Print the final summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Pronounce a single word.
    Say { word: String },
}

/// Word file to work on; the first folder and file are used when omitted.
#[derive(Debug, Clone, Default, Args)]
pub struct Target {
    #[arg(long)]
    pub folder: Option<String>,
    #[arg(long)]
    pub file: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig::resolve(self.gradio_url.as_deref(), &self.host, self.port)
    }

    #[must_use]
    pub fn audio_output(&self) -> CommandOutput {
        CommandOutput::resolve(self.player.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_url_beats_host_and_port() {
        let cli = Cli::try_parse_from([
            "word-drill",
            "--gradio-url",
            "http://words.local:9000/",
            "--port",
            "1234",
            "folders",
        ])
        .unwrap();
        assert_eq!(cli.remote_config().base_url, "http://words.local:9000");
    }

    #[test]
    fn autoplay_takes_target_and_json() {
        let cli = Cli::try_parse_from([
            "word-drill",
            "autoplay",
            "--folder",
            "basics",
            "--file",
            "day1.json",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Autoplay { target, json } => {
                assert_eq!(target.folder.as_deref(), Some("basics"));
                assert_eq!(target.file.as_deref(), Some("day1.json"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn player_override_is_parsed() {
        let cli = Cli::try_parse_from(["word-drill", "--player", "mpv --no-video", "say", "apple"])
            .unwrap();
        assert_eq!(cli.audio_output().program(), "mpv");
    }
}
