//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::config::Overrides;
use crate::logging;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Tempo-synchronised audio bars for the terminal
#[derive(Parser)]
#[command(name = "beatbars")]
#[command(version)]
#[command(long_about = "Tempo-synchronised audio bars for the terminal.\n\nEach beat is split into a fixed number of bars. The display scrolls one bar per\nsample period, so a full sweep always takes exactly one beat regardless of the\nterminal's frame rate.\n\nDEFAULT COMMAND:\n    If no command is specified, 'visualize' is used.\n\nEXAMPLES:\n    # Visualize the default microphone at 128 BPM\n    $ beatbars --bpm 128\n\n    # Play a track with 32 bars per beat\n    $ beatbars play track.wav --bars 32\n\n    # Edit configuration file\n    $ beatbars config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/beatbars/beatbars.toml\n    Logs:               ~/.local/state/beatbars/beatbars.log.*"
)]
struct Cli {
    #[command(flatten)]
    tempo: TempoArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Per-run overrides of the config file.
#[derive(Args, Debug, Clone, Default)]
struct TempoArgs {
    /// Tempo in beats per minute
    #[arg(short, long, global = true)]
    bpm: Option<f64>,

    /// Number of bars per beat
    #[arg(long = "bars", value_name = "N", global = true)]
    bar_count: Option<usize>,

    /// Playback delay in milliseconds (defaults to one beat)
    #[arg(long, value_name = "MS", global = true)]
    delay_ms: Option<f64>,

    /// Input device for 'visualize': "default", an index, or a name from 'list-devices'
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// Output device for 'play': "default", an index, or a name from 'list-devices'
    #[arg(short, long, global = true)]
    output_device: Option<String>,
}

impl From<TempoArgs> for Overrides {
    fn from(args: TempoArgs) -> Self {
        Overrides {
            bpm: args.bpm,
            bar_count: args.bar_count,
            delay_ms: args.delay_ms,
            device: args.device,
            output_device: args.output_device,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show live bars from an input device (default)
    ///
    /// Press Space to pause/resume, Escape/q to quit.
    #[command(visible_alias = "v")]
    Visualize,

    /// Play a WAV file with a beat-aligned bar display
    ///
    /// The audio is delayed by one beat (or --delay-ms) so that each bar
    /// reaches the edge of the display as it is heard.
    #[command(visible_alias = "p")]
    Play {
        /// Path to the WAV file to play
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Open configuration file in your preferred editor
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input and output devices
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   beatbars completions bash > beatbars.bash
    ///   beatbars completions zsh > _beatbars
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that print to the terminal and need no logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "beatbars", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    let overrides = Overrides::from(cli.tempo);
    match cli.command {
        None | Some(Commands::Visualize) => commands::handle_visualize(overrides).await?,
        Some(Commands::Play { file }) => commands::handle_play(&file, overrides).await?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_takes_overrides() {
        let cli = Cli::try_parse_from(["beatbars", "--bpm", "128", "--bars", "32"]).unwrap();
        assert!(cli.command.is_none());

        let overrides = Overrides::from(cli.tempo);
        assert_eq!(overrides.bpm, Some(128.0));
        assert_eq!(overrides.bar_count, Some(32));
        assert_eq!(overrides.delay_ms, None);
    }

    #[test]
    fn test_play_with_global_flags() {
        let cli =
            Cli::try_parse_from(["beatbars", "play", "song.wav", "--delay-ms", "0", "-o", "1"]).unwrap();
        match cli.command {
            Some(Commands::Play { file }) => assert_eq!(file, PathBuf::from("song.wav")),
            _ => panic!("expected play command"),
        }
        assert_eq!(cli.tempo.delay_ms, Some(0.0));
        assert_eq!(cli.tempo.output_device.as_deref(), Some("1"));
        assert_eq!(cli.tempo.device, None);
    }
}
