//! Application command handlers for beatbars.
//!
//! # Commands
//! - `visualize`: Live bar display from an input device (default)
//! - `play`: WAV playback with a beat-aligned bar display
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod play;
pub mod visualize;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use play::handle_play;
pub use visualize::handle_visualize;

use crate::audio::AnalysisWindow;
use crate::config::{BeatbarsConfig, Overrides};
use crate::display::{BarHeights, SlidingWindowDisplay};
use crate::scheduler::FrameScheduler;
use crate::timing::{SampleTimer, TempoConfig};
use crate::ui;

/// Loads the config file and applies command-line overrides.
///
/// Shows an error screen before returning if the file is unreadable.
fn load_config(overrides: &Overrides) -> anyhow::Result<BeatbarsConfig> {
    let mut config = match BeatbarsConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err:#}");
            ui::report(
                "Configuration Error",
                &format!("{err:#}\n\nPlease check your ~/.config/beatbars/beatbars.toml file and try again."),
            );
            return Err(err);
        }
    };
    config.apply_overrides(overrides);

    tracing::info!(
        "Configuration loaded: bpm={}, bars={}, device={}, frame_rate={}, style={}",
        config.tempo.bpm,
        config.tempo.bar_count,
        config.audio.device,
        config.display.frame_rate,
        config.display.style
    );
    Ok(config)
}

/// Validates tempo and display settings and wires up the sample timer.
fn new_scheduler(
    config: &BeatbarsConfig,
    window: AnalysisWindow,
) -> anyhow::Result<(
    TempoConfig,
    FrameScheduler<AnalysisWindow, SlidingWindowDisplay<BarHeights>>,
)> {
    let validated = config.tempo().map_err(anyhow::Error::from).and_then(|tempo| {
        BarHeights::new(tempo.bar_count(), config.display.max_magnitude)
            .map(|bars| (tempo, bars))
            .map_err(anyhow::Error::from)
    });
    let (tempo, bars) = match validated {
        Ok(parts) => parts,
        Err(err) => {
            tracing::error!("Invalid configuration: {err}");
            ui::report("Configuration Error", &err.to_string());
            return Err(err);
        }
    };

    tracing::debug!(
        "Tempo: beat {:.2}ms, sample {:.2}ms, delay {:.2}ms",
        tempo.beat_interval_ms(),
        tempo.sample_interval_ms(),
        tempo.delay_ms()
    );

    let display = SlidingWindowDisplay::new(tempo.bar_count(), bars);
    let timer = SampleTimer::new(tempo, window, display);
    Ok((tempo, FrameScheduler::new(timer)))
}
