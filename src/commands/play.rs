//! WAV playback with a beat-aligned display.

use super::{load_config, new_scheduler};
use crate::audio::{AnalysisWindow, AudioPlayer, WavClip};
use crate::config::Overrides;
use crate::scheduler::{run_frame_loop, LoopExit};
use crate::ui::{self, BeatbarsTui};
use std::path::Path;
use std::sync::Arc;

/// Plays `file` through the compensating delay while drawing its bars.
///
/// The display reads the undelayed signal, so with the default one-beat delay
/// each sample reaches the right-hand edge as it becomes audible.
///
/// # Errors
/// - If the configuration is invalid
/// - If the file cannot be decoded
/// - If the output device cannot be opened
/// - If the display fails
pub async fn handle_play(file: &Path, overrides: Overrides) -> anyhow::Result<()> {
    tracing::info!("=== beatbars player started: {} ===", file.display());

    let config = load_config(&overrides)?;
    let window = AnalysisWindow::new(config.audio.analysis_window);
    let (tempo, mut scheduler) = new_scheduler(&config, window.clone())?;

    let clip = match WavClip::open(file) {
        Ok(clip) => Arc::new(clip),
        Err(e) => {
            tracing::error!("Failed to load {}: {:#}", file.display(), e);
            ui::report("File Error", &format!("{e:#}"));
            return Err(e);
        }
    };
    tracing::info!(
        "Loaded {:.1}s, {} channels at {}Hz",
        clip.duration_secs(),
        clip.channels(),
        clip.sample_rate()
    );

    let mut player = match AudioPlayer::start(&config.audio.output_device, clip, tempo.delay_ms(), window.tap()) {
        Ok(player) => player,
        Err(e) => {
            tracing::error!("Failed to start playback: {}", e);
            ui::report(
                "Audio Error",
                &format!("{e}\n\nCheck the [audio] output_device in your config or run 'beatbars list-devices'."),
            );
            return Err(e);
        }
    };
    tracing::info!(
        "Playing at {}Hz with {:.1}ms compensating delay",
        player.sample_rate(),
        tempo.delay_ms()
    );

    let label = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());

    let mut tui = BeatbarsTui::new(config.display.style, config.display.max_magnitude)?;
    let exit = run_frame_loop(
        &mut tui,
        &mut scheduler,
        &player,
        config.display.frame_rate,
        &label,
    )
    .await;

    player.stop();
    tui.cleanup()?;

    let reason = match exit? {
        LoopExit::Quit => "stopped",
        LoopExit::Finished => "finished",
    };
    tracing::info!(
        "=== beatbars player {}, {} samples emitted ===",
        reason,
        scheduler.emitted()
    );
    Ok(())
}
