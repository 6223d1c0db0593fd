//! Live visualisation of an input device.

use super::{load_config, new_scheduler};
use crate::audio::{AnalysisWindow, AudioInput};
use crate::config::Overrides;
use crate::scheduler::run_frame_loop;
use crate::ui::{self, BeatbarsTui};

/// Captures from the configured input device and drives the bar display.
///
/// # Errors
/// - If the configuration is invalid
/// - If the input device cannot be opened
/// - If the display fails
pub async fn handle_visualize(overrides: Overrides) -> anyhow::Result<()> {
    tracing::info!("=== beatbars visualizer started ===");

    let config = load_config(&overrides)?;
    let window = AnalysisWindow::new(config.audio.analysis_window);
    let (tempo, mut scheduler) = new_scheduler(&config, window.clone())?;

    let mut input = AudioInput::new(config.audio.device.clone(), window.tap());
    if let Err(e) = input.start() {
        tracing::error!("Failed to start capture: {}", e);
        ui::report(
            "Audio Error",
            &format!("{e}\n\nCheck the [audio] device in your config or run 'beatbars list-devices'."),
        );
        return Err(e);
    }
    tracing::info!(
        "Capturing at {}Hz, {} bars per {:.1}ms beat",
        input.sample_rate(),
        tempo.bar_count(),
        tempo.beat_interval_ms()
    );

    let mut tui = BeatbarsTui::new(config.display.style, config.display.max_magnitude)?;
    let label = format!("input: {}", config.audio.device);
    let exit = run_frame_loop(
        &mut tui,
        &mut scheduler,
        &input,
        config.display.frame_rate,
        &label,
    )
    .await;

    input.stop();
    tui.cleanup()?;

    exit?;
    tracing::info!(
        "=== beatbars visualizer exited, {} samples emitted ===",
        scheduler.emitted()
    );
    Ok(())
}
