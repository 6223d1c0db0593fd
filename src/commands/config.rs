//! Configuration file editor command.

use crate::config::{get_config_path, BeatbarsConfig};
use std::process::Command;

/// Opens the beatbars configuration file in the user's preferred editor.
///
/// Writes the default configuration first if none exists, and checks the
/// edited file still parses and validates afterwards.
///
/// # Errors
/// - If no editor can be found or executed
/// - If the editor exits with an error
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    if !config_path.exists() {
        BeatbarsConfig::default().save_to(&config_path)?;
    }

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    match BeatbarsConfig::load_from(&config_path).map(|config| config.tempo()) {
        Ok(Ok(tempo)) => {
            println!(
                "Config OK: {:.1} BPM, {} bars, {:.2}ms per sample",
                tempo.bpm(),
                tempo.bar_count(),
                tempo.sample_interval_ms()
            );
        }
        Ok(Err(e)) => eprintln!("Warning: invalid tempo settings: {e}"),
        Err(e) => eprintln!("Warning: {e:#}"),
    }

    tracing::info!("Config file edited");
    Ok(())
}

/// Finds the best available editor: $EDITOR, then nano, then vi.
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| is_editor_available(editor))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
