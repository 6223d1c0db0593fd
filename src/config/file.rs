//! Configuration file management for beatbars.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use crate::audio::analysis::DEFAULT_WINDOW_SIZE;
use crate::timing::{TempoConfig, TempoError};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the sample window is drawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    /// One vertical bar per sample
    #[default]
    Bars,
    /// Continuous sparkline across the terminal
    Sparkline,
}

impl std::fmt::Display for DisplayStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bars => write!(f, "bars"),
            Self::Sparkline => write!(f, "sparkline"),
        }
    }
}

/// Musical timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TempoSection {
    /// Tempo in beats per minute
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Number of bars on screen; one full sweep spans one beat
    #[serde(default = "default_bar_count")]
    pub bar_count: usize,
    /// Playback delay in milliseconds. Defaults to one beat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<f64>,
}

/// Visual output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplaySection {
    /// Bar height drawn for a sample of 1.0
    #[serde(default = "default_max_magnitude")]
    pub max_magnitude: f32,
    /// Redraws per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// "bars" or "sparkline"
    #[serde(default)]
    pub style: DisplayStyle,
}

/// Audio devices and analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSection {
    /// Input device for `visualize`. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from the input list of `beatbars list-devices`
    /// - device name from `beatbars list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Output device for `play`, chosen from the output list the same way
    #[serde(default = "default_output_device")]
    pub output_device: String,
    /// Raw samples averaged per loudness reading
    #[serde(default = "default_analysis_window")]
    pub analysis_window: usize,
}

fn default_bpm() -> f64 {
    120.0
}

fn default_bar_count() -> usize {
    16
}

fn default_max_magnitude() -> f32 {
    100.0
}

fn default_frame_rate() -> u32 {
    60
}

fn default_device() -> String {
    "default".to_string()
}

fn default_output_device() -> String {
    "default".to_string()
}

fn default_analysis_window() -> usize {
    DEFAULT_WINDOW_SIZE
}

impl Default for TempoSection {
    fn default() -> Self {
        Self {
            bpm: default_bpm(),
            bar_count: default_bar_count(),
            delay_ms: None,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            max_magnitude: default_max_magnitude(),
            frame_rate: default_frame_rate(),
            style: DisplayStyle::default(),
        }
    }
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            device: default_device(),
            output_device: default_output_device(),
            analysis_window: default_analysis_window(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BeatbarsConfig {
    #[serde(default)]
    pub tempo: TempoSection,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub audio: AudioSection,
}

impl BeatbarsConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// Writes the defaults first if no config file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::info!("No config found, writing defaults to {}", config_path.display());
            Self::default().save_to(&config_path)?;
        }
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: BeatbarsConfig = toml::from_str(&config_content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Writes configuration to an explicit path.
    ///
    /// # Errors
    /// - If serialization fails
    /// - If the file cannot be written
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    /// Builds the validated tempo configuration.
    ///
    /// # Errors
    /// - If BPM, bar count or delay are out of range
    pub fn tempo(&self) -> Result<TempoConfig, TempoError> {
        let tempo = TempoConfig::from_bpm(self.tempo.bpm, self.tempo.bar_count)?;
        match self.tempo.delay_ms {
            Some(delay_ms) => tempo.with_delay_ms(delay_ms),
            None => Ok(tempo),
        }
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(bpm) = overrides.bpm {
            self.tempo.bpm = bpm;
        }
        if let Some(bar_count) = overrides.bar_count {
            self.tempo.bar_count = bar_count;
        }
        if let Some(delay_ms) = overrides.delay_ms {
            self.tempo.delay_ms = Some(delay_ms);
        }
        if let Some(device) = &overrides.device {
            self.audio.device = device.clone();
        }
        if let Some(output_device) = &overrides.output_device {
            self.audio.output_device = output_device.clone();
        }
    }
}

/// Per-run values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bpm: Option<f64>,
    pub bar_count: Option<usize>,
    pub delay_ms: Option<f64>,
    pub device: Option<String>,
    pub output_device: Option<String>,
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("beatbars");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("beatbars.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: BeatbarsConfig = toml::from_str("").unwrap();
        assert_eq!(config, BeatbarsConfig::default());
        assert_eq!(config.tempo.bpm, 120.0);
        assert_eq!(config.tempo.bar_count, 16);
        assert_eq!(config.display.style, DisplayStyle::Bars);
        assert_eq!(config.audio.analysis_window, 2048);
        assert_eq!(config.audio.output_device, "default");
    }

    #[test]
    fn test_partial_sections() {
        let config: BeatbarsConfig = toml::from_str(
            r#"
            [tempo]
            bpm = 90.0
            delay_ms = 250.0

            [display]
            style = "sparkline"

            [audio]
            device = "USB Mic"
            "#,
        )
        .unwrap();

        assert_eq!(config.tempo.bpm, 90.0);
        assert_eq!(config.tempo.bar_count, 16);
        assert_eq!(config.tempo.delay_ms, Some(250.0));
        assert_eq!(config.display.style, DisplayStyle::Sparkline);
        assert_eq!(config.display.frame_rate, 60);
        assert_eq!(config.audio.device, "USB Mic");
        assert_eq!(config.audio.output_device, "default");
    }

    #[test]
    fn test_tempo_from_config() {
        let mut config = BeatbarsConfig::default();
        config.tempo.bpm = 150.0;
        config.tempo.bar_count = 8;

        let tempo = config.tempo().unwrap();
        assert_eq!(tempo.beat_interval_ms(), 400.0);
        assert_eq!(tempo.sample_interval_ms(), 50.0);
        assert_eq!(tempo.delay_ms(), 400.0);

        config.tempo.delay_ms = Some(0.0);
        assert_eq!(config.tempo().unwrap().delay_ms(), 0.0);
    }

    #[test]
    fn test_invalid_tempo_rejected() {
        let mut config = BeatbarsConfig::default();
        config.tempo.bar_count = 0;
        assert_eq!(config.tempo(), Err(TempoError::BarCount));

        config.tempo.bar_count = 4;
        config.tempo.bpm = 0.0;
        assert_eq!(config.tempo(), Err(TempoError::Bpm(0.0)));
    }

    #[test]
    fn test_overrides() {
        let mut config = BeatbarsConfig::default();
        config.apply_overrides(&Overrides {
            bpm: Some(174.0),
            bar_count: None,
            delay_ms: Some(12.5),
            device: Some("2".to_string()),
            output_device: None,
        });
        assert_eq!(config.tempo.bpm, 174.0);
        assert_eq!(config.tempo.bar_count, 16);
        assert_eq!(config.tempo.delay_ms, Some(12.5));
        assert_eq!(config.audio.device, "2");
        assert_eq!(config.audio.output_device, "default");

        config.apply_overrides(&Overrides {
            output_device: Some("Speakers".to_string()),
            ..Overrides::default()
        });
        assert_eq!(config.audio.device, "2");
        assert_eq!(config.audio.output_device, "Speakers");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beatbars.toml");

        let mut config = BeatbarsConfig::default();
        config.tempo.bpm = 98.5;
        config.display.max_magnitude = 40.0;
        config.save_to(&path).unwrap();

        assert_eq!(BeatbarsConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beatbars.toml");
        fs::write(&path, "[tempo]\nbpm = \"fast\"\n").unwrap();
        assert!(BeatbarsConfig::load_from(&path).is_err());
    }
}
