//! Configuration management for beatbars.
//!
//! Configuration is a TOML file in the user's config directory. Tempo values
//! are validated into a [`TempoConfig`](crate::timing::TempoConfig) before
//! any audio is opened.

pub mod file;

pub use file::{get_config_path, BeatbarsConfig, DisplayStyle, Overrides};
