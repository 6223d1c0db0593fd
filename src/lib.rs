//! beatbars: tempo-synchronised audio bars.
//!
//! The core is the [`timing`] engine: it converts an irregular per-frame
//! callback cadence into exactly the right number of amplitude samples for a
//! tempo-derived sample period, and pushes them into a fixed-size
//! [`display::SlidingWindowDisplay`]. Everything else (audio capture and
//! playback, the terminal UI, configuration) plugs into its collaborator traits.

pub mod app;
pub mod audio;
pub mod commands;
pub mod config;
pub mod display;
pub mod logging;
pub mod scheduler;
pub mod timing;
pub mod ui;
