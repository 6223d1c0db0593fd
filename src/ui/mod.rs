//! Terminal screens.

pub mod error;
pub mod visualizer;

pub use error::{report, ErrorScreen};
pub use visualizer::{BeatbarsTui, FrameStats, UserCommand};
