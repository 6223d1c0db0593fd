//! Audio plumbing around the timing engine.
//!
//! Captures or plays audio, keeps a window of the most recent raw samples for
//! loudness measurement, and applies the compensating playback delay.

pub mod analysis;
pub mod delay;
pub mod device;
pub mod input;
pub mod playback;

pub use analysis::{mean_absolute, AnalysisTap, AnalysisWindow};
pub use delay::DelayLine;
pub use input::AudioInput;
pub use playback::{AudioPlayer, WavClip};
