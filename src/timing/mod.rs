//! Sample-timing engine.
//!
//! Reconciles the irregular cadence of a per-frame scheduler with the fixed
//! sample period derived from musical tempo. The scheduler calls
//! [`SampleTimer::on_tick`] once per frame; the timer works out how many whole
//! sample periods have passed and pushes that many amplitude readings into a
//! [`SampleSink`].

pub mod clock;
pub mod sample_timer;
pub mod tempo;

pub use clock::SampleClock;
pub use sample_timer::SampleTimer;
pub use tempo::{TempoConfig, TempoError};

/// Source of instantaneous loudness readings.
pub trait AmplitudeSource {
    /// Returns a normalized amplitude for the audio since roughly the last call.
    fn measure_amplitude(&mut self) -> f32;
}

/// Consumer of emitted amplitude samples.
pub trait SampleSink {
    fn push(&mut self, value: f32);
}

/// Per-position visual magnitude output.
pub trait MagnitudeRenderer {
    /// Sets the magnitude drawn at `position` to `applied`.
    fn set_magnitude(&mut self, position: usize, applied: f32);
}

impl<T: AmplitudeSource + ?Sized> AmplitudeSource for &mut T {
    fn measure_amplitude(&mut self) -> f32 {
        (**self).measure_amplitude()
    }
}

impl<T: SampleSink + ?Sized> SampleSink for &mut T {
    fn push(&mut self, value: f32) {
        (**self).push(value)
    }
}

impl<T: MagnitudeRenderer + ?Sized> MagnitudeRenderer for &mut T {
    fn set_magnitude(&mut self, position: usize, applied: f32) {
        (**self).set_magnitude(position, applied)
    }
}

impl SampleSink for Vec<f32> {
    fn push(&mut self, value: f32) {
        Vec::push(self, value)
    }
}
