//! Tempo configuration and construction-time validation.
//!
//! All timing values are in milliseconds. A `TempoConfig` is immutable once
//! built; every invariant the sample clock relies on is checked here.

use thiserror::Error;

/// Milliseconds per minute, used to turn BPM into a beat interval.
const MS_PER_MINUTE: f64 = 60_000.0;

/// Rejected tempo parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TempoError {
    #[error("BPM must be a positive finite number, got {0}")]
    Bpm(f64),

    #[error("beat interval must be a positive finite number of milliseconds, got {0}")]
    BeatInterval(f64),

    #[error("bar count must be at least 1")]
    BarCount,

    #[error("sample interval must be positive, got {0}ms")]
    SampleInterval(f64),

    #[error("delay must be a non-negative finite number of milliseconds, got {0}")]
    Delay(f64),
}

/// Tempo-derived timing for one visualisation run.
///
/// `sample_interval_ms` is always `beat_interval_ms / bar_count`, so one full
/// sweep of the display spans exactly one beat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoConfig {
    beat_interval_ms: f64,
    bar_count: usize,
    sample_interval_ms: f64,
    delay_ms: f64,
}

impl TempoConfig {
    /// Builds a configuration from beats per minute.
    ///
    /// The compensating delay defaults to one beat interval, so a sample that
    /// enters the display reaches its far edge as the beat reaches the listener.
    ///
    /// # Errors
    /// - If `bpm` is zero, negative or not finite
    /// - If `bar_count` is zero
    pub fn from_bpm(bpm: f64, bar_count: usize) -> Result<Self, TempoError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(TempoError::Bpm(bpm));
        }
        let beat_interval_ms = MS_PER_MINUTE / bpm;
        Self::new(beat_interval_ms, bar_count, beat_interval_ms)
    }

    /// Builds a configuration from an explicit beat interval and delay.
    ///
    /// # Errors
    /// - If `beat_interval_ms` is not positive and finite
    /// - If `bar_count` is zero
    /// - If the derived sample interval underflows to zero
    /// - If `delay_ms` is negative or not finite
    pub fn new(beat_interval_ms: f64, bar_count: usize, delay_ms: f64) -> Result<Self, TempoError> {
        if !beat_interval_ms.is_finite() || beat_interval_ms <= 0.0 {
            return Err(TempoError::BeatInterval(beat_interval_ms));
        }
        if bar_count == 0 {
            return Err(TempoError::BarCount);
        }

        let sample_interval_ms = beat_interval_ms / bar_count as f64;
        if !sample_interval_ms.is_finite() || sample_interval_ms <= 0.0 {
            return Err(TempoError::SampleInterval(sample_interval_ms));
        }

        validate_delay(delay_ms)?;

        Ok(Self {
            beat_interval_ms,
            bar_count,
            sample_interval_ms,
            delay_ms,
        })
    }

    /// Returns a copy with a different compensating delay.
    ///
    /// # Errors
    /// - If `delay_ms` is negative or not finite
    pub fn with_delay_ms(self, delay_ms: f64) -> Result<Self, TempoError> {
        validate_delay(delay_ms)?;
        Ok(Self { delay_ms, ..self })
    }

    pub fn beat_interval_ms(&self) -> f64 {
        self.beat_interval_ms
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    /// The logical sample period.
    pub fn sample_interval_ms(&self) -> f64 {
        self.sample_interval_ms
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Tempo in beats per minute, recovered from the beat interval.
    pub fn bpm(&self) -> f64 {
        MS_PER_MINUTE / self.beat_interval_ms
    }
}

fn validate_delay(delay_ms: f64) -> Result<(), TempoError> {
    if !delay_ms.is_finite() || delay_ms < 0.0 {
        return Err(TempoError::Delay(delay_ms));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bpm_derives_intervals() {
        let tempo = TempoConfig::from_bpm(120.0, 10).unwrap();
        assert_eq!(tempo.beat_interval_ms(), 500.0);
        assert_eq!(tempo.sample_interval_ms(), 50.0);
        assert_eq!(tempo.delay_ms(), 500.0);
        assert_eq!(tempo.bar_count(), 10);
        assert_eq!(tempo.bpm(), 120.0);
    }

    #[test]
    fn test_zero_bpm_rejected() {
        assert_eq!(TempoConfig::from_bpm(0.0, 16), Err(TempoError::Bpm(0.0)));
        assert!(TempoConfig::from_bpm(-90.0, 16).is_err());
        assert!(TempoConfig::from_bpm(f64::NAN, 16).is_err());
        assert!(TempoConfig::from_bpm(f64::INFINITY, 16).is_err());
    }

    #[test]
    fn test_zero_bar_count_rejected() {
        assert_eq!(TempoConfig::from_bpm(120.0, 0), Err(TempoError::BarCount));
        assert_eq!(TempoConfig::new(500.0, 0, 0.0), Err(TempoError::BarCount));
    }

    #[test]
    fn test_negative_delay_rejected() {
        assert_eq!(TempoConfig::new(500.0, 4, -1.0), Err(TempoError::Delay(-1.0)));

        let tempo = TempoConfig::from_bpm(120.0, 4).unwrap();
        assert!(tempo.with_delay_ms(-0.5).is_err());
        assert_eq!(tempo.with_delay_ms(0.0).unwrap().delay_ms(), 0.0);
    }

    #[test]
    fn test_underflowing_sample_interval_rejected() {
        let result = TempoConfig::new(f64::MIN_POSITIVE, usize::MAX, 0.0);
        assert!(matches!(result, Err(TempoError::SampleInterval(_))));
    }
}
