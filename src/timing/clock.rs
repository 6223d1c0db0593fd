//! Drift-free conversion of irregular ticks into whole sample periods.

/// Tracks how much simulated time has been accounted for in whole samples.
///
/// The baseline only ever moves forward by exact multiples of the sample
/// interval. The sub-period remainder of each tick is carried into the next,
/// so the long-run emission rate is exactly `1 / sample_interval_ms` no matter
/// how irregular the ticks are.
#[derive(Debug, Clone)]
pub struct SampleClock {
    sample_interval_ms: f64,
    /// `None` until the first tick establishes a baseline.
    last_emission_ms: Option<f64>,
}

impl SampleClock {
    /// Creates an uninitialised clock.
    ///
    /// `sample_interval_ms` must be positive; take it from a validated
    /// [`TempoConfig`](super::TempoConfig).
    pub fn new(sample_interval_ms: f64) -> Self {
        debug_assert!(sample_interval_ms > 0.0);
        Self {
            sample_interval_ms,
            last_emission_ms: None,
        }
    }

    /// Advances the clock to `now_ms` and returns how many samples are due.
    ///
    /// The first call only records the baseline and returns 0. A timestamp
    /// earlier than the baseline counts as "nothing due yet" and leaves the
    /// clock untouched.
    pub fn advance(&mut self, now_ms: f64) -> usize {
        let Some(last) = self.last_emission_ms else {
            self.last_emission_ms = Some(now_ms);
            return 0;
        };

        let periods = ((now_ms - last) / self.sample_interval_ms).floor();
        if periods.is_nan() || periods < 1.0 {
            return 0;
        }

        let due = periods as usize;
        self.last_emission_ms = Some(last + due as f64 * self.sample_interval_ms);
        due
    }

    /// Forgets the baseline; the next tick starts a fresh one.
    pub fn reset(&mut self) {
        self.last_emission_ms = None;
    }

    pub fn last_emission_ms(&self) -> Option<f64> {
        self.last_emission_ms
    }

    pub fn sample_interval_ms(&self) -> f64 {
        self.sample_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_sets_baseline_only() {
        let mut clock = SampleClock::new(50.0);
        assert_eq!(clock.advance(98_765.4), 0);
        assert_eq!(clock.last_emission_ms(), Some(98_765.4));
    }

    #[test]
    fn test_remainder_is_carried_forward() {
        let mut clock = SampleClock::new(50.0);
        assert_eq!(clock.advance(1000.0), 0);

        assert_eq!(clock.advance(1070.0), 1);
        assert_eq!(clock.last_emission_ms(), Some(1050.0));

        assert_eq!(clock.advance(1090.0), 0);
        assert_eq!(clock.last_emission_ms(), Some(1050.0));

        assert_eq!(clock.advance(1210.0), 3);
        assert_eq!(clock.last_emission_ms(), Some(1200.0));
    }

    #[test]
    fn test_short_tick_leaves_state_untouched() {
        let mut clock = SampleClock::new(50.0);
        clock.advance(0.0);
        for t in [10.0, 20.0, 49.9] {
            assert_eq!(clock.advance(t), 0);
            assert_eq!(clock.last_emission_ms(), Some(0.0));
        }
    }

    #[test]
    fn test_backwards_time_emits_nothing() {
        let mut clock = SampleClock::new(50.0);
        clock.advance(1000.0);
        assert_eq!(clock.advance(900.0), 0);
        assert_eq!(clock.last_emission_ms(), Some(1000.0));
        assert_eq!(clock.advance(1100.0), 2);
    }

    #[test]
    fn test_nan_timestamp_emits_nothing() {
        let mut clock = SampleClock::new(50.0);
        clock.advance(1000.0);
        assert_eq!(clock.advance(f64::NAN), 0);
        assert_eq!(clock.last_emission_ms(), Some(1000.0));
        assert_eq!(clock.advance(1120.0), 2);
        assert_eq!(clock.last_emission_ms(), Some(1100.0));
    }

    #[test]
    fn test_total_is_independent_of_chunking() {
        let interval = 1000.0 / 60.0 / 7.0;
        let start = 12_345.0;
        let end = start + 9_876.5;

        let mut single = SampleClock::new(interval);
        single.advance(start);
        let expected = single.advance(end);
        assert_eq!(expected, ((end - start) / interval).floor() as usize);

        // Jittery partition with duplicate timestamps and uneven gaps
        let gaps = [16.7, 0.0, 3.1, 33.4, 16.6, 0.2, 50.0, 8.3];
        let mut chunked = SampleClock::new(interval);
        chunked.advance(start);
        let mut now = start;
        let mut total = 0;
        let mut i = 0;
        while now < end {
            now = (now + gaps[i % gaps.len()]).min(end);
            total += chunked.advance(now);
            i += 1;
        }
        assert_eq!(total, expected);
    }

    #[test]
    fn test_reset_restarts_baseline() {
        let mut clock = SampleClock::new(50.0);
        clock.advance(0.0);
        assert_eq!(clock.advance(120.0), 2);

        clock.reset();
        assert_eq!(clock.last_emission_ms(), None);
        assert_eq!(clock.advance(10_000.0), 0);
        assert_eq!(clock.advance(10_050.0), 1);
    }
}
