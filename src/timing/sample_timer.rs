//! Per-frame sample emission.

use super::{AmplitudeSource, SampleClock, SampleSink, TempoConfig};

/// Turns scheduler ticks into amplitude samples at the tempo-derived rate.
///
/// Each tick reads at most one amplitude. When several sample periods have
/// passed since the last tick, that single reading is pushed once per period:
/// only one snapshot of the analysis window exists per frame, so it stands in
/// for all of them.
#[derive(Debug)]
pub struct SampleTimer<S, K> {
    tempo: TempoConfig,
    clock: SampleClock,
    source: S,
    sink: K,
}

impl<S: AmplitudeSource, K: SampleSink> SampleTimer<S, K> {
    pub fn new(tempo: TempoConfig, source: S, sink: K) -> Self {
        Self {
            clock: SampleClock::new(tempo.sample_interval_ms()),
            tempo,
            source,
            sink,
        }
    }

    /// Handles one scheduler callback at monotonic time `now_ms`.
    ///
    /// Returns the number of samples pushed into the sink. The first tick
    /// after construction or [`reset`](Self::reset) always returns 0.
    pub fn on_tick(&mut self, now_ms: f64) -> usize {
        let due = self.clock.advance(now_ms);
        if due == 0 {
            return 0;
        }

        let amplitude = self.source.measure_amplitude();
        for _ in 0..due {
            self.sink.push(amplitude);
        }

        if due > 1 {
            tracing::trace!(due, amplitude, "Sample burst at {:.1}ms", now_ms);
        }
        due
    }

    /// Drops the timing baseline, e.g. after playback was paused.
    pub fn reset(&mut self) {
        self.clock.reset();
    }

    pub fn tempo(&self) -> &TempoConfig {
        &self.tempo
    }

    pub fn last_emission_ms(&self) -> Option<f64> {
        self.clock.last_emission_ms()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Consumes the timer, handing back its collaborators.
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{BarHeights, SlidingWindowDisplay};

    /// Returns the next scripted value on each call and counts reads.
    struct ScriptedSource {
        values: Vec<f32>,
        reads: usize,
    }

    impl ScriptedSource {
        fn new(values: &[f32]) -> Self {
            Self {
                values: values.to_vec(),
                reads: 0,
            }
        }
    }

    impl AmplitudeSource for ScriptedSource {
        fn measure_amplitude(&mut self) -> f32 {
            let value = self.values[self.reads % self.values.len()];
            self.reads += 1;
            value
        }
    }

    fn timer(interval_ms: f64, values: &[f32]) -> SampleTimer<ScriptedSource, Vec<f32>> {
        let tempo = TempoConfig::new(interval_ms, 1, 0.0).unwrap();
        SampleTimer::new(tempo, ScriptedSource::new(values), Vec::new())
    }

    #[test]
    fn test_first_tick_emits_nothing() {
        for t in [0.0, 1.0, 1_000_000.0] {
            let mut timer = timer(50.0, &[0.5]);
            assert_eq!(timer.on_tick(t), 0);
            assert!(timer.sink().is_empty());
            assert_eq!(timer.source().reads, 0);
        }
    }

    #[test]
    fn test_reference_scenario() {
        let mut timer = timer(50.0, &[0.1, 0.2, 0.3]);

        assert_eq!(timer.on_tick(1000.0), 0);
        assert_eq!(timer.last_emission_ms(), Some(1000.0));

        assert_eq!(timer.on_tick(1070.0), 1);
        assert_eq!(timer.last_emission_ms(), Some(1050.0));
        assert_eq!(timer.sink(), &vec![0.1]);

        assert_eq!(timer.on_tick(1090.0), 0);
        assert_eq!(timer.last_emission_ms(), Some(1050.0));
        assert_eq!(timer.source().reads, 1);

        assert_eq!(timer.on_tick(1210.0), 3);
        assert_eq!(timer.last_emission_ms(), Some(1200.0));
        assert_eq!(timer.sink(), &vec![0.1, 0.2, 0.2, 0.2]);
        assert_eq!(timer.source().reads, 2);
    }

    #[test]
    fn test_silent_tick_does_not_measure() {
        let mut timer = timer(100.0, &[0.9]);
        timer.on_tick(0.0);
        for t in [16.0, 33.0, 50.0, 99.0] {
            assert_eq!(timer.on_tick(t), 0);
        }
        assert_eq!(timer.source().reads, 0);
        assert!(timer.sink().is_empty());
    }

    #[test]
    fn test_burst_shifts_window_once_per_sample() {
        let tempo = TempoConfig::new(40.0, 4, 0.0).unwrap();
        let display = SlidingWindowDisplay::new(4, BarHeights::new(4, 10.0).unwrap());
        let mut timer = SampleTimer::new(tempo, ScriptedSource::new(&[0.25, 0.75]), display);

        timer.on_tick(0.0);
        assert_eq!(timer.on_tick(10.0), 1);
        assert_eq!(timer.on_tick(32.0), 2);

        assert_eq!(timer.sink().samples(), &[0.0, 0.25, 0.75, 0.75]);
        assert_eq!(timer.sink().renderer().heights(), &[0.0, 2.5, 7.5, 7.5]);
        assert_eq!(timer.source().reads, 2);
    }

    #[test]
    fn test_emission_count_matches_elapsed_periods() {
        let interval = 500.0 / 16.0;
        let mut timer = timer(interval, &[0.4]);

        let start = 3.0;
        timer.on_tick(start);
        let mut now = start;
        let mut emitted = 0;
        // Irregular frame pacing around 60 Hz with occasional stalls
        for frame in 0..600 {
            now += match frame % 9 {
                0 => 16.6,
                1 => 17.1,
                2 => 0.0,
                3 => 48.9,
                4 => 16.7,
                5 => 2.4,
                6 => 120.0,
                _ => 16.5,
            };
            emitted += timer.on_tick(now);
        }

        assert_eq!(emitted, ((now - start) / interval).floor() as usize);
        assert_eq!(timer.sink().len(), emitted);
    }

    #[test]
    fn test_reset_skips_paused_interval() {
        let mut timer = timer(50.0, &[0.3]);
        timer.on_tick(0.0);
        assert_eq!(timer.on_tick(100.0), 2);

        timer.reset();
        assert_eq!(timer.on_tick(60_000.0), 0);
        assert_eq!(timer.on_tick(60_050.0), 1);
        assert_eq!(timer.sink().len(), 3);
    }

    #[test]
    fn test_borrowed_collaborators() {
        let mut source = ScriptedSource::new(&[0.6]);
        let mut sink: Vec<f32> = Vec::new();
        {
            let tempo = TempoConfig::new(10.0, 1, 0.0).unwrap();
            let mut timer = SampleTimer::new(tempo, &mut source, &mut sink);
            timer.on_tick(0.0);
            timer.on_tick(25.0);
        }
        assert_eq!(sink, vec![0.6, 0.6]);
        assert_eq!(source.reads, 1);
    }
}
