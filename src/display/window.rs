//! Fixed-size sliding window of the most recent samples.

use crate::timing::{MagnitudeRenderer, SampleSink};

/// Holds the last `bar_count` samples, oldest first, and mirrors every push
/// onto a renderer.
///
/// The buffer is allocated once and never resized.
#[derive(Debug)]
pub struct SlidingWindowDisplay<R> {
    samples: Box<[f32]>,
    renderer: R,
}

impl<R: MagnitudeRenderer> SlidingWindowDisplay<R> {
    /// Creates a zero-filled window.
    ///
    /// `bar_count` comes from a validated tempo configuration and is at least 1.
    pub fn new(bar_count: usize, renderer: R) -> Self {
        debug_assert!(bar_count > 0);
        Self {
            samples: vec![0.0; bar_count].into_boxed_slice(),
            renderer,
        }
    }

    /// Evicts the oldest sample, appends `value`, then re-renders every bar.
    ///
    /// Values are passed through as-is; keeping them inside `[0, 1]` is the
    /// producer's job.
    pub fn push(&mut self, value: f32) {
        let Some(last) = self.samples.len().checked_sub(1) else {
            return;
        };
        self.samples.copy_within(1.., 0);
        self.samples[last] = value;

        for (position, &sample) in self.samples.iter().enumerate() {
            self.renderer.set_magnitude(position, sample);
        }
    }

    /// Current samples, oldest at index 0.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// The most recently pushed sample.
    pub fn newest(&self) -> f32 {
        self.samples.last().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: MagnitudeRenderer> SampleSink for SlidingWindowDisplay<R> {
    fn push(&mut self, value: f32) {
        SlidingWindowDisplay::push(self, value)
    }
}
