//! Fixed compensating delay for interleaved audio.

use std::collections::VecDeque;

/// Delays interleaved audio by a whole number of frames.
///
/// The line is pre-filled with silence, so the first `delay_frames` output
/// frames are zero and every input frame comes out exactly that many frames
/// later.
#[derive(Debug, Clone)]
pub struct DelayLine {
    ring: VecDeque<f32>,
    channels: usize,
    delay_frames: usize,
}

impl DelayLine {
    pub fn new(delay_frames: usize, channels: usize) -> Self {
        let channels = channels.max(1);
        Self {
            ring: VecDeque::from(vec![0.0; delay_frames * channels]),
            channels,
            delay_frames,
        }
    }

    /// Builds a delay of `delay_ms` at `sample_rate`, rounded to the nearest frame.
    pub fn from_millis(delay_ms: f64, sample_rate: u32, channels: usize) -> Self {
        let frames = (delay_ms.max(0.0) * sample_rate as f64 / 1000.0).round() as usize;
        Self::new(frames, channels)
    }

    /// Pushes `input` through the line, writing the delayed signal to `output`.
    ///
    /// Both slices must be the same length and hold whole frames.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        if self.delay_frames == 0 {
            output.copy_from_slice(input);
            return;
        }
        for (out, &sample) in output.iter_mut().zip(input) {
            self.ring.push_back(sample);
            *out = self.ring.pop_front().unwrap_or_default();
        }
    }

    pub fn delay_frames(&self) -> usize {
        self.delay_frames
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
