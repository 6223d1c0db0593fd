//! Amplitude measurement over a shared window of recent raw samples.
//!
//! The audio thread writes through an [`AnalysisTap`]; the frame loop reads
//! through the [`AnalysisWindow`] that created it. Both sides only hold the
//! lock for a copy.

use crate::timing::AmplitudeSource;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default number of raw samples the loudness estimate looks at.
pub const DEFAULT_WINDOW_SIZE: usize = 2048;

/// Mean of absolute sample values; a cheap loudness proxy.
///
/// Raw samples oscillate around zero, so a plain mean would cancel out.
pub fn mean_absolute(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.abs()).sum::<f32>() / samples.len() as f32
}

type SharedBuffer = Arc<Mutex<VecDeque<f32>>>;

fn lock(buffer: &SharedBuffer) -> MutexGuard<'_, VecDeque<f32>> {
    // A panicked writer leaves valid samples behind; keep using them
    buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read side of the analysis buffer.
#[derive(Debug, Clone)]
pub struct AnalysisWindow {
    buffer: SharedBuffer,
    size: usize,
}

/// Write side of the analysis buffer, handed to the audio callback.
#[derive(Debug, Clone)]
pub struct AnalysisTap {
    buffer: SharedBuffer,
    size: usize,
}

impl AnalysisWindow {
    /// Creates a zero-filled window of `size` samples (at least 1).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::from(vec![0.0; size]))),
            size,
        }
    }

    /// Returns a writer feeding this window.
    pub fn tap(&self) -> AnalysisTap {
        AnalysisTap {
            buffer: Arc::clone(&self.buffer),
            size: self.size,
        }
    }

    /// Copies out the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        lock(&self.buffer).iter().copied().collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Clears the window back to silence.
    pub fn clear(&self) {
        let mut buffer = lock(&self.buffer);
        buffer.iter_mut().for_each(|s| *s = 0.0);
    }
}

impl AmplitudeSource for AnalysisWindow {
    fn measure_amplitude(&mut self) -> f32 {
        let mut buffer = lock(&self.buffer);
        mean_absolute(buffer.make_contiguous())
    }
}

impl AnalysisTap {
    /// Appends mono samples, discarding the oldest to keep the size fixed.
    pub fn write(&self, samples: &[f32]) {
        let tail = &samples[samples.len().saturating_sub(self.size)..];
        let mut buffer = lock(&self.buffer);
        buffer.drain(..tail.len());
        buffer.extend(tail);
    }

    /// Downmixes interleaved frames to mono and appends them.
    pub fn write_interleaved(&self, data: &[f32], channels: usize) {
        if channels <= 1 {
            self.write(data);
            return;
        }
        let mono: Vec<f32> = data
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        self.write(&mono);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_absolute() {
        assert_eq!(mean_absolute(&[]), 0.0);
        assert_eq!(mean_absolute(&[0.5, -0.5, 0.25, -0.25]), 0.375);
        assert_eq!(mean_absolute(&[-1.0; 8]), 1.0);
    }

    #[test]
    fn test_starts_silent() {
        let mut window = AnalysisWindow::new(4);
        assert_eq!(window.snapshot(), vec![0.0; 4]);
        assert_eq!(window.measure_amplitude(), 0.0);
    }

    #[test]
    fn test_tap_keeps_most_recent_samples() {
        let window = AnalysisWindow::new(4);
        let tap = window.tap();

        tap.write(&[0.1, 0.2]);
        assert_eq!(window.snapshot(), vec![0.0, 0.0, 0.1, 0.2]);

        tap.write(&[0.3, 0.4, 0.5]);
        assert_eq!(window.snapshot(), vec![0.2, 0.3, 0.4, 0.5]);

        tap.write(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(window.snapshot(), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_measure_is_mean_of_absolute_values() {
        let mut window = AnalysisWindow::new(4);
        window.tap().write(&[0.5, -0.5, 0.25, -0.25]);
        assert_eq!(window.measure_amplitude(), 0.375);
        assert_eq!(window.measure_amplitude(), mean_absolute(&window.snapshot()));
    }

    #[test]
    fn test_measure_after_wraparound() {
        let mut window = AnalysisWindow::new(4);
        let tap = window.tap();
        tap.write(&[0.1, -0.2, 0.3]);
        tap.write(&[-0.4, 0.5]);
        tap.write(&[-0.6]);

        let before = window.snapshot();
        assert_eq!(before, vec![0.3, -0.4, 0.5, -0.6]);
        assert_eq!(window.measure_amplitude(), mean_absolute(&before));
        assert_eq!(window.snapshot(), before);
    }

    #[test]
    fn test_interleaved_downmix() {
        let window = AnalysisWindow::new(2);
        window.tap().write_interleaved(&[0.25, 0.75, -1.0, 0.0], 2);
        assert_eq!(window.snapshot(), vec![0.5, -0.5]);
    }

    #[test]
    fn test_clear() {
        let window = AnalysisWindow::new(3);
        window.tap().write(&[0.9, 0.9, 0.9]);
        window.clear();
        assert_eq!(window.snapshot(), vec![0.0; 3]);
    }

    #[test]
    fn test_write_from_audio_thread() {
        let mut window = AnalysisWindow::new(8);
        let tap = window.tap();
        std::thread::spawn(move || tap.write(&[-0.5; 8]))
            .join()
            .unwrap();
        assert_eq!(window.measure_amplitude(), 0.5);
    }
}
