//! Bar height renderer.

use crate::timing::MagnitudeRenderer;
use thiserror::Error;

/// Rejected display parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DisplayError {
    #[error("max magnitude must be a positive finite number, got {0}")]
    MaxMagnitude(f32),
}

/// Maps normalized samples linearly onto bar heights in `[0, max_magnitude]`.
#[derive(Debug, Clone)]
pub struct BarHeights {
    heights: Vec<f32>,
    max_magnitude: f32,
}

impl BarHeights {
    /// # Errors
    /// - If `max_magnitude` is not positive and finite
    pub fn new(bar_count: usize, max_magnitude: f32) -> Result<Self, DisplayError> {
        if !max_magnitude.is_finite() || max_magnitude <= 0.0 {
            return Err(DisplayError::MaxMagnitude(max_magnitude));
        }
        Ok(Self {
            heights: vec![0.0; bar_count],
            max_magnitude,
        })
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn max_magnitude(&self) -> f32 {
        self.max_magnitude
    }

    /// Heights rounded to whole units for ratatui's integer-valued widgets.
    pub fn as_u64(&self) -> Vec<u64> {
        // `as` saturates: negatives become 0, NaN becomes 0
        self.heights.iter().map(|&h| h.round() as u64).collect()
    }
}

impl MagnitudeRenderer for BarHeights {
    fn set_magnitude(&mut self, position: usize, applied: f32) {
        match self.heights.get_mut(position) {
            Some(height) => *height = applied * self.max_magnitude,
            None => tracing::warn!(
                "Bar position {} out of range (0-{})",
                position,
                self.heights.len().saturating_sub(1)
            ),
        }
    }
}
