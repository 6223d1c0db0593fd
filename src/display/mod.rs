//! Sample window and bar rendering.
//!
//! New renderers can be added by implementing
//! [`MagnitudeRenderer`](crate::timing::MagnitudeRenderer).

pub mod bars;
pub mod window;

pub use bars::{BarHeights, DisplayError};
pub use window::SlidingWindowDisplay;
