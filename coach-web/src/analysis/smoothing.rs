//! Moving-average angle smoother
//!
//! Averages the last few raw angles so single-frame jitter never reaches
//! the rep detector.

use super::ring::RingBuffer;

/// Number of raw angles averaged
pub const SMOOTHING_WINDOW: usize = 5;

#[derive(Clone, Debug, Default)]
pub struct AngleSmoother {
    window: RingBuffer<SMOOTHING_WINDOW>,
}

impl AngleSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a raw angle and return the mean of the window
    pub fn apply(&mut self, angle: f32) -> f32 {
        self.window.push(angle);
        self.window.mean().unwrap_or(angle)
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}
