//! Per-side visibility history
//!
//! Rolling average of the last few visibility scores for each candidate
//! triplet. Damps single-frame confidence spikes when choosing a side.

use std::collections::HashMap;

use super::ring::RingBuffer;
use crate::config::JointTriplet;

/// Samples kept per candidate side
pub const VISIBILITY_HISTORY_FRAMES: usize = 6;

#[derive(Clone, Debug, Default)]
pub struct VisibilityHistory {
    by_side: HashMap<JointTriplet, RingBuffer<VISIBILITY_HISTORY_FRAMES>>,
}

impl VisibilityHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score and return the side's rolling average, including it
    pub fn record(&mut self, side: JointTriplet, score: f32) -> f32 {
        let buffer = self.by_side.entry(side).or_default();
        buffer.push(score);
        buffer.mean().unwrap_or(score)
    }

    pub fn average(&self, side: JointTriplet) -> Option<f32> {
        self.by_side.get(&side).and_then(|buffer| buffer.mean())
    }

    pub fn clear(&mut self) {
        self.by_side.clear();
    }
}
