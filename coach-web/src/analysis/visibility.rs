//! Visibility Gate - decides which joints are trustworthy this frame
//!
//! A joint passes only when it exists, carries a visibility score above the
//! threshold, and has finite coordinates. Geometry is never attempted on a
//! joint that fails the gate.

use super::landmarks::{LandmarkFrame, LandmarkPoint};
use crate::config::JointTriplet;

/// Default visibility threshold
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.6;

/// Check a single (possibly absent) landmark against a threshold
pub fn is_usable(point: Option<&LandmarkPoint>, threshold: f32) -> bool {
    let Some(point) = point else {
        return false;
    };
    let Some(visibility) = point.visibility else {
        return false;
    };
    visibility > threshold && point.x.is_finite() && point.y.is_finite()
}

/// Visibility gate with a configurable threshold
#[derive(Clone, Copy, Debug)]
pub struct VisibilityGate {
    threshold: f32,
}

impl VisibilityGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Threshold expressed as a confidence percentage
    pub fn threshold_percent(&self) -> f32 {
        self.threshold * 100.0
    }

    /// Get a landmark only if it passes the gate
    pub fn usable<'a>(&self, frame: &'a LandmarkFrame, index: usize) -> Option<&'a LandmarkPoint> {
        let point = frame.get(index);
        if is_usable(point, self.threshold) {
            point
        } else {
            None
        }
    }

    /// Get all three joints of a triplet, or nothing if any fails
    pub fn triplet<'a>(
        &self,
        frame: &'a LandmarkFrame,
        triplet: JointTriplet,
    ) -> Option<[&'a LandmarkPoint; 3]> {
        let [a, b, c] = triplet.indices();
        Some([
            self.usable(frame, a)?,
            self.usable(frame, b)?,
            self.usable(frame, c)?,
        ])
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_VISIBILITY)
    }
}

/// Mean visibility of a gated triplet
pub fn mean_visibility(points: &[&LandmarkPoint; 3]) -> f32 {
    points.iter().map(|p| p.visibility_or_zero()).sum::<f32>() / 3.0
}

/// Among candidate sides, the fully visible one with the highest mean
/// visibility. Ties keep the first listed side.
pub fn best_visible_side<'a>(
    gate: &VisibilityGate,
    frame: &'a LandmarkFrame,
    sides: &[JointTriplet],
) -> Option<(JointTriplet, [&'a LandmarkPoint; 3])> {
    let mut best: Option<(JointTriplet, [&'a LandmarkPoint; 3], f32)> = None;
    for &side in sides {
        let Some(points) = gate.triplet(frame, side) else {
            continue;
        };
        let score = mean_visibility(&points);
        let better = match &best {
            Some((_, _, best_score)) => score > *best_score,
            None => true,
        };
        if better {
            best = Some((side, points, score));
        }
    }
    best.map(|(side, points, _)| (side, points))
}
