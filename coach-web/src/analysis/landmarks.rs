//! Landmark frame types
//!
//! One frame of MediaPipe Pose output: up to 33 joint slots, each either
//! absent or a normalized image point with an optional metric world point.

use nalgebra::Vector3;

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

pub const LANDMARK_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_EYE: usize = 2;
pub const RIGHT_EYE: usize = 5;
pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;
pub const LEFT_FOOT_INDEX: usize = 31;
pub const RIGHT_FOOT_INDEX: usize = 32;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A single tracked joint for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LandmarkPoint {
    pub x: f32,  // 0-1 normalized
    pub y: f32,  // 0-1 normalized
    pub z: f32,  // Relative depth, 0 when the estimator gives none
    /// Estimator confidence that the joint is located and unoccluded
    pub visibility: Option<f32>,
    /// Metric 3D position from the world-landmark output
    pub world: Option<Vector3<f32>>,
    /// Carried over from a previous frame by the fuser
    pub stale: bool,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
            ..Default::default()
        }
    }

    pub fn with_world(mut self, world: Vector3<f32>) -> Self {
        self.world = Some(world);
        self
    }

    /// Normalized image position (z = relative depth)
    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn visibility_or_zero(&self) -> f32 {
        self.visibility.unwrap_or(0.0)
    }
}

/// All joint slots of one frame. Missing joints are `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Option<LandmarkPoint>; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn empty() -> Self {
        Self {
            points: [None; LANDMARK_COUNT],
        }
    }

    /// Build a frame from slots in index order. Extra slots are ignored.
    pub fn from_slots<I>(slots: I) -> Self
    where
        I: IntoIterator<Item = Option<LandmarkPoint>>,
    {
        let mut frame = Self::empty();
        for (slot, point) in frame.points.iter_mut().zip(slots) {
            *slot = point;
        }
        frame
    }

    pub fn get(&self, index: usize) -> Option<&LandmarkPoint> {
        self.points.get(index).and_then(|p| p.as_ref())
    }

    pub fn set(&mut self, index: usize, point: Option<LandmarkPoint>) {
        if let Some(slot) = self.points.get_mut(index) {
            *slot = point;
        }
    }

    /// Attach world points from the parallel world-landmark sequence
    pub fn attach_world<I>(&mut self, world: I)
    where
        I: IntoIterator<Item = Option<Vector3<f32>>>,
    {
        for (slot, w) in self.points.iter_mut().zip(world) {
            if let Some(point) = slot.as_mut() {
                point.world = w;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&LandmarkPoint>> {
        self.points.iter().map(|p| p.as_ref())
    }

    pub fn present_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self::empty()
    }
}
