//! Hold timer for static exercises
//!
//! Counts consecutive frames with the body line inside the tolerance band and
//! converts them to whole seconds with the observed frame rate.

use super::geometry::angle_at;
use super::landmarks::LandmarkFrame;
use super::visibility::VisibilityGate;
use crate::config::{HoldProfile, JointTriplet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldEvent {
    /// First frame at or past the minimum hold
    TargetReached,
    /// Still aligned after the target was reached
    Steady,
    /// Alignment lost after holding for this many seconds
    Ended { seconds: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldUpdate {
    pub aligned: bool,
    pub seconds: u32,
    pub event: Option<HoldEvent>,
}

/// Body-line angle of a hold triplet in image space, if all joints pass
pub fn body_line_angle(
    gate: &VisibilityGate,
    frame: &LandmarkFrame,
    triplet: JointTriplet,
) -> Option<f32> {
    let [a, b, c] = gate.triplet(frame, triplet)?;
    angle_at(a.position(), b.position(), c.position())
}

#[derive(Clone, Debug)]
pub struct HoldTimer {
    target: f32,
    tolerance: f32,
    min_hold_seconds: u32,
    frames: u32,
    reached: bool,
}

impl HoldTimer {
    pub fn new(profile: &HoldProfile) -> Self {
        Self {
            target: profile.alignment_target,
            tolerance: profile.alignment_tolerance,
            min_hold_seconds: profile.min_hold_duration,
            frames: 0,
            reached: false,
        }
    }

    pub fn is_aligned(&self, angle: f32) -> bool {
        (angle - self.target).abs() < self.tolerance
    }

    fn seconds_at(&self, fps: f32) -> u32 {
        if fps <= 0.0 {
            return 0;
        }
        (self.frames as f32 / fps).floor() as u32
    }

    /// Feed one body-line angle measured at `fps` frames per second
    pub fn update(&mut self, angle: f32, fps: f32) -> HoldUpdate {
        if self.is_aligned(angle) {
            self.frames += 1;
            let seconds = self.seconds_at(fps);
            let event = if seconds >= self.min_hold_seconds {
                if self.reached {
                    Some(HoldEvent::Steady)
                } else {
                    self.reached = true;
                    Some(HoldEvent::TargetReached)
                }
            } else {
                None
            };
            return HoldUpdate {
                aligned: true,
                seconds,
                event,
            };
        }

        let event = (self.frames > 0).then(|| HoldEvent::Ended {
            seconds: self.seconds_at(fps),
        });
        self.interrupt();
        HoldUpdate {
            aligned: false,
            seconds: 0,
            event,
        }
    }

    /// Tracking lost: the hold restarts from zero
    pub fn interrupt(&mut self) {
        self.frames = 0;
        self.reached = false;
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}
