//! Secondary-detector fusion
//!
//! Merges a MoveNet 17-keypoint pose (pixel coordinates + score) into the
//! 33-slot MediaPipe frame before analysis. Slots with no good source decay
//! from the previous fused frame instead of vanishing at once.

use super::landmarks::{self, LandmarkFrame, LandmarkPoint, LANDMARK_COUNT};
use crate::config::CoachConfig;

/// MoveNet keypoint order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum MoveNetKeypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl MoveNetKeypoint {
    pub const COUNT: usize = 17;

    /// MoveNet counterpart of a MediaPipe landmark index
    pub fn from_mediapipe(index: usize) -> Option<Self> {
        match index {
            landmarks::NOSE => Some(Self::Nose),
            landmarks::LEFT_EYE => Some(Self::LeftEye),
            landmarks::RIGHT_EYE => Some(Self::RightEye),
            landmarks::LEFT_EAR => Some(Self::LeftEar),
            landmarks::RIGHT_EAR => Some(Self::RightEar),
            landmarks::LEFT_SHOULDER => Some(Self::LeftShoulder),
            landmarks::RIGHT_SHOULDER => Some(Self::RightShoulder),
            landmarks::LEFT_ELBOW => Some(Self::LeftElbow),
            landmarks::RIGHT_ELBOW => Some(Self::RightElbow),
            landmarks::LEFT_WRIST => Some(Self::LeftWrist),
            landmarks::RIGHT_WRIST => Some(Self::RightWrist),
            landmarks::LEFT_HIP => Some(Self::LeftHip),
            landmarks::RIGHT_HIP => Some(Self::RightHip),
            landmarks::LEFT_KNEE => Some(Self::LeftKnee),
            landmarks::RIGHT_KNEE => Some(Self::RightKnee),
            landmarks::LEFT_ANKLE => Some(Self::LeftAnkle),
            landmarks::RIGHT_ANKLE => Some(Self::RightAnkle),
            _ => None,
        }
    }
}

/// One MoveNet keypoint in video pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryKeypoint {
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

/// A MoveNet pose plus the video size needed to normalize it
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryPose {
    pub keypoints: [Option<SecondaryKeypoint>; MoveNetKeypoint::COUNT],
    pub video_width: f32,
    pub video_height: f32,
}

impl SecondaryPose {
    pub fn new(video_width: f32, video_height: f32) -> Self {
        Self {
            keypoints: [None; MoveNetKeypoint::COUNT],
            video_width,
            video_height,
        }
    }

    pub fn set(&mut self, keypoint: MoveNetKeypoint, point: SecondaryKeypoint) {
        self.keypoints[keypoint as usize] = Some(point);
    }

    /// Keypoint for a MediaPipe slot, with normalized coordinates
    fn normalized(&self, mediapipe_index: usize) -> Option<SecondaryKeypoint> {
        let keypoint = MoveNetKeypoint::from_mediapipe(mediapipe_index)?;
        let point = self.keypoints[keypoint as usize]?;
        if self.video_width <= 0.0 || self.video_height <= 0.0 {
            return None;
        }
        Some(SecondaryKeypoint {
            x: point.x / self.video_width,
            y: point.y / self.video_height,
            score: point.score,
        })
    }
}

#[derive(Clone, Debug)]
pub struct LandmarkFuser {
    previous: LandmarkFrame,
    primary_threshold: f32,
    secondary_threshold: f32,
    decay: f32,
}

impl LandmarkFuser {
    pub fn new(primary_threshold: f32, secondary_threshold: f32, decay: f32) -> Self {
        Self {
            previous: LandmarkFrame::empty(),
            primary_threshold,
            secondary_threshold,
            decay,
        }
    }

    pub fn from_config(config: &CoachConfig) -> Self {
        Self::new(
            config.min_visibility,
            config.secondary_confidence,
            config.fusion_decay,
        )
    }

    /// Fuse one frame pair. The result is remembered for decay on the next
    /// call.
    pub fn fuse(&mut self, primary: &LandmarkFrame, secondary: &SecondaryPose) -> LandmarkFrame {
        let mut fused = LandmarkFrame::empty();
        for index in 0..LANDMARK_COUNT {
            fused.set(index, self.fuse_slot(index, primary.get(index), secondary));
        }
        self.previous = fused.clone();
        fused
    }

    fn fuse_slot(
        &self,
        index: usize,
        primary: Option<&LandmarkPoint>,
        secondary: &SecondaryPose,
    ) -> Option<LandmarkPoint> {
        let primary_score = primary.map_or(0.0, |p| p.visibility_or_zero());
        let moved = secondary
            .normalized(index)
            .filter(|k| k.score >= self.secondary_threshold);

        match (primary, moved) {
            (Some(p), Some(m)) if primary_score >= self.primary_threshold => {
                let total = primary_score + m.score;
                Some(LandmarkPoint {
                    x: (p.x * primary_score + m.x * m.score) / total,
                    y: (p.y * primary_score + m.y * m.score) / total,
                    visibility: Some((total / 2.0).min(1.0)),
                    stale: false,
                    ..*p
                })
            }
            (Some(p), _) if primary_score >= self.primary_threshold => Some(*p),
            (_, Some(m)) => Some(LandmarkPoint {
                x: m.x,
                y: m.y,
                z: primary.map_or(0.0, |p| p.z),
                visibility: Some(m.score),
                world: None,
                stale: false,
            }),
            _ => self.previous.get(index).map(|prev| LandmarkPoint {
                visibility: Some(prev.visibility.unwrap_or(0.5) * self.decay),
                stale: true,
                ..*prev
            }),
        }
    }

    pub fn reset(&mut self) {
        self.previous = LandmarkFrame::empty();
    }
}

impl Default for LandmarkFuser {
    fn default() -> Self {
        Self::from_config(&CoachConfig::default())
    }
}
