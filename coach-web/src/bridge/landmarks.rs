//! Landmark decoding from flat JS arrays
//!
//! JavaScript hands over `Float32Array`s instead of arrays of objects:
//! - pose landmarks: 4 values per joint (x, y, z, visibility)
//! - world landmarks: 3 values per joint (x, y, z), metres
//! - secondary keypoints: 3 values per MoveNet keypoint (x px, y px, score)
//!
//! A NaN `x` marks a joint as absent. A NaN visibility keeps the joint but
//! leaves it without a score, so it never passes the visibility gate.

use nalgebra::Vector3;

use crate::analysis::{
    LandmarkFrame, LandmarkPoint, MoveNetKeypoint, SecondaryKeypoint, SecondaryPose,
    LANDMARK_COUNT,
};
use crate::error::CoachError;

/// Values per pose landmark
pub const LANDMARK_STRIDE: usize = 4;
/// Values per world landmark
pub const WORLD_STRIDE: usize = 3;
/// Values per secondary keypoint
pub const KEYPOINT_STRIDE: usize = 3;

fn check_length(actual: usize, stride: usize, slots: usize) -> Result<(), CoachError> {
    let max = stride * slots;
    if actual % stride != 0 || actual > max {
        log::warn!("rejected landmark buffer of {} values", actual);
        return Err(CoachError::FrameLength {
            actual,
            stride,
            max,
        });
    }
    Ok(())
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

/// Decode up to 33 landmarks. Trailing slots stay empty.
pub fn decode_landmarks(data: &[f32]) -> Result<LandmarkFrame, CoachError> {
    check_length(data.len(), LANDMARK_STRIDE, LANDMARK_COUNT)?;
    let slots = data.chunks_exact(LANDMARK_STRIDE).map(|chunk| {
        let x = finite(chunk[0])?;
        Some(LandmarkPoint {
            x,
            y: chunk[1],
            z: finite(chunk[2]).unwrap_or(0.0),
            visibility: finite(chunk[3]),
            world: None,
            stale: false,
        })
    });
    Ok(LandmarkFrame::from_slots(slots))
}

/// Decode the parallel world-landmark sequence
pub fn decode_world(data: &[f32]) -> Result<Vec<Option<Vector3<f32>>>, CoachError> {
    check_length(data.len(), WORLD_STRIDE, LANDMARK_COUNT)?;
    Ok(data
        .chunks_exact(WORLD_STRIDE)
        .map(|chunk| {
            let point = Vector3::new(chunk[0], chunk[1], chunk[2]);
            point.iter().all(|v| v.is_finite()).then_some(point)
        })
        .collect())
}

/// Landmarks plus optional world coordinates
pub fn decode_frame(landmarks: &[f32], world: Option<&[f32]>) -> Result<LandmarkFrame, CoachError> {
    let mut frame = decode_landmarks(landmarks)?;
    if let Some(world) = world.filter(|w| !w.is_empty()) {
        frame.attach_world(decode_world(world)?);
    }
    Ok(frame)
}

/// Decode a MoveNet pose given in video pixels
pub fn decode_secondary(
    data: &[f32],
    video_width: f32,
    video_height: f32,
) -> Result<SecondaryPose, CoachError> {
    check_length(data.len(), KEYPOINT_STRIDE, MoveNetKeypoint::COUNT)?;
    let mut pose = SecondaryPose::new(video_width, video_height);
    for (slot, chunk) in pose.keypoints.iter_mut().zip(data.chunks_exact(KEYPOINT_STRIDE)) {
        *slot = match (finite(chunk[0]), finite(chunk[1]), finite(chunk[2])) {
            (Some(x), Some(y), Some(score)) => Some(SecondaryKeypoint { x, y, score }),
            _ => None,
        };
    }
    Ok(pose)
}
