//! Per-region visibility summary

use serde::Serialize;

use super::landmarks::{
    LandmarkFrame, LEFT_ANKLE, LEFT_ELBOW, LEFT_FOOT_INDEX, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER,
    LEFT_WRIST, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_FOOT_INDEX, RIGHT_HIP, RIGHT_KNEE,
    RIGHT_SHOULDER, RIGHT_WRIST,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    Upper,
    Core,
    Lower,
}

impl BodyRegion {
    pub const ALL: [BodyRegion; 3] = [BodyRegion::Upper, BodyRegion::Core, BodyRegion::Lower];

    pub fn name(&self) -> &'static str {
        match self {
            BodyRegion::Upper => "Upper",
            BodyRegion::Core => "Core",
            BodyRegion::Lower => "Lower",
        }
    }

    pub fn landmarks(&self) -> &'static [usize] {
        match self {
            BodyRegion::Upper => &[
                LEFT_SHOULDER,
                RIGHT_SHOULDER,
                LEFT_ELBOW,
                RIGHT_ELBOW,
                LEFT_WRIST,
                RIGHT_WRIST,
            ],
            BodyRegion::Core => &[LEFT_HIP, RIGHT_HIP, LEFT_SHOULDER, RIGHT_SHOULDER],
            BodyRegion::Lower => &[
                LEFT_HIP,
                RIGHT_HIP,
                LEFT_KNEE,
                RIGHT_KNEE,
                LEFT_ANKLE,
                RIGHT_ANKLE,
                LEFT_FOOT_INDEX,
                RIGHT_FOOT_INDEX,
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionConfidence {
    pub region: BodyRegion,
    /// Mean visibility of the region's joints, 0-100. Missing joints count
    /// as zero.
    pub percent: f32,
    pub low: bool,
}

/// Confidence for every region. `low_percent` is the visibility threshold
/// as a percentage.
pub fn regional_confidence(frame: &LandmarkFrame, low_percent: f32) -> Vec<RegionConfidence> {
    BodyRegion::ALL
        .iter()
        .map(|&region| {
            let indices = region.landmarks();
            let sum: f32 = indices
                .iter()
                .map(|&i| frame.get(i).map_or(0.0, |p| p.visibility_or_zero()))
                .sum();
            let percent = (sum / indices.len() as f32 * 100.0).round();
            RegionConfidence {
                region,
                percent,
                low: percent < low_percent,
            }
        })
        .collect()
}
