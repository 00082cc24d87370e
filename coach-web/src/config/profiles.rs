//! Exercise profiles
//!
//! Static, read-only description of each exercise: which joint triplets to
//! measure, the rep thresholds or hold target, stage labels and form checks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::coach::CoachConfig;
use crate::analysis::landmarks::LANDMARK_COUNT;
use crate::analysis::reps::RepRules;
use crate::error::CoachError;
use crate::feedback::FormChecks;

// ============================================================================
// JOINT TRIPLETS
// ============================================================================

/// Three landmark indices: proximal joint, vertex, distal joint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointTriplet([usize; 3]);

impl JointTriplet {
    pub const fn new(proximal: usize, vertex: usize, distal: usize) -> Self {
        Self([proximal, vertex, distal])
    }

    pub fn indices(&self) -> [usize; 3] {
        self.0
    }

    /// Which body side the triplet sits on. MediaPipe numbers left-side
    /// joints odd and right-side joints even.
    pub fn body_side(&self) -> BodySide {
        if self.0.iter().all(|idx| idx % 2 == 1) {
            BodySide::Left
        } else if self.0.iter().all(|idx| idx % 2 == 0) {
            BodySide::Right
        } else {
            BodySide::Mixed
        }
    }
}

impl fmt::Display for JointTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0[0], self.0[1], self.0[2])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    Left,
    Right,
    Mixed,
}

impl BodySide {
    pub fn describe(&self) -> &'static str {
        match self {
            BodySide::Left => "left side",
            BodySide::Right => "right side",
            BodySide::Mixed => "best angle",
        }
    }
}

/// Position of a joint inside its triplet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripletJoint {
    Proximal,
    Vertex,
    Distal,
}

impl TripletJoint {
    pub fn slot(&self) -> usize {
        match self {
            TripletJoint::Proximal => 0,
            TripletJoint::Vertex => 1,
            TripletJoint::Distal => 2,
        }
    }
}

// ============================================================================
// PROFILES
// ============================================================================

/// Display labels for the two rep phases
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLabels {
    pub top: String,
    pub bottom: String,
}

impl Default for StageLabels {
    fn default() -> Self {
        Self {
            top: "TOP".to_string(),
            bottom: "BOTTOM".to_string(),
        }
    }
}

/// Thresholds for a repetition exercise. Which band is "high angle" is
/// exercise-specific; the tracker only sees top and bottom bands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepProfile {
    pub up_threshold: f32,
    pub down_threshold: f32,
    #[serde(default)]
    pub up_buffer: f32,
    #[serde(default)]
    pub down_buffer: f32,
    #[serde(default)]
    pub min_frames: Option<u32>,
    #[serde(default)]
    pub min_range: Option<f32>,
    #[serde(default)]
    pub min_duration_ms: Option<f64>,
    #[serde(default)]
    pub max_duration_ms: Option<f64>,
}

/// Target body line for a hold exercise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldProfile {
    pub alignment_target: f32,
    pub alignment_tolerance: f32,
    /// Seconds of continuous alignment before the hold counts
    pub min_hold_duration: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseMode {
    Reps(RepProfile),
    Hold(HoldProfile),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProfile {
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    /// Short cues shown next to the instructions
    #[serde(default)]
    pub form_cues: Vec<String>,
    /// Candidate joint triplets, usually left side then right side
    pub sides: Vec<JointTriplet>,
    #[serde(default)]
    pub labels: StageLabels,
    #[serde(default)]
    pub form: FormChecks,
    pub mode: ExerciseMode,
}

impl ExerciseProfile {
    pub fn is_hold(&self) -> bool {
        matches!(self.mode, ExerciseMode::Hold(_))
    }

    pub fn validate(&self, key: &str) -> Result<(), CoachError> {
        if self.sides.is_empty() {
            return Err(CoachError::profile(key, "no joint triplets"));
        }
        let bad_index = self
            .sides
            .iter()
            .flat_map(|t| t.indices())
            .chain(self.form.joint_indices())
            .find(|idx| *idx >= LANDMARK_COUNT);
        if let Some(idx) = bad_index {
            return Err(CoachError::profile(key, format!("joint index {} out of range", idx)));
        }
        match &self.mode {
            ExerciseMode::Reps(rep) => {
                if let (Some(min), Some(max)) = (rep.min_duration_ms, rep.max_duration_ms) {
                    if min > max {
                        return Err(CoachError::profile(key, "minDurationMs exceeds maxDurationMs"));
                    }
                }
                if rep.min_duration_ms.is_some_and(|d| d < 0.0)
                    || rep.max_duration_ms.is_some_and(|d| d < 0.0)
                {
                    return Err(CoachError::profile(key, "negative duration"));
                }
                if rep.up_buffer < 0.0 || rep.down_buffer < 0.0 {
                    return Err(CoachError::profile(key, "negative hysteresis buffer"));
                }
            }
            ExerciseMode::Hold(hold) => {
                if hold.alignment_tolerance <= 0.0 {
                    return Err(CoachError::profile(key, "alignmentTolerance must be positive"));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Exercise key → profile, loaded once and shared read-only
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseCatalog {
    profiles: BTreeMap<String, ExerciseProfile>,
}

impl ExerciseCatalog {
    pub fn new(profiles: BTreeMap<String, ExerciseProfile>) -> Result<Self, CoachError> {
        let catalog = Self { profiles };
        catalog.validate()?;
        Ok(catalog)
    }

    pub(crate) fn from_profiles(profiles: BTreeMap<String, ExerciseProfile>) -> Self {
        Self { profiles }
    }

    pub fn from_json(json: &str) -> Result<Self, CoachError> {
        let catalog: ExerciseCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CoachError> {
        for (key, profile) in &self.profiles {
            profile.validate(key)?;
        }
        Ok(())
    }

    /// Check the rep windows that result once `config` fills in the
    /// fields a profile leaves out
    pub fn validate_with(&self, config: &CoachConfig) -> Result<(), CoachError> {
        self.validate()?;
        for (key, profile) in &self.profiles {
            let ExerciseMode::Reps(rep) = &profile.mode else {
                continue;
            };
            let rules = RepRules::new(rep, config);
            if rules.min_duration_ms > rules.max_duration_ms {
                return Err(CoachError::profile(
                    key,
                    format!(
                        "effective minDurationMs {} exceeds maxDurationMs {}",
                        rules.min_duration_ms, rules.max_duration_ms
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&ExerciseProfile, CoachError> {
        self.profiles
            .get(key)
            .ok_or_else(|| CoachError::UnknownExercise(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.profiles.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExerciseProfile)> {
        self.profiles.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// First key in order, used when nothing was selected yet
    pub fn first_key(&self) -> Option<&str> {
        self.profiles.keys().next().map(|k| k.as_str())
    }
}
