//! Coach tunables
//!
//! Every field has a default, so a host can pass a partial JSON object
//! (or nothing at all).

use serde::{Deserialize, Serialize};

use crate::error::CoachError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachConfig {
    /// Joints at or below this visibility are ignored
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f32,
    /// Same text is not re-shown within this window
    #[serde(default = "default_feedback_cooldown_ms")]
    pub feedback_cooldown_ms: f64,
    /// Displayed feedback list is capped at this many messages
    #[serde(default = "default_max_feedback_items")]
    pub max_feedback_items: usize,
    /// A lone "good" message clears itself after this delay
    #[serde(default = "default_feedback_clear_ms")]
    pub feedback_clear_ms: f64,
    #[serde(default = "default_side_switch_cooldown_ms")]
    pub side_switch_cooldown_ms: f64,
    /// Every Nth interrupted frame repeats the visibility warning
    #[serde(default = "default_visibility_warning_frames")]
    pub visibility_warning_frames: u32,
    #[serde(default = "default_min_duration_ms")]
    pub default_min_duration_ms: f64,
    #[serde(default = "default_max_duration_ms")]
    pub default_max_duration_ms: f64,
    #[serde(default = "default_min_range")]
    pub default_min_range: f32,
    #[serde(default = "default_min_frames")]
    pub default_min_frames: u32,
    /// Frame rate assumed until the meter has a measurement
    #[serde(default = "default_fallback_fps")]
    pub fallback_fps: f32,
    /// Visibility multiplier for a joint carried over by the fuser
    #[serde(default = "default_fusion_decay")]
    pub fusion_decay: f32,
    /// Minimum score for a secondary-detector keypoint
    #[serde(default = "default_secondary_confidence")]
    pub secondary_confidence: f32,
}

fn default_min_visibility() -> f32 {
    0.6
}

fn default_feedback_cooldown_ms() -> f64 {
    3000.0
}

fn default_max_feedback_items() -> usize {
    3
}

fn default_feedback_clear_ms() -> f64 {
    3000.0
}

fn default_side_switch_cooldown_ms() -> f64 {
    4000.0
}

fn default_visibility_warning_frames() -> u32 {
    18
}

fn default_min_duration_ms() -> f64 {
    300.0
}

fn default_max_duration_ms() -> f64 {
    10_000.0
}

fn default_min_range() -> f32 {
    40.0
}

fn default_min_frames() -> u32 {
    12
}

fn default_fallback_fps() -> f32 {
    30.0
}

fn default_fusion_decay() -> f32 {
    0.9
}

fn default_secondary_confidence() -> f32 {
    0.6
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            min_visibility: default_min_visibility(),
            feedback_cooldown_ms: default_feedback_cooldown_ms(),
            max_feedback_items: default_max_feedback_items(),
            feedback_clear_ms: default_feedback_clear_ms(),
            side_switch_cooldown_ms: default_side_switch_cooldown_ms(),
            visibility_warning_frames: default_visibility_warning_frames(),
            default_min_duration_ms: default_min_duration_ms(),
            default_max_duration_ms: default_max_duration_ms(),
            default_min_range: default_min_range(),
            default_min_frames: default_min_frames(),
            fallback_fps: default_fallback_fps(),
            fusion_decay: default_fusion_decay(),
            secondary_confidence: default_secondary_confidence(),
        }
    }
}

impl CoachConfig {
    pub fn from_json(json: &str) -> Result<Self, CoachError> {
        let config: CoachConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoachError> {
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(CoachError::InvalidConfig(format!(
                "minVisibility must be within 0..=1, got {}",
                self.min_visibility
            )));
        }
        if self.max_feedback_items == 0 {
            return Err(CoachError::InvalidConfig("maxFeedbackItems must be at least 1".into()));
        }
        if self.visibility_warning_frames == 0 {
            return Err(CoachError::InvalidConfig(
                "visibilityWarningFrames must be at least 1".into(),
            ));
        }
        if self.default_min_duration_ms > self.default_max_duration_ms {
            return Err(CoachError::InvalidConfig(
                "defaultMinDurationMs exceeds defaultMaxDurationMs".into(),
            ));
        }
        if self.fallback_fps <= 0.0 {
            return Err(CoachError::InvalidConfig("fallbackFps must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = CoachConfig::from_json("{}").unwrap();
        assert_eq!(config, CoachConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{"minVisibility": 0.5, "maxFeedbackItems": 5}"#;
        let config = CoachConfig::from_json(json).unwrap();
        assert_eq!(config.min_visibility, 0.5);
        assert_eq!(config.max_feedback_items, 5);
        assert_eq!(config.feedback_cooldown_ms, 3000.0);
    }

    #[test]
    fn test_rejects_out_of_range_visibility() {
        assert!(CoachConfig::from_json(r#"{"minVisibility": 1.5}"#).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            CoachConfig::from_json("{not json"),
            Err(CoachError::Json(_))
        ));
    }
}
