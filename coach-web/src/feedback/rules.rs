//! Form rule engine
//!
//! Each exercise carries a small ordered list of independent checks. They
//! run every frame against the raw landmarks and the smoothed angle, and
//! each one contributes at most one note.

use serde::{Deserialize, Serialize};

use super::message::FeedbackNote;
use crate::analysis::geometry::angle_at;
use crate::analysis::landmarks::{LandmarkFrame, LandmarkPoint};
use crate::analysis::reps::Phase;
use crate::analysis::visibility::{best_visible_side, VisibilityGate};
use crate::config::{JointTriplet, TripletJoint};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum FormCheck {
    /// Horizontal distance between two joints of the best visible side,
    /// expressed as a fraction of image width
    JointSpread {
        from: TripletJoint,
        to: TripletJoint,
        #[serde(default)]
        wider_than: Option<f32>,
        #[serde(default)]
        narrower_than: Option<f32>,
        /// Only fire while the smoothed angle is below this
        #[serde(default)]
        angle_below: Option<f32>,
        note: FeedbackNote,
    },
    /// Smoothed angle strictly inside (above, below)
    AngleBand {
        #[serde(default)]
        above: Option<f32>,
        #[serde(default)]
        below: Option<f32>,
        /// Only fire in this rep phase
        #[serde(default)]
        phase: Option<Phase>,
        /// Only fire when a candidate side is fully visible
        #[serde(default)]
        needs_side: bool,
        note: FeedbackNote,
    },
    /// Straightness of a shoulder-hip-ankle line
    BodyLine {
        sides: Vec<JointTriplet>,
        min_angle: f32,
        sagging: FeedbackNote,
        #[serde(default)]
        aligned: Option<FeedbackNote>,
    },
}

/// Inputs for one evaluation pass
pub struct RuleContext<'a> {
    pub frame: &'a LandmarkFrame,
    pub gate: &'a VisibilityGate,
    pub sides: &'a [JointTriplet],
    pub angle: f32,
    pub phase: Option<Phase>,
}

impl FormCheck {
    fn evaluate(
        &self,
        ctx: &RuleContext,
        side: Option<&[&LandmarkPoint; 3]>,
    ) -> Option<FeedbackNote> {
        match self {
            FormCheck::JointSpread {
                from,
                to,
                wider_than,
                narrower_than,
                angle_below,
                note,
            } => {
                let points = side?;
                let spread = (points[to.slot()].x - points[from.slot()].x).abs();
                let fires = wider_than.map_or(true, |limit| spread > limit)
                    && narrower_than.map_or(true, |limit| spread < limit)
                    && angle_below.map_or(true, |limit| ctx.angle < limit);
                fires.then(|| note.clone())
            }
            FormCheck::AngleBand {
                above,
                below,
                phase,
                needs_side,
                note,
            } => {
                if *needs_side && side.is_none() {
                    return None;
                }
                if phase.is_some() && *phase != ctx.phase {
                    return None;
                }
                let fires = above.map_or(true, |limit| ctx.angle > limit)
                    && below.map_or(true, |limit| ctx.angle < limit);
                fires.then(|| note.clone())
            }
            FormCheck::BodyLine {
                sides,
                min_angle,
                sagging,
                aligned,
            } => {
                let (_, [shoulder, hip, ankle]) = best_visible_side(ctx.gate, ctx.frame, sides)?;
                let body_angle = angle_at(shoulder.position(), hip.position(), ankle.position())?;
                if body_angle < *min_angle {
                    Some(sagging.clone())
                } else {
                    aligned.clone()
                }
            }
        }
    }

    fn extra_sides(&self) -> &[JointTriplet] {
        match self {
            FormCheck::BodyLine { sides, .. } => sides,
            _ => &[],
        }
    }
}

/// The ordered check list of one exercise
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormChecks {
    /// Produce nothing when no candidate side is fully visible
    #[serde(default)]
    pub require_side: bool,
    #[serde(default)]
    pub checks: Vec<FormCheck>,
}

impl FormChecks {
    pub fn new(require_side: bool, checks: Vec<FormCheck>) -> Self {
        Self {
            require_side,
            checks,
        }
    }

    /// Run every check. `None` means "leave the displayed feedback alone";
    /// `Some` is a full replacement set.
    pub fn evaluate(&self, ctx: &RuleContext) -> Option<Vec<FeedbackNote>> {
        if self.checks.is_empty() {
            return None;
        }
        let side = best_visible_side(ctx.gate, ctx.frame, ctx.sides);
        if self.require_side && side.is_none() {
            return None;
        }
        let points = side.as_ref().map(|(_, points)| points);
        let notes: Vec<FeedbackNote> = self
            .checks
            .iter()
            .filter_map(|check| check.evaluate(ctx, points))
            .collect();
        if notes.is_empty() {
            None
        } else {
            Some(notes)
        }
    }

    /// Landmark indices referenced by the checks themselves
    pub fn joint_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.checks
            .iter()
            .flat_map(|check| check.extra_sides().iter().flat_map(|t| t.indices()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExerciseCatalog;

    fn point(x: f32, y: f32) -> Option<LandmarkPoint> {
        Some(LandmarkPoint::new(x, y, 0.9))
    }

    fn texts(notes: Option<Vec<FeedbackNote>>) -> Vec<String> {
        notes.unwrap_or_default().into_iter().map(|n| n.text).collect()
    }

    fn evaluate(
        key: &str,
        frame: &LandmarkFrame,
        angle: f32,
        phase: Option<Phase>,
    ) -> Option<Vec<FeedbackNote>> {
        let catalog = ExerciseCatalog::builtin();
        let profile = catalog.get(key).unwrap();
        let gate = VisibilityGate::default();
        profile.form.evaluate(&RuleContext {
            frame,
            gate: &gate,
            sides: &profile.sides,
            angle,
            phase,
        })
    }

    #[test]
    fn test_curl_elbow_drift() {
        let mut frame = LandmarkFrame::empty();
        frame.set(11, point(0.30, 0.30));
        frame.set(13, point(0.50, 0.50));
        frame.set(15, point(0.52, 0.30));
        let notes = texts(evaluate("bicep_curl", &frame, 100.0, None));
        assert_eq!(notes, vec!["Keep your elbow anchored near your ribs."]);
    }

    #[test]
    fn test_curl_contraction_needs_small_angle() {
        let mut frame = LandmarkFrame::empty();
        frame.set(11, point(0.50, 0.30));
        frame.set(13, point(0.52, 0.50));
        frame.set(15, point(0.54, 0.32));
        assert!(evaluate("bicep_curl", &frame, 60.0, None).is_none());
        let notes = texts(evaluate("bicep_curl", &frame, 25.0, None));
        assert_eq!(notes, vec!["Strong contraction - squeeze briefly at the top."]);
    }

    #[test]
    fn test_required_side_missing_leaves_board_alone() {
        let frame = LandmarkFrame::empty();
        assert!(evaluate("squat", &frame, 80.0, None).is_none());
    }

    #[test]
    fn test_squat_depth_and_knee() {
        let mut frame = LandmarkFrame::empty();
        frame.set(24, point(0.40, 0.50));
        frame.set(26, point(0.60, 0.60));
        frame.set(28, point(0.45, 0.80));
        let notes = texts(evaluate("squat", &frame, 80.0, None));
        assert_eq!(
            notes,
            vec!["Depth looks solid.", "Keep the knee tracking over the ankle."]
        );
    }

    #[test]
    fn test_squat_shallow_only_at_bottom() {
        let mut frame = LandmarkFrame::empty();
        frame.set(23, point(0.40, 0.50));
        frame.set(25, point(0.42, 0.60));
        frame.set(27, point(0.43, 0.80));
        assert!(evaluate("squat", &frame, 120.0, Some(Phase::Top)).is_none());
        let notes = texts(evaluate("squat", &frame, 120.0, Some(Phase::Bottom)));
        assert_eq!(notes, vec!["Drop slightly lower for full range."]);
    }

    #[test]
    fn test_pushup_body_line() {
        let mut frame = LandmarkFrame::empty();
        // Straight line shoulder-hip-ankle
        frame.set(11, point(0.20, 0.50));
        frame.set(23, point(0.50, 0.50));
        frame.set(27, point(0.80, 0.50));
        let notes = texts(evaluate("pushup", &frame, 120.0, None));
        assert_eq!(notes, vec!["Body alignment looks good."]);

        // Sagging hips
        frame.set(23, point(0.50, 0.70));
        let notes = texts(evaluate("pushup", &frame, 120.0, None));
        assert_eq!(notes, vec!["Lift hips slightly to keep a straight line."]);
    }

    #[test]
    fn test_pushup_depth_needs_visible_arm() {
        let frame = LandmarkFrame::empty();
        assert!(evaluate("pushup", &frame, 60.0, None).is_none());

        let mut frame = LandmarkFrame::empty();
        frame.set(12, point(0.30, 0.40));
        frame.set(14, point(0.35, 0.50));
        frame.set(16, point(0.30, 0.60));
        let notes = texts(evaluate("pushup", &frame, 60.0, None));
        assert_eq!(notes, vec!["Great push-up depth."]);
    }

    #[test]
    fn test_angle_only_rules_need_no_landmarks() {
        let frame = LandmarkFrame::empty();
        let notes = texts(evaluate("shoulder_press", &frame, 170.0, None));
        assert_eq!(notes, vec!["Strong lockout overhead."]);
        assert!(evaluate("shoulder_press", &frame, 150.0, None).is_none());
    }

    #[test]
    fn test_check_json_shape() {
        let json = r#"{"requireSide": true, "checks": [
            {"kind": "joint_spread", "from": "vertex", "to": "distal", "widerThan": 0.1,
             "note": {"text": "Knee out", "severity": "warning"}},
            {"kind": "angle_band", "above": 70, "below": 90,
             "note": {"text": "Deep", "severity": "good"}}
        ]}"#;
        let checks: FormChecks = serde_json::from_str(json).unwrap();
        assert!(checks.require_side);
        assert_eq!(checks.checks.len(), 2);
    }
}
