//! Bilateral candidate selector
//!
//! Most exercises can be measured on either side of the body. Every fully
//! visible candidate triplet contributes an angle; the reported angle is the
//! confidence-weighted mean and the single heaviest candidate decides which
//! side is "active".
//!
//! Weight = (instantaneous mean visibility + rolling average) / 2

use super::geometry::angle_at;
use super::history::VisibilityHistory;
use super::landmarks::{LandmarkFrame, LandmarkPoint};
use super::visibility::{mean_visibility, VisibilityGate};
use crate::config::JointTriplet;

/// One side that survived the gate this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub triplet: JointTriplet,
    pub angle: f32,
    /// Mean visibility of the three joints
    pub score: f32,
    pub weight: f32,
}

/// Result of one selection pass
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    /// Weighted mean across candidates
    pub angle: f32,
    pub best: Candidate,
    pub candidates: Vec<Candidate>,
}

impl Selection {
    pub fn triplet(&self) -> JointTriplet {
        self.best.triplet
    }

    /// Best candidate's visibility as a whole percentage
    pub fn confidence_percent(&self) -> f32 {
        (self.best.score * 100.0).round()
    }
}

/// The active side changed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideSwitch {
    pub from: JointTriplet,
    pub to: JointTriplet,
    /// Whether the notice cooldown allows telling the user
    pub announce: bool,
}

/// Angle for a gated triplet. World coordinates win when all three joints
/// carry them.
fn triplet_angle(points: &[&LandmarkPoint; 3]) -> Option<f32> {
    match (points[0].world, points[1].world, points[2].world) {
        (Some(a), Some(b), Some(c)) => angle_at(a, b, c),
        _ => angle_at(points[0].position(), points[1].position(), points[2].position()),
    }
}

#[derive(Clone, Debug)]
pub struct BilateralSelector {
    gate: VisibilityGate,
    history: VisibilityHistory,
    active: Option<JointTriplet>,
    last_notice_ms: Option<f64>,
    notice_cooldown_ms: f64,
}

impl BilateralSelector {
    pub fn new(gate: VisibilityGate, notice_cooldown_ms: f64) -> Self {
        Self {
            gate,
            history: VisibilityHistory::new(),
            active: None,
            last_notice_ms: None,
            notice_cooldown_ms,
        }
    }

    /// Measure every candidate side. `None` means no side was usable.
    pub fn select(&mut self, frame: &LandmarkFrame, sides: &[JointTriplet]) -> Option<Selection> {
        let mut candidates = Vec::with_capacity(sides.len());
        let mut best: Option<Candidate> = None;
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for &triplet in sides {
            let Some(points) = self.gate.triplet(frame, triplet) else {
                continue;
            };
            let Some(angle) = triplet_angle(&points) else {
                continue;
            };
            let score = mean_visibility(&points);
            let rolling = self.history.record(triplet, score);
            let candidate = Candidate {
                triplet,
                angle,
                score,
                weight: (score + rolling) / 2.0,
            };

            weighted_sum += candidate.angle * candidate.weight;
            total_weight += candidate.weight;
            // Strictly greater keeps the first-listed side on ties
            if best.map_or(true, |b| candidate.weight > b.weight) {
                best = Some(candidate);
            }
            candidates.push(candidate);
        }

        let best = best?;
        let mean = weighted_sum / total_weight;
        let angle = if total_weight > 0.0 && mean.is_finite() {
            mean
        } else {
            best.angle
        };

        Some(Selection {
            angle,
            best,
            candidates,
        })
    }

    /// Record the side used this frame. Reports a change of side, never the
    /// very first side of a session.
    pub fn note_active(&mut self, triplet: JointTriplet, now_ms: f64) -> Option<SideSwitch> {
        let previous = self.active.replace(triplet)?;
        if previous == triplet {
            return None;
        }
        let announce = self
            .last_notice_ms
            .map_or(true, |last| now_ms - last >= self.notice_cooldown_ms);
        if announce {
            self.last_notice_ms = Some(now_ms);
        }
        Some(SideSwitch {
            from: previous,
            to: triplet,
            announce,
        })
    }

    pub fn active(&self) -> Option<JointTriplet> {
        self.active
    }

    /// Tracking dropped out: rolling averages restart from scratch
    pub fn interrupt(&mut self) {
        self.history.clear();
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.active = None;
        self.last_notice_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    const LEFT: JointTriplet = JointTriplet::new(11, 13, 15);
    const RIGHT: JointTriplet = JointTriplet::new(12, 14, 16);

    fn selector() -> BilateralSelector {
        BilateralSelector::new(VisibilityGate::default(), 4000.0)
    }

    /// Right angle at the vertex on the given side
    fn place_arm(frame: &mut LandmarkFrame, side: JointTriplet, visibility: f32) {
        let [a, b, c] = side.indices();
        frame.set(a, Some(LandmarkPoint::new(0.5, 0.2, visibility)));
        frame.set(b, Some(LandmarkPoint::new(0.5, 0.5, visibility)));
        frame.set(c, Some(LandmarkPoint::new(0.8, 0.5, visibility)));
    }

    #[test]
    fn test_no_usable_side() {
        let mut selector = selector();
        assert!(selector.select(&LandmarkFrame::empty(), &[LEFT, RIGHT]).is_none());
    }

    #[test]
    fn test_only_right_visible() {
        let mut selector = selector();
        let mut frame = LandmarkFrame::empty();
        place_arm(&mut frame, RIGHT, 0.9);
        let selection = selector.select(&frame, &[LEFT, RIGHT]).unwrap();
        assert_eq!(selection.triplet(), RIGHT);
        assert_eq!(selection.candidates.len(), 1);
        assert!((selection.angle - 90.0).abs() < 1e-3);
        assert_eq!(selection.confidence_percent(), 90.0);
    }

    #[test]
    fn test_equal_confidence_tie_keeps_first_listed() {
        let mut selector = selector();
        let mut frame = LandmarkFrame::empty();
        place_arm(&mut frame, LEFT, 0.8);
        place_arm(&mut frame, RIGHT, 0.8);
        for _ in 0..5 {
            let selection = selector.select(&frame, &[LEFT, RIGHT]).unwrap();
            assert_eq!(selection.triplet(), LEFT);
        }
        let selection = selector.select(&frame, &[RIGHT, LEFT]).unwrap();
        assert_eq!(selection.triplet(), RIGHT);
    }

    #[test]
    fn test_weighted_mean_of_two_sides() {
        let mut selector = selector();
        let mut frame = LandmarkFrame::empty();
        place_arm(&mut frame, LEFT, 0.9);
        // Straight right arm: 180 degrees
        frame.set(12, Some(LandmarkPoint::new(0.5, 0.2, 0.9)));
        frame.set(14, Some(LandmarkPoint::new(0.5, 0.5, 0.9)));
        frame.set(16, Some(LandmarkPoint::new(0.5, 0.8, 0.9)));
        let selection = selector.select(&frame, &[LEFT, RIGHT]).unwrap();
        assert!((selection.angle - 135.0).abs() < 1e-3);
    }

    #[test]
    fn test_prefers_world_coordinates() {
        let mut selector = selector();
        let mut frame = LandmarkFrame::empty();
        let world = [
            (11, Vector3::new(0.0, 1.0, 0.0)),
            (13, Vector3::new(0.0, 0.0, 0.0)),
            (15, Vector3::new(0.0, -1.0, 0.0)),
        ];
        for (index, position) in world {
            let point = LandmarkPoint::new(0.5, 0.5 + index as f32 * 0.01, 0.9);
            frame.set(index, Some(point.with_world(position)));
        }
        let selection = selector.select(&frame, &[LEFT]).unwrap();
        assert!((selection.angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_first_side_is_not_a_switch() {
        let mut selector = selector();
        assert_eq!(selector.note_active(LEFT, 0.0), None);
        assert_eq!(selector.note_active(LEFT, 10.0), None);
    }

    #[test]
    fn test_side_switch_notice_cooldown() {
        let mut selector = selector();
        selector.note_active(LEFT, 0.0);

        let switch = selector.note_active(RIGHT, 100.0).unwrap();
        assert!(switch.announce);
        assert_eq!(switch.from, LEFT);

        let switch = selector.note_active(LEFT, 1000.0).unwrap();
        assert!(!switch.announce);

        let switch = selector.note_active(RIGHT, 4100.0).unwrap();
        assert!(switch.announce);
    }

    #[test]
    fn test_reset_forgets_active_side() {
        let mut selector = selector();
        selector.note_active(LEFT, 0.0);
        selector.reset();
        assert_eq!(selector.active(), None);
        assert_eq!(selector.note_active(RIGHT, 1.0), None);
    }
}
