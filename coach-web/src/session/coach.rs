//! Coaching session
//!
//! `Coach` owns everything one user session needs: the chosen exercise, the
//! per-run `SessionContext` (trackers, histories, feedback), the metrics
//! aggregator and the frame-rate meter. Frames are processed one at a time
//! and each call returns a self-contained `FrameReport`.
//!
//! Session boundaries (start, reset, exercise change) swap the whole
//! `SessionContext` for a fresh one between frames, so no tracker is ever
//! half reset.

use std::rc::Rc;

use serde::Serialize;

use super::fps::FrameRateMeter;
use super::metrics::{format_elapsed, SessionMetrics, SessionSummary};
use crate::analysis::hold::body_line_angle;
use crate::analysis::{
    regional_confidence, AngleSmoother, BilateralSelector, FrameSample, HoldEvent, HoldTimer,
    LandmarkFrame, LandmarkFuser, Phase, RegionConfidence, RejectReason, RepEvent, RepRules,
    RepTracker, SecondaryPose, Selection, VisibilityGate,
};
use crate::config::{
    BodySide, CoachConfig, ExerciseCatalog, ExerciseMode, ExerciseProfile, JointTriplet,
};
use crate::error::CoachError;
use crate::feedback::{FeedbackBoard, FeedbackMessage, FeedbackNote, RuleContext};

const DEFAULT_EXERCISE: &str = "bicep_curl";

const REP_COMPLETED: &str = "Rep completed.";
const JOINT_NOT_VISIBLE: &str = "Joint not visible. Move fully into frame.";
const NO_POSE: &str = "No pose detected. Please step into frame.";
const STRAIGHTEN: &str = "Straighten your body";

const STAGE_READY: &str = "READY";
const STAGE_ADJUST: &str = "Adjust";
const STAGE_HOLDING: &str = "HOLDING";
const STAGE_NOT_ALIGNED: &str = "NOT ALIGNED";

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Idle,
    Tracking,
    LowVisibility,
    OutOfView,
    Paused,
}

impl TrackingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TrackingStatus::Idle => "Camera idle",
            TrackingStatus::Tracking => "Tracking form",
            TrackingStatus::LowVisibility => "Low visibility",
            TrackingStatus::OutOfView => "Move into view",
            TrackingStatus::Paused => "Paused",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_percent(percent: f32) -> Self {
        if percent >= 80.0 {
            ConfidenceTier::High
        } else if percent >= 60.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Discrete happenings of one frame, separate from routine feedback
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CoachEvent {
    RepCompleted {
        count: u32,
        duration_ms: f64,
        range: f32,
    },
    RepRejected {
        reason: RejectReason,
    },
    HoldTargetReached {
        seconds: u32,
    },
    HoldEnded {
        seconds: u32,
    },
    SideSwitched {
        side: BodySide,
        joints: String,
    },
    VisibilityLost,
    VisibilityRestored,
}

/// Everything the UI needs to draw one frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub raw_angle: Option<f32>,
    pub smoothed_angle: Option<f32>,
    pub confidence_percent: Option<f32>,
    pub confidence_tier: Option<ConfidenceTier>,
    pub stage: String,
    pub phase: Option<Phase>,
    pub rep_count: u32,
    pub hold_seconds: Option<u32>,
    pub elapsed_ms: f64,
    pub elapsed: String,
    pub side: Option<BodySide>,
    pub status: TrackingStatus,
    pub fps: u32,
    pub regions: Vec<RegionConfidence>,
    pub feedback: Vec<FeedbackMessage>,
    pub events: Vec<CoachEvent>,
}

// ============================================================================
// SESSION CONTEXT
// ============================================================================

enum Motion {
    Reps {
        rules: RepRules,
        /// Created on the first measured frame
        tracker: Option<RepTracker>,
    },
    Hold {
        timer: HoldTimer,
        seconds: u32,
    },
}

impl Motion {
    fn for_profile(profile: &ExerciseProfile, config: &CoachConfig) -> Self {
        match &profile.mode {
            ExerciseMode::Reps(rep) => Motion::Reps {
                rules: RepRules::new(rep, config),
                tracker: None,
            },
            ExerciseMode::Hold(hold) => Motion::Hold {
                timer: HoldTimer::new(hold),
                seconds: 0,
            },
        }
    }

    fn interrupt(&mut self) {
        match self {
            Motion::Reps { tracker, .. } => {
                if let Some(tracker) = tracker {
                    tracker.interrupt();
                }
            }
            Motion::Hold { timer, seconds } => {
                timer.interrupt();
                *seconds = 0;
            }
        }
    }

    fn phase(&self) -> Option<Phase> {
        match self {
            Motion::Reps { tracker, .. } => tracker.as_ref().map(|t| t.phase()),
            Motion::Hold { .. } => None,
        }
    }

    fn hold_seconds(&self) -> Option<u32> {
        match self {
            Motion::Reps { .. } => None,
            Motion::Hold { seconds, .. } => Some(*seconds),
        }
    }
}

/// Why a frame could not be measured
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Interruption {
    NoPose,
    Landmarks,
    Confidence,
}

/// Mutable per-run state, replaced wholesale on reset
struct SessionContext {
    profile: Rc<ExerciseProfile>,
    selector: BilateralSelector,
    smoother: AngleSmoother,
    motion: Motion,
    board: FeedbackBoard,
    rep_count: u32,
    lost_frames: u32,
    interrupted: bool,
    stage: String,
}

impl SessionContext {
    fn new(config: &CoachConfig, gate: VisibilityGate, profile: &ExerciseProfile) -> Self {
        Self {
            profile: Rc::new(profile.clone()),
            selector: BilateralSelector::new(gate, config.side_switch_cooldown_ms),
            smoother: AngleSmoother::new(),
            motion: Motion::for_profile(profile, config),
            board: FeedbackBoard::from_config(config),
            rep_count: 0,
            lost_frames: 0,
            interrupted: false,
            stage: STAGE_READY.to_string(),
        }
    }
}

/// Values measured on one frame, passed between processing stages
struct Measured {
    selection: Option<Selection>,
    smoothed: Option<f32>,
    confidence: Option<f32>,
    status: TrackingStatus,
    events: Vec<CoachEvent>,
}

// ============================================================================
// COACH
// ============================================================================

pub struct Coach {
    config: CoachConfig,
    catalog: ExerciseCatalog,
    exercise: String,
    gate: VisibilityGate,
    fuser: LandmarkFuser,
    fps: FrameRateMeter,
    metrics: SessionMetrics,
    context: SessionContext,
    running: bool,
    paused: bool,
    start_ms: Option<f64>,
    last_summary: Option<SessionSummary>,
}

impl Coach {
    pub fn new(config: CoachConfig, catalog: ExerciseCatalog) -> Result<Self, CoachError> {
        config.validate()?;
        catalog.validate_with(&config)?;
        let exercise = if catalog.contains(DEFAULT_EXERCISE) {
            DEFAULT_EXERCISE.to_string()
        } else {
            catalog
                .first_key()
                .map(str::to_string)
                .ok_or_else(|| CoachError::InvalidConfig("exercise catalog is empty".into()))?
        };
        let gate = VisibilityGate::new(config.min_visibility);
        let context = SessionContext::new(&config, gate, catalog.get(&exercise)?);

        Ok(Self {
            fuser: LandmarkFuser::from_config(&config),
            config,
            catalog,
            exercise,
            gate,
            fps: FrameRateMeter::new(),
            metrics: SessionMetrics::new(),
            context,
            running: false,
            paused: false,
            start_ms: None,
            last_summary: None,
        })
    }

    /// Built-in catalog with default tunables
    pub fn with_defaults() -> Result<Self, CoachError> {
        Self::new(CoachConfig::default(), ExerciseCatalog::builtin())
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    pub fn start(&mut self, now_ms: f64) {
        self.running = true;
        self.paused = false;
        self.start_ms = Some(now_ms);
        self.metrics.begin(now_ms);
        self.fps.reset();
        self.fuser.reset();
        self.fresh_context();
        log::info!("session started: {}", self.exercise);
    }

    pub fn pause(&mut self) {
        if self.running && !self.paused {
            self.paused = true;
            log::info!("session paused");
        }
    }

    pub fn resume(&mut self) {
        if self.running && self.paused {
            self.paused = false;
            log::info!("session resumed");
        }
    }

    /// End the session and keep its summary as the last one
    pub fn stop(&mut self, now_ms: f64) -> Option<SessionSummary> {
        if !self.running {
            return None;
        }
        self.running = false;
        self.paused = false;
        self.start_ms = None;
        let summary = self.metrics.finalize(self.context.rep_count, now_ms)?;
        log::info!(
            "session stopped: {} reps in {}",
            summary.reps,
            summary.duration
        );
        self.last_summary = Some(summary.clone());
        Some(summary)
    }

    /// Clear counters, histories and feedback. A running session keeps
    /// running with fresh metrics.
    pub fn reset(&mut self, now_ms: f64) {
        self.fresh_context();
        self.fuser.reset();
        if self.running {
            self.start_ms = Some(now_ms);
            self.metrics.begin(now_ms);
        }
        log::info!("session reset: {}", self.exercise);
    }

    pub fn select_exercise(&mut self, key: &str, now_ms: f64) -> Result<(), CoachError> {
        self.catalog.get(key)?;
        self.exercise = key.to_string();
        log::info!("exercise selected: {}", key);
        self.reset(now_ms);
        Ok(())
    }

    fn fresh_context(&mut self) {
        // The current exercise always resolves; `select_exercise` checks keys
        if let Ok(profile) = self.catalog.get(&self.exercise) {
            self.context = SessionContext::new(&self.config, self.gate, profile);
        }
    }

    // ------------------------------------------------------------------------
    // Frame processing
    // ------------------------------------------------------------------------

    /// Fuse a secondary detector's pose into the frame, then process it
    pub fn process_fused_frame(
        &mut self,
        frame: &LandmarkFrame,
        secondary: &SecondaryPose,
        now_ms: f64,
    ) -> FrameReport {
        if !self.is_active() {
            return self.report(None, now_ms);
        }
        let fused = self.fuser.fuse(frame, secondary);
        self.process_frame(&fused, now_ms)
    }

    pub fn process_frame(&mut self, frame: &LandmarkFrame, now_ms: f64) -> FrameReport {
        if !self.is_active() {
            return self.report(None, now_ms);
        }

        self.fps.tick(now_ms);
        self.context.board.tick(now_ms);

        let profile = Rc::clone(&self.context.profile);

        let mut measured = Measured {
            selection: None,
            smoothed: None,
            confidence: None,
            status: TrackingStatus::Tracking,
            events: Vec::new(),
        };

        if frame.present_count() == 0 {
            self.context.board.push(FeedbackNote::warning(NO_POSE), false, now_ms);
            self.interrupt(Interruption::NoPose, &mut measured, now_ms);
            return self.report(Some((frame, measured)), now_ms);
        }

        let Some(selection) = self.context.selector.select(frame, &profile.sides) else {
            if profile.is_hold() {
                self.context.board.push(
                    FeedbackNote::warning(format!(
                        "Cannot track {} - adjust position",
                        profile.name.to_lowercase()
                    )),
                    false,
                    now_ms,
                );
            }
            self.interrupt(Interruption::Landmarks, &mut measured, now_ms);
            return self.report(Some((frame, measured)), now_ms);
        };

        self.announce_side(selection.triplet(), &mut measured, now_ms);

        let confidence = selection.confidence_percent();
        let smoothed = self.context.smoother.apply(selection.angle);
        self.metrics.record_sample(smoothed, confidence);
        measured.confidence = Some(confidence);
        measured.smoothed = Some(smoothed);

        let confident = confidence >= self.gate.threshold_percent();
        if confident || profile.is_hold() {
            self.restore(&mut measured);
        }

        match &profile.mode {
            ExerciseMode::Reps(_) => {
                self.track_reps(smoothed, confidence, &mut measured, now_ms);
                if !confident {
                    self.interrupt(Interruption::Confidence, &mut measured, now_ms);
                }
            }
            ExerciseMode::Hold(_) => {
                self.track_hold(frame, &profile, selection.triplet(), &mut measured, now_ms);
            }
        }

        let rules = RuleContext {
            frame,
            gate: &self.gate,
            sides: &profile.sides,
            angle: smoothed,
            phase: self.context.motion.phase(),
        };
        if let Some(notes) = profile.form.evaluate(&rules) {
            self.context.board.replace(notes, now_ms);
        }

        measured.selection = Some(selection);
        self.report(Some((frame, measured)), now_ms)
    }

    fn announce_side(&mut self, triplet: JointTriplet, measured: &mut Measured, now_ms: f64) {
        let Some(switch) = self.context.selector.note_active(triplet, now_ms) else {
            return;
        };
        let side = switch.to.body_side();
        log::debug!("side switch {} -> {}", switch.from, switch.to);
        if switch.announce {
            let text = format!("Tracking your {} for a clearer view.", side.describe());
            self.context.board.push(FeedbackNote::info(text), true, now_ms);
        }
        measured.events.push(CoachEvent::SideSwitched {
            side,
            joints: switch.to.to_string(),
        });
    }

    fn track_reps(&mut self, angle: f32, confidence: f32, measured: &mut Measured, now_ms: f64) {
        let min_confidence = self.gate.threshold_percent();
        let Motion::Reps { rules, tracker } = &mut self.context.motion else {
            return;
        };
        let tracker =
            tracker.get_or_insert_with(|| RepTracker::new(*rules, min_confidence, angle, now_ms));
        let event = tracker.update(FrameSample {
            angle,
            confidence_percent: confidence,
            now_ms,
        });
        let phase = tracker.phase();

        match event {
            Some(RepEvent::Counted { duration_ms, range }) => {
                self.context.rep_count += 1;
                let count = self.context.rep_count;
                log::info!(
                    "rep {} counted ({:.0} ms, {:.0}° range)",
                    count,
                    duration_ms,
                    range
                );
                self.context
                    .board
                    .push(FeedbackNote::good(REP_COMPLETED), true, now_ms);
                measured.events.push(CoachEvent::RepCompleted {
                    count,
                    duration_ms,
                    range,
                });
            }
            Some(RepEvent::Rejected {
                reason,
                duration_ms,
                range,
            }) => {
                log::debug!(
                    "rep rejected: {:?} ({:.0} ms, {:.0}° range)",
                    reason,
                    duration_ms,
                    range
                );
                self.context
                    .board
                    .push(FeedbackNote::warning(reason.message()), false, now_ms);
                measured.events.push(CoachEvent::RepRejected { reason });
            }
            None => {}
        }

        self.context.stage = self.stage_label(phase);
    }

    fn track_hold(
        &mut self,
        frame: &LandmarkFrame,
        profile: &ExerciseProfile,
        triplet: JointTriplet,
        measured: &mut Measured,
        now_ms: f64,
    ) {
        let fps = self.fps.fps_or(self.config.fallback_fps);
        let Motion::Hold { timer, seconds } = &mut self.context.motion else {
            return;
        };
        let board = &mut self.context.board;
        let name = &profile.name;

        let Some(angle) = body_line_angle(&self.gate, frame, triplet) else {
            let text = format!("Cannot track {} - adjust position", name.to_lowercase());
            board.push(FeedbackNote::warning(text), false, now_ms);
            return;
        };

        let update = timer.update(angle, fps);
        *seconds = update.seconds;
        self.context.stage = if update.aligned {
            STAGE_HOLDING
        } else {
            STAGE_NOT_ALIGNED
        }
        .to_string();

        let steady = FeedbackNote::good(format!("{} hold looks steady.", name));
        match update.event {
            Some(HoldEvent::TargetReached) => {
                log::info!("{} hold reached {}s", name, update.seconds);
                board.push(steady, true, now_ms);
                measured.events.push(CoachEvent::HoldTargetReached {
                    seconds: update.seconds,
                });
            }
            Some(HoldEvent::Steady) => {
                board.push(steady, false, now_ms);
            }
            Some(HoldEvent::Ended { seconds: held }) => {
                log::debug!("{} hold ended after {}s", name, held);
                board.push(
                    FeedbackNote::warning(format!("{} held for {}s", name, held)),
                    false,
                    now_ms,
                );
                measured.events.push(CoachEvent::HoldEnded { seconds: held });
            }
            None => {}
        }
        if !update.aligned {
            board.push(FeedbackNote::warning(STRAIGHTEN), false, now_ms);
        }
    }

    /// Fold an unmeasurable frame into a visibility pause
    fn interrupt(&mut self, cause: Interruption, measured: &mut Measured, now_ms: f64) {
        let context = &mut self.context;
        context.lost_frames += 1;
        if context.lost_frames % self.config.visibility_warning_frames == 0 {
            context
                .board
                .push(FeedbackNote::warning(JOINT_NOT_VISIBLE), false, now_ms);
        }
        if !context.interrupted {
            context.interrupted = true;
            log::debug!("tracking interrupted: {:?}", cause);
            measured.events.push(CoachEvent::VisibilityLost);
        }
        context.selector.interrupt();
        context.motion.interrupt();
        context.stage = STAGE_ADJUST.to_string();
        measured.status = match cause {
            Interruption::Confidence => TrackingStatus::LowVisibility,
            Interruption::NoPose | Interruption::Landmarks => TrackingStatus::OutOfView,
        };
    }

    fn restore(&mut self, measured: &mut Measured) {
        self.context.lost_frames = 0;
        if self.context.interrupted {
            self.context.interrupted = false;
            log::debug!("tracking restored");
            measured.events.push(CoachEvent::VisibilityRestored);
        }
    }

    fn stage_label(&self, phase: Phase) -> String {
        let labels = &self.context.profile.labels;
        match phase {
            Phase::Top => labels.top.clone(),
            Phase::Bottom => labels.bottom.clone(),
            Phase::Mid => STAGE_READY.to_string(),
            Phase::VisibilityPause => STAGE_ADJUST.to_string(),
        }
    }

    fn report(&self, frame: Option<(&LandmarkFrame, Measured)>, now_ms: f64) -> FrameReport {
        let elapsed_ms = self.start_ms.map_or(0.0, |start| (now_ms - start).max(0.0));
        let status = if !self.running {
            TrackingStatus::Idle
        } else if self.paused {
            TrackingStatus::Paused
        } else {
            frame.as_ref().map_or(TrackingStatus::Idle, |(_, m)| m.status)
        };

        let (regions, measured) = match frame {
            Some((frame, measured)) => (
                regional_confidence(frame, self.gate.threshold_percent()),
                Some(measured),
            ),
            None => (Vec::new(), None),
        };
        let (raw_angle, smoothed_angle, confidence_percent, side, events) = match measured {
            Some(m) => (
                m.selection.as_ref().map(|s| s.angle),
                m.smoothed,
                m.confidence,
                m.selection.as_ref().map(|s| s.triplet().body_side()),
                m.events,
            ),
            None => (None, None, None, None, Vec::new()),
        };

        FrameReport {
            raw_angle,
            smoothed_angle,
            confidence_percent,
            confidence_tier: confidence_percent.map(ConfidenceTier::from_percent),
            stage: self.context.stage.clone(),
            phase: self.context.motion.phase(),
            rep_count: self.context.rep_count,
            hold_seconds: self.context.motion.hold_seconds(),
            elapsed_ms,
            elapsed: format_elapsed(elapsed_ms),
            side,
            status,
            fps: self.fps.fps(),
            regions,
            feedback: self.context.board.messages(),
            events,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    fn is_active(&self) -> bool {
        self.running && !self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn rep_count(&self) -> u32 {
        self.context.rep_count
    }

    pub fn exercise(&self) -> &str {
        &self.exercise
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.context.profile
    }

    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn feedback(&self) -> Vec<FeedbackMessage> {
        self.context.board.messages()
    }

    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LandmarkPoint;

    const FRAME_MS: f64 = 100.0;

    fn coach_on(exercise: &str) -> Coach {
        let mut coach = Coach::with_defaults().unwrap();
        coach.select_exercise(exercise, 0.0).unwrap();
        coach.start(0.0);
        coach
    }

    /// Left arm with the elbow at `angle` degrees, in the image plane
    fn arm_frame(angle: f32, visibility: f32) -> LandmarkFrame {
        let radians = angle.to_radians();
        let mut frame = LandmarkFrame::empty();
        frame.set(11, Some(LandmarkPoint::new(0.5, 0.2, visibility)));
        frame.set(13, Some(LandmarkPoint::new(0.5, 0.5, visibility)));
        frame.set(
            15,
            Some(LandmarkPoint::new(
                0.5 + 0.3 * radians.sin(),
                0.5 - 0.3 * radians.cos(),
                visibility,
            )),
        );
        frame
    }

    fn plank_frame(hip_drop: f32) -> LandmarkFrame {
        let mut frame = LandmarkFrame::empty();
        frame.set(11, Some(LandmarkPoint::new(0.2, 0.5, 0.9)));
        frame.set(23, Some(LandmarkPoint::new(0.5, 0.5 + hip_drop, 0.9)));
        frame.set(27, Some(LandmarkPoint::new(0.8, 0.5, 0.9)));
        frame
    }

    struct Run {
        coach: Coach,
        now_ms: f64,
        events: Vec<CoachEvent>,
        last: Option<FrameReport>,
    }

    impl Run {
        fn new(exercise: &str) -> Self {
            Self {
                coach: coach_on(exercise),
                now_ms: 0.0,
                events: Vec::new(),
                last: None,
            }
        }

        fn feed(&mut self, frame: &LandmarkFrame, frames: usize) {
            for _ in 0..frames {
                self.now_ms += FRAME_MS;
                let report = self.coach.process_frame(frame, self.now_ms);
                self.events.extend(report.events.iter().cloned());
                self.last = Some(report);
            }
        }

        fn last(&self) -> &FrameReport {
            self.last.as_ref().unwrap()
        }
    }

    #[test]
    fn test_arm_frame_angle() {
        let mut coach = coach_on("bicep_curl");
        let report = coach.process_frame(&arm_frame(160.0, 0.9), 10.0);
        assert!((report.raw_angle.unwrap() - 160.0).abs() < 0.01);
        assert_eq!(report.confidence_percent, Some(90.0));
        assert_eq!(report.confidence_tier, Some(ConfidenceTier::High));
        assert_eq!(report.side, Some(BodySide::Left));
        assert_eq!(report.status, TrackingStatus::Tracking);
    }

    #[test]
    fn test_curl_cycle_counts_rep() {
        let mut run = Run::new("bicep_curl");
        run.feed(&arm_frame(165.0, 0.9), 12);
        assert_eq!(run.last().stage, "TOP");
        run.feed(&arm_frame(40.0, 0.9), 15);
        assert_eq!(run.last().stage, "BOTTOM");
        run.feed(&arm_frame(165.0, 0.9), 15);

        assert_eq!(run.coach.rep_count(), 1);
        assert!(run
            .events
            .iter()
            .any(|e| matches!(e, CoachEvent::RepCompleted { count: 1, .. })));
    }

    #[test]
    fn test_no_pose_and_recovery() {
        let mut run = Run::new("bicep_curl");
        run.feed(&arm_frame(165.0, 0.9), 3);
        run.feed(&LandmarkFrame::empty(), 1);
        assert_eq!(run.last().status, TrackingStatus::OutOfView);
        assert_eq!(run.last().stage, "Adjust");
        assert_eq!(run.last().raw_angle, None);
        assert!(run.last().events.contains(&CoachEvent::VisibilityLost));

        run.feed(&arm_frame(165.0, 0.9), 1);
        assert!(run.last().events.contains(&CoachEvent::VisibilityRestored));
        assert_eq!(run.last().phase, Some(Phase::Top));
    }

    #[test]
    fn test_visibility_warning_every_eighteenth_frame() {
        let mut run = Run::new("bicep_curl");
        let mut hidden = arm_frame(90.0, 0.3);
        hidden.set(0, Some(LandmarkPoint::new(0.5, 0.1, 0.9)));
        run.feed(&hidden, 17);
        assert!(!run
            .last()
            .feedback
            .iter()
            .any(|m| m.text == JOINT_NOT_VISIBLE));
        run.feed(&hidden, 1);
        assert!(run
            .last()
            .feedback
            .iter()
            .any(|m| m.text == JOINT_NOT_VISIBLE));
    }

    #[test]
    fn test_side_switch_notice() {
        let mut run = Run::new("bicep_curl");
        run.feed(&arm_frame(165.0, 0.9), 2);

        let mut right = LandmarkFrame::empty();
        right.set(12, Some(LandmarkPoint::new(0.5, 0.2, 0.9)));
        right.set(14, Some(LandmarkPoint::new(0.5, 0.5, 0.9)));
        right.set(16, Some(LandmarkPoint::new(0.5, 0.8, 0.9)));
        run.feed(&right, 1);

        assert!(run
            .last()
            .events
            .iter()
            .any(|e| matches!(e, CoachEvent::SideSwitched { side: BodySide::Right, .. })));
        assert!(run
            .last()
            .feedback
            .iter()
            .any(|m| m.text == "Tracking your right side for a clearer view."));
    }

    #[test]
    fn test_plank_hold() {
        // 100 ms frames measure 10 fps once the first window closes
        let mut run = Run::new("plank");
        run.feed(&plank_frame(0.0), 50);
        assert_eq!(run.last().stage, STAGE_HOLDING);
        assert_eq!(run.last().hold_seconds, Some(5));
        assert!(run
            .events
            .iter()
            .any(|e| matches!(e, CoachEvent::HoldTargetReached { seconds: 5 })));

        run.feed(&plank_frame(0.2), 1);
        assert_eq!(run.last().stage, STAGE_NOT_ALIGNED);
        assert!(run
            .last()
            .events
            .contains(&CoachEvent::HoldEnded { seconds: 5 }));
        let texts: Vec<&str> = run.last().feedback.iter().map(|m| m.text.as_str()).collect();
        assert!(texts.contains(&"Plank held for 5s"));
        assert!(texts.contains(&STRAIGHTEN));
    }

    #[test]
    fn test_plank_lost_tracking_message() {
        let mut run = Run::new("plank");
        let mut frame = plank_frame(0.0);
        frame.set(27, None);
        run.feed(&frame, 1);
        assert!(run
            .last()
            .feedback
            .iter()
            .any(|m| m.text == "Cannot track plank - adjust position"));
    }

    #[test]
    fn test_paused_frames_are_ignored() {
        let mut run = Run::new("bicep_curl");
        run.coach.pause();
        run.feed(&arm_frame(165.0, 0.9), 3);
        assert_eq!(run.last().status, TrackingStatus::Paused);
        assert_eq!(run.last().raw_angle, None);
        run.coach.resume();
        run.feed(&arm_frame(165.0, 0.9), 1);
        assert_eq!(run.last().status, TrackingStatus::Tracking);
    }

    #[test]
    fn test_idle_before_start() {
        let mut coach = Coach::with_defaults().unwrap();
        let report = coach.process_frame(&arm_frame(165.0, 0.9), 0.0);
        assert_eq!(report.status, TrackingStatus::Idle);
        assert_eq!(report.elapsed, "00:00");
    }

    #[test]
    fn test_stop_returns_summary_once() {
        let mut run = Run::new("bicep_curl");
        run.feed(&arm_frame(100.0, 0.9), 10);
        let summary = run.coach.stop(65_000.0).unwrap();
        assert_eq!(summary.reps, 0);
        assert_eq!(summary.duration, "01:05");
        assert!((summary.avg_angle.unwrap() - 100.0).abs() < 0.01);
        assert_eq!(summary.avg_quality, Some(90.0));
        assert!(run.coach.stop(70_000.0).is_none());
        assert_eq!(run.coach.last_summary(), Some(&summary));
    }

    #[test]
    fn test_unknown_exercise() {
        let mut coach = Coach::with_defaults().unwrap();
        assert!(matches!(
            coach.select_exercise("jumping_jacks", 0.0),
            Err(CoachError::UnknownExercise(_))
        ));
        assert_eq!(coach.exercise(), "bicep_curl");
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut run = Run::new("bicep_curl");
        run.feed(&arm_frame(165.0, 0.9), 12);
        run.feed(&arm_frame(40.0, 0.9), 15);
        run.feed(&arm_frame(165.0, 0.9), 15);
        assert_eq!(run.coach.rep_count(), 1);

        run.coach.reset(run.now_ms);
        assert_eq!(run.coach.rep_count(), 0);
        assert!(run.coach.feedback().is_empty());
        assert!(run.coach.is_running());
    }

    #[test]
    fn test_elapsed_clock() {
        let mut run = Run::new("bicep_curl");
        run.feed(&arm_frame(165.0, 0.9), 25);
        assert_eq!(run.last().elapsed_ms, 2500.0);
        assert_eq!(run.last().elapsed, "00:02");
    }

    #[test]
    fn test_low_confidence_pauses_reps() {
        // Joints clear a 0.604 gate but the rounded score lands on 60%
        let config = CoachConfig {
            min_visibility: 0.604,
            ..CoachConfig::default()
        };
        let mut coach = Coach::new(config, ExerciseCatalog::builtin()).unwrap();
        coach.start(0.0);
        coach.process_frame(&arm_frame(165.0, 0.9), 100.0);

        let report = coach.process_frame(&arm_frame(165.0, 0.6049), 200.0);
        assert_eq!(report.status, TrackingStatus::LowVisibility);
        assert_eq!(report.confidence_percent, Some(60.0));
        assert_eq!(report.confidence_tier, Some(ConfidenceTier::Medium));
        assert!(report.raw_angle.is_some());
        assert_eq!(report.stage, STAGE_ADJUST);
        assert_eq!(report.phase, Some(Phase::VisibilityPause));
        assert!(report.events.contains(&CoachEvent::VisibilityLost));

        let report = coach.process_frame(&arm_frame(165.0, 0.9), 300.0);
        assert_eq!(report.status, TrackingStatus::Tracking);
        assert!(report.events.contains(&CoachEvent::VisibilityRestored));
    }

    #[test]
    fn test_rejects_catalog_with_unreachable_rep_window() {
        let json = r#"{"slow_curl": {"name": "Slow curl", "sides": [[11, 13, 15]],
            "mode": {"type": "reps", "upThreshold": 160, "downThreshold": 50,
                     "minDurationMs": 12000}}}"#;
        let catalog = ExerciseCatalog::from_json(json).unwrap();
        assert!(matches!(
            Coach::new(CoachConfig::default(), catalog),
            Err(CoachError::InvalidProfile { .. })
        ));
    }

    #[test]
    fn test_active_profile_follows_selection() {
        let mut coach = Coach::with_defaults().unwrap();
        assert_eq!(coach.profile().name, "Bicep Curl");
        coach.select_exercise("plank", 0.0).unwrap();
        assert!(coach.profile().is_hold());
        coach.start(0.0);
        let report = coach.process_frame(&plank_frame(0.0), 100.0);
        assert_eq!(report.hold_seconds, Some(0));
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::from_percent(80.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_percent(79.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_percent(60.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_percent(59.0), ConfidenceTier::Low);
    }
}
