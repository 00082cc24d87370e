//! Repetition state machine
//!
//! Phases:
//! - `Top` / `Bottom`: confirmed position in the cycle
//! - `Mid`: start angle fell between the bands, resolved on the next
//!   confident frame
//! - `VisibilityPause`: confidence dropped; all transition credit is lost
//!
//! A move to the other band counts only after the angle stays there for
//! `transition_frames` consecutive frames. Closing `Bottom → Top` validates
//! the cycle against the duration window and the minimum range. A cycle
//! stuck in `Bottom` past the maximum duration is abandoned.

use serde::{Deserialize, Serialize};

use crate::config::{CoachConfig, RepProfile};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Top,
    Bottom,
    Mid,
    VisibilityPause,
}

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Angle bands. `top` is always ≥ `bottom` after normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub top: f32,
    pub bottom: f32,
}

/// Half-width of the band used when a profile's bands overlap
const RECENTER_HALF_WIDTH: f32 = 5.0;

impl Thresholds {
    /// `top = min(180, up + upBuffer)`, `bottom = max(0, down - downBuffer)`.
    /// Overlapping or touching bands are recentred on their midpoint ±5°.
    pub fn from_profile(profile: &RepProfile) -> Self {
        let mut top = (profile.up_threshold + profile.up_buffer).min(180.0);
        let mut bottom = (profile.down_threshold - profile.down_buffer).max(0.0);
        if bottom >= top {
            let midpoint = (bottom + top) / 2.0;
            bottom = (midpoint - RECENTER_HALF_WIDTH).max(0.0);
            top = (midpoint + RECENTER_HALF_WIDTH).min(180.0);
        }
        Self { top, bottom }
    }

    pub fn at_top(&self, angle: f32) -> bool {
        angle >= self.top
    }

    pub fn at_bottom(&self, angle: f32) -> bool {
        angle <= self.bottom
    }

    /// Phase implied by the instantaneous angle
    pub fn resolve(&self, angle: f32) -> Phase {
        if self.at_bottom(angle) {
            Phase::Bottom
        } else {
            Phase::Top
        }
    }

    fn initial(&self, angle: f32) -> Phase {
        if self.at_bottom(angle) {
            Phase::Bottom
        } else if angle < self.top {
            Phase::Mid
        } else {
            Phase::Top
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Effective validation rules: profile values with config fallbacks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepRules {
    pub thresholds: Thresholds,
    pub transition_frames: u32,
    pub min_range: f32,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
}

impl RepRules {
    pub fn new(profile: &RepProfile, config: &CoachConfig) -> Self {
        let min_frames = profile
            .min_frames
            .filter(|f| *f > 0)
            .unwrap_or(config.default_min_frames);
        Self {
            thresholds: Thresholds::from_profile(profile),
            transition_frames: Self::transition_requirement(min_frames),
            min_range: profile
                .min_range
                .filter(|r| *r > 0.0)
                .unwrap_or(config.default_min_range),
            min_duration_ms: profile
                .min_duration_ms
                .filter(|d| *d > 0.0)
                .unwrap_or(config.default_min_duration_ms),
            max_duration_ms: profile
                .max_duration_ms
                .filter(|d| *d > 0.0)
                .unwrap_or(config.default_max_duration_ms),
        }
    }

    /// Debounce window: half of `min_frames`, kept within 5..=8
    pub fn transition_requirement(min_frames: u32) -> u32 {
        (min_frames / 2).clamp(5, 8)
    }
}

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Peak minus valley below the minimum range
    TooShallow,
    /// Cycle shorter than the minimum duration
    TooFast,
    /// Cycle longer than the maximum duration
    TimedOut,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::TooShallow => "Angle not deep enough for rep.",
            RejectReason::TooFast => "Movement too fast to count. Slow down slightly.",
            RejectReason::TimedOut => "Rep timed out - reset and try again.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RepEvent {
    Counted {
        duration_ms: f64,
        range: f32,
    },
    Rejected {
        reason: RejectReason,
        duration_ms: f64,
        range: f32,
    },
}

/// Per-frame tracker input
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSample {
    /// Smoothed angle in degrees
    pub angle: f32,
    pub confidence_percent: f32,
    pub now_ms: f64,
}

// ============================================================================
// TRACKER
// ============================================================================

#[derive(Clone, Debug)]
pub struct RepTracker {
    rules: RepRules,
    /// Frames under this confidence pause the tracker
    min_confidence_percent: f32,
    phase: Phase,
    transition_frames: u32,
    frames_in_phase: u32,
    cycle_start_ms: f64,
    peak: f32,
    valley: f32,
    last_rep_ms: Option<f64>,
}

impl RepTracker {
    /// Start tracking from the first measured angle of a session
    pub fn new(rules: RepRules, min_confidence_percent: f32, angle: f32, now_ms: f64) -> Self {
        Self {
            phase: rules.thresholds.initial(angle),
            rules,
            min_confidence_percent,
            transition_frames: 0,
            frames_in_phase: 0,
            cycle_start_ms: now_ms,
            peak: angle,
            valley: angle,
            last_rep_ms: None,
        }
    }

    /// Advance by one frame
    pub fn update(&mut self, sample: FrameSample) -> Option<RepEvent> {
        let FrameSample {
            angle,
            confidence_percent,
            now_ms,
        } = sample;

        if confidence_percent < self.min_confidence_percent {
            self.interrupt();
            return None;
        }

        if matches!(self.phase, Phase::VisibilityPause | Phase::Mid) {
            let resumed = self.rules.thresholds.resolve(angle);
            self.restart_cycle(resumed, angle, now_ms);
            log::trace!("rep tracker resumed in {:?} at {:.1}°", resumed, angle);
        }

        self.frames_in_phase += 1;
        self.peak = self.peak.max(angle);
        self.valley = self.valley.min(angle);

        let thresholds = self.rules.thresholds;
        match self.phase {
            Phase::Top => {
                if self.confirm(thresholds.at_bottom(angle)) {
                    self.restart_cycle(Phase::Bottom, angle, now_ms);
                    log::trace!("rep tracker entered bottom at {:.1}°", angle);
                }
                None
            }
            Phase::Bottom => {
                let elapsed = now_ms - self.cycle_start_ms;
                if elapsed > self.rules.max_duration_ms {
                    let range = self.peak - self.valley;
                    self.restart_cycle(Phase::Top, angle, now_ms);
                    return Some(RepEvent::Rejected {
                        reason: RejectReason::TimedOut,
                        duration_ms: elapsed,
                        range,
                    });
                }
                if self.confirm(thresholds.at_top(angle)) {
                    Some(self.close_cycle(angle, now_ms))
                } else {
                    None
                }
            }
            Phase::Mid | Phase::VisibilityPause => None,
        }
    }

    /// Drop into the pause phase. No transition credit survives.
    pub fn interrupt(&mut self) {
        self.phase = Phase::VisibilityPause;
        self.transition_frames = 0;
        self.frames_in_phase = 0;
    }

    /// Accrue credit while `candidate` holds; true once it is confirmed
    fn confirm(&mut self, candidate: bool) -> bool {
        if !candidate {
            self.transition_frames = 0;
            return false;
        }
        self.transition_frames += 1;
        self.transition_frames >= self.rules.transition_frames
    }

    fn close_cycle(&mut self, angle: f32, now_ms: f64) -> RepEvent {
        let duration_ms = now_ms - self.cycle_start_ms;
        let range = self.peak - self.valley;
        let rules = &self.rules;

        let event = if range < rules.min_range {
            RepEvent::Rejected {
                reason: RejectReason::TooShallow,
                duration_ms,
                range,
            }
        } else if duration_ms < rules.min_duration_ms {
            RepEvent::Rejected {
                reason: RejectReason::TooFast,
                duration_ms,
                range,
            }
        } else if duration_ms > rules.max_duration_ms {
            RepEvent::Rejected {
                reason: RejectReason::TimedOut,
                duration_ms,
                range,
            }
        } else {
            RepEvent::Counted { duration_ms, range }
        };

        self.last_rep_ms = Some(now_ms);
        self.restart_cycle(Phase::Top, angle, now_ms);
        event
    }

    fn restart_cycle(&mut self, phase: Phase, angle: f32, now_ms: f64) {
        self.phase = phase;
        self.transition_frames = 0;
        self.frames_in_phase = 0;
        self.cycle_start_ms = now_ms;
        self.peak = angle;
        self.valley = angle;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rules(&self) -> &RepRules {
        &self.rules
    }

    pub fn frames_in_phase(&self) -> u32 {
        self.frames_in_phase
    }

    pub fn transition_frames(&self) -> u32 {
        self.transition_frames
    }

    pub fn last_rep_ms(&self) -> Option<f64> {
        self.last_rep_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curl_profile() -> RepProfile {
        RepProfile {
            up_threshold: 60.0,
            down_threshold: 140.0,
            up_buffer: 10.0,
            down_buffer: 20.0,
            min_frames: Some(15),
            min_range: Some(50.0),
            min_duration_ms: Some(400.0),
            max_duration_ms: Some(8000.0),
        }
    }

    /// Drives a tracker with a fixed frame interval
    struct Driver {
        tracker: RepTracker,
        now_ms: f64,
        step_ms: f64,
        counted: u32,
        events: Vec<RepEvent>,
    }

    impl Driver {
        fn new(profile: &RepProfile, step_ms: f64, first_angle: f32) -> Self {
            let rules = RepRules::new(profile, &CoachConfig::default());
            Self {
                tracker: RepTracker::new(rules, 60.0, first_angle, 0.0),
                now_ms: 0.0,
                step_ms,
                counted: 0,
                events: Vec::new(),
            }
        }

        fn feed(&mut self, angle: f32, frames: usize) {
            self.feed_with_confidence(angle, 90.0, frames);
        }

        fn feed_with_confidence(&mut self, angle: f32, confidence: f32, frames: usize) {
            for _ in 0..frames {
                let event = self.tracker.update(FrameSample {
                    angle,
                    confidence_percent: confidence,
                    now_ms: self.now_ms,
                });
                if let Some(event) = event {
                    if matches!(event, RepEvent::Counted { .. }) {
                        self.counted += 1;
                    }
                    self.events.push(event);
                }
                self.now_ms += self.step_ms;
            }
        }

        fn rejections(&self) -> Vec<RejectReason> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    RepEvent::Rejected { reason, .. } => Some(*reason),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn test_thresholds_plain() {
        let profile = RepProfile {
            up_threshold: 150.0,
            down_threshold: 110.0,
            up_buffer: 10.0,
            down_buffer: 10.0,
            min_frames: None,
            min_range: None,
            min_duration_ms: None,
            max_duration_ms: None,
        };
        let t = Thresholds::from_profile(&profile);
        assert_eq!(t, Thresholds { top: 160.0, bottom: 100.0 });
    }

    #[test]
    fn test_thresholds_inverted_are_recentred() {
        // top = 70, bottom = 120 overlap; midpoint 95
        let t = Thresholds::from_profile(&curl_profile());
        assert_eq!(t, Thresholds { top: 100.0, bottom: 90.0 });
        assert!(t.top >= t.bottom);
    }

    #[test]
    fn test_touching_bands_are_recentred() {
        let profile = RepProfile {
            up_threshold: 100.0,
            down_threshold: 100.0,
            up_buffer: 0.0,
            down_buffer: 0.0,
            ..curl_profile()
        };
        let t = Thresholds::from_profile(&profile);
        assert_eq!(t, Thresholds { top: 105.0, bottom: 95.0 });

        let mut driver = Driver::new(&profile, 100.0, 100.0);
        driver.feed(100.0, 60);
        assert!(driver.events.is_empty());
        assert_eq!(driver.tracker.phase(), Phase::Top);
    }

    #[test]
    fn test_thresholds_clamped() {
        let mut profile = curl_profile();
        profile.up_threshold = 178.0;
        profile.down_threshold = 5.0;
        let t = Thresholds::from_profile(&profile);
        assert_eq!(t.top, 180.0);
        assert_eq!(t.bottom, 0.0);
    }

    #[test]
    fn test_transition_requirement_clamped() {
        assert_eq!(RepRules::transition_requirement(0), 5);
        assert_eq!(RepRules::transition_requirement(12), 6);
        assert_eq!(RepRules::transition_requirement(15), 7);
        assert_eq!(RepRules::transition_requirement(40), 8);
    }

    #[test]
    fn test_rules_fall_back_to_config() {
        let profile = RepProfile {
            min_frames: None,
            min_range: None,
            min_duration_ms: None,
            max_duration_ms: Some(0.0),
            ..curl_profile()
        };
        let rules = RepRules::new(&profile, &CoachConfig::default());
        assert_eq!(rules.transition_frames, 6);
        assert_eq!(rules.min_range, 40.0);
        assert_eq!(rules.min_duration_ms, 300.0);
        assert_eq!(rules.max_duration_ms, 10_000.0);
    }

    #[test]
    fn test_initial_phase() {
        let rules = RepRules::new(&curl_profile(), &CoachConfig::default());
        assert_eq!(RepTracker::new(rules, 60.0, 170.0, 0.0).phase(), Phase::Top);
        assert_eq!(RepTracker::new(rules, 60.0, 40.0, 0.0).phase(), Phase::Bottom);
        assert_eq!(RepTracker::new(rules, 60.0, 95.0, 0.0).phase(), Phase::Mid);
    }

    #[test]
    fn test_full_cycle_counts_exactly_one() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 170.0);
        driver.feed(170.0, 10);
        driver.feed(40.0, 10);
        assert_eq!(driver.tracker.phase(), Phase::Bottom);
        driver.feed(170.0, 10);
        assert_eq!(driver.counted, 1);
        assert!(driver.rejections().is_empty());
        assert_eq!(driver.tracker.phase(), Phase::Top);
        assert!(driver.tracker.last_rep_ms().is_some());
    }

    #[test]
    fn test_fast_cycle_rejected_as_too_fast() {
        let mut driver = Driver::new(&curl_profile(), 10.0, 170.0);
        driver.feed(170.0, 10);
        driver.feed(40.0, 10);
        driver.feed(170.0, 10);
        assert_eq!(driver.counted, 0);
        assert_eq!(driver.rejections(), vec![RejectReason::TooFast]);
        assert_eq!(
            RejectReason::TooFast.message(),
            "Movement too fast to count. Slow down slightly."
        );
    }

    #[test]
    fn test_shallow_cycle_rejected() {
        let profile = RepProfile {
            up_threshold: 100.0,
            down_threshold: 90.0,
            up_buffer: 0.0,
            down_buffer: 0.0,
            ..curl_profile()
        };
        let mut driver = Driver::new(&profile, 100.0, 105.0);
        driver.feed(105.0, 10);
        driver.feed(85.0, 10);
        driver.feed(105.0, 10);
        assert_eq!(driver.counted, 0);
        assert_eq!(driver.rejections(), vec![RejectReason::TooShallow]);
    }

    #[test]
    fn test_never_reaching_bottom_counts_nothing() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 170.0);
        for _ in 0..5 {
            driver.feed(170.0, 10);
            driver.feed(95.0, 10);
        }
        assert_eq!(driver.counted, 0);
        assert!(driver.events.is_empty());
        assert_eq!(driver.tracker.phase(), Phase::Top);
    }

    #[test]
    fn test_single_frame_jitter_ignored() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 170.0);
        for _ in 0..20 {
            driver.feed(170.0, 3);
            driver.feed(40.0, 1);
        }
        assert_eq!(driver.tracker.phase(), Phase::Top);
    }

    #[test]
    fn test_long_bottom_forces_top_without_rep() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 170.0);
        driver.feed(170.0, 10);
        driver.feed(40.0, 7);
        assert_eq!(driver.tracker.phase(), Phase::Bottom);
        // Watchdog fires on the 81st frame, 8.1 s after entering bottom
        driver.feed(40.0, 82);
        assert_eq!(driver.tracker.phase(), Phase::Top);
        assert_eq!(driver.counted, 0);
        assert_eq!(driver.rejections(), vec![RejectReason::TimedOut]);
    }

    #[test]
    fn test_low_confidence_pauses_and_drops_credit() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 170.0);
        driver.feed(170.0, 10);
        driver.feed(40.0, 10);
        driver.feed(170.0, 5);
        assert_eq!(driver.tracker.transition_frames(), 5);

        driver.feed_with_confidence(170.0, 40.0, 3);
        assert_eq!(driver.tracker.phase(), Phase::VisibilityPause);
        assert_eq!(driver.tracker.transition_frames(), 0);
        assert_eq!(driver.counted, 0);

        // Resumes from the current angle, not the pre-pause phase
        driver.feed(170.0, 10);
        assert_eq!(driver.tracker.phase(), Phase::Top);
        assert_eq!(driver.counted, 0);
    }

    #[test]
    fn test_resume_at_bottom_angle() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 170.0);
        driver.feed(170.0, 5);
        driver.tracker.interrupt();
        driver.feed(40.0, 1);
        assert_eq!(driver.tracker.phase(), Phase::Bottom);
        assert_eq!(driver.tracker.frames_in_phase(), 1);
    }

    #[test]
    fn test_mid_start_resolves_on_first_update() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 95.0);
        driver.feed(95.0, 1);
        assert_eq!(driver.tracker.phase(), Phase::Top);
    }

    #[test]
    fn test_two_cycles_count_two() {
        let mut driver = Driver::new(&curl_profile(), 100.0, 170.0);
        for _ in 0..2 {
            driver.feed(170.0, 10);
            driver.feed(40.0, 10);
        }
        driver.feed(170.0, 10);
        assert_eq!(driver.counted, 2);
    }
}
