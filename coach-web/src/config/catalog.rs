//! Built-in exercise catalog

use std::collections::BTreeMap;

use super::profiles::{
    ExerciseCatalog, ExerciseMode, ExerciseProfile, HoldProfile, JointTriplet, RepProfile,
    StageLabels, TripletJoint,
};
use crate::analysis::landmarks::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ANKLE,
    RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::analysis::reps::Phase;
use crate::feedback::{FeedbackNote, FormCheck, FormChecks};

const LEFT_ARM: JointTriplet = JointTriplet::new(LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST);
const RIGHT_ARM: JointTriplet = JointTriplet::new(RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST);
const LEFT_LEG: JointTriplet = JointTriplet::new(LEFT_HIP, LEFT_KNEE, LEFT_ANKLE);
const RIGHT_LEG: JointTriplet = JointTriplet::new(RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE);
const LEFT_BODY_LINE: JointTriplet = JointTriplet::new(LEFT_SHOULDER, LEFT_HIP, LEFT_ANKLE);
const RIGHT_BODY_LINE: JointTriplet = JointTriplet::new(RIGHT_SHOULDER, RIGHT_HIP, RIGHT_ANKLE);

#[allow(clippy::too_many_arguments)]
fn reps(
    up: f32,
    down: f32,
    up_buffer: f32,
    down_buffer: f32,
    min_frames: u32,
    min_range: f32,
    min_ms: f64,
    max_ms: f64,
) -> ExerciseMode {
    ExerciseMode::Reps(RepProfile {
        up_threshold: up,
        down_threshold: down,
        up_buffer,
        down_buffer,
        min_frames: Some(min_frames),
        min_range: Some(min_range),
        min_duration_ms: Some(min_ms),
        max_duration_ms: Some(max_ms),
    })
}

fn labels(top: &str, bottom: &str) -> StageLabels {
    StageLabels {
        top: top.to_string(),
        bottom: bottom.to_string(),
    }
}

fn band(above: Option<f32>, below: Option<f32>, note: FeedbackNote) -> FormCheck {
    FormCheck::AngleBand {
        above,
        below,
        phase: None,
        needs_side: false,
        note,
    }
}

fn spread(
    from: TripletJoint,
    to: TripletJoint,
    wider_than: Option<f32>,
    narrower_than: Option<f32>,
    note: FeedbackNote,
) -> FormCheck {
    FormCheck::JointSpread {
        from,
        to,
        wider_than,
        narrower_than,
        angle_below: None,
        note,
    }
}

struct Entry {
    key: &'static str,
    name: &'static str,
    instructions: &'static str,
    cues: [&'static str; 3],
    sides: Vec<JointTriplet>,
    labels: StageLabels,
    form: FormChecks,
    mode: ExerciseMode,
}

fn entries() -> Vec<Entry> {
    let arms = vec![LEFT_ARM, RIGHT_ARM];
    let legs = vec![LEFT_LEG, RIGHT_LEG];

    vec![
        Entry {
            key: "bicep_curl",
            name: "Bicep Curl",
            instructions: "Keep your back straight, curl weights to shoulders, lower with control",
            cues: ["Keep shoulders stable", "No swinging motion", "Full range of motion"],
            sides: arms.clone(),
            labels: StageLabels::default(),
            form: FormChecks::new(
                true,
                vec![
                    spread(
                        TripletJoint::Proximal,
                        TripletJoint::Vertex,
                        Some(0.15),
                        None,
                        FeedbackNote::warning("Keep your elbow anchored near your ribs."),
                    ),
                    FormCheck::JointSpread {
                        from: TripletJoint::Vertex,
                        to: TripletJoint::Distal,
                        wider_than: None,
                        narrower_than: Some(0.05),
                        angle_below: Some(30.0),
                        note: FeedbackNote::good(
                            "Strong contraction - squeeze briefly at the top.",
                        ),
                    },
                ],
            ),
            mode: reps(60.0, 140.0, 10.0, 20.0, 15, 50.0, 400.0, 8000.0),
        },
        Entry {
            key: "shoulder_press",
            name: "Shoulder Press",
            instructions: "Press overhead until arms extended, lower to shoulder level",
            cues: ["Core tight", "Elbows slightly forward", "Full extension at top"],
            sides: arms.clone(),
            labels: StageLabels::default(),
            form: FormChecks::new(
                false,
                vec![band(Some(165.0), None, FeedbackNote::good("Strong lockout overhead."))],
            ),
            mode: reps(150.0, 100.0, 10.0, 10.0, 15, 40.0, 400.0, 6000.0),
        },
        Entry {
            key: "squat",
            name: "Squat",
            instructions: "Keep back straight, lower until thighs parallel, drive through heels",
            cues: ["Knees over toes", "Back straight", "Full depth"],
            sides: legs.clone(),
            labels: labels("STANDING", "SQUAT"),
            form: FormChecks::new(
                true,
                vec![
                    band(Some(70.0), Some(90.0), FeedbackNote::good("Depth looks solid.")),
                    FormCheck::AngleBand {
                        above: Some(100.0),
                        below: None,
                        phase: Some(Phase::Bottom),
                        needs_side: false,
                        note: FeedbackNote::warning("Drop slightly lower for full range."),
                    },
                    spread(
                        TripletJoint::Vertex,
                        TripletJoint::Distal,
                        Some(0.1),
                        None,
                        FeedbackNote::warning("Keep the knee tracking over the ankle."),
                    ),
                ],
            ),
            mode: reps(150.0, 110.0, 10.0, 10.0, 20, 70.0, 500.0, 9000.0),
        },
        Entry {
            key: "pushup",
            name: "Push-up",
            instructions: "Maintain body straight line, lower chest near ground, push back up",
            cues: ["Body alignment", "Controlled descent", "Full extension"],
            sides: arms.clone(),
            labels: StageLabels::default(),
            form: FormChecks::new(
                false,
                vec![
                    FormCheck::AngleBand {
                        above: None,
                        below: Some(70.0),
                        phase: None,
                        needs_side: true,
                        note: FeedbackNote::good("Great push-up depth."),
                    },
                    FormCheck::BodyLine {
                        sides: vec![LEFT_BODY_LINE, RIGHT_BODY_LINE],
                        min_angle: 160.0,
                        sagging: FeedbackNote::warning(
                            "Lift hips slightly to keep a straight line.",
                        ),
                        aligned: Some(FeedbackNote::good("Body alignment looks good.")),
                    },
                ],
            ),
            mode: reps(150.0, 100.0, 10.0, 10.0, 15, 45.0, 400.0, 7000.0),
        },
        Entry {
            key: "pullup",
            name: "Pull-up",
            instructions: "Pull until chin over bar, lower with control to full extension",
            cues: ["No kipping", "Controlled movement", "Full range"],
            sides: arms.clone(),
            labels: StageLabels::default(),
            form: FormChecks::new(
                false,
                vec![band(None, Some(50.0), FeedbackNote::good("Chin over bar - nice!"))],
            ),
            mode: reps(70.0, 170.0, 10.0, 10.0, 20, 60.0, 500.0, 9000.0),
        },
        Entry {
            key: "deadlift",
            name: "Deadlift",
            instructions: "Keep back flat, lift with hips and legs, full upright position",
            cues: ["Flat back", "Hip drive", "Shoulders back"],
            sides: legs.clone(),
            labels: labels("STANDING", "DOWN"),
            form: FormChecks::new(
                false,
                vec![band(
                    Some(165.0),
                    None,
                    FeedbackNote::good("Finish tall with hips fully extended."),
                )],
            ),
            mode: reps(170.0, 100.0, 10.0, 10.0, 20, 60.0, 500.0, 9000.0),
        },
        Entry {
            key: "lunge",
            name: "Lunge",
            instructions: "Step through each lunge with a tall torso and drive through the lead heel.",
            cues: ["Knee tracks over ankle", "Hips stay square", "Controlled up/down tempo"],
            sides: legs,
            labels: labels("STANDING", "LUNGE"),
            form: FormChecks::new(
                true,
                vec![
                    band(
                        Some(70.0),
                        Some(100.0),
                        FeedbackNote::good("Hold the bottom briefly for balance."),
                    ),
                    spread(
                        TripletJoint::Vertex,
                        TripletJoint::Distal,
                        Some(0.12),
                        None,
                        FeedbackNote::warning("Keep the front knee stacked over the ankle."),
                    ),
                ],
            ),
            mode: reps(150.0, 110.0, 10.0, 10.0, 18, 60.0, 500.0, 9000.0),
        },
        Entry {
            key: "plank",
            name: "Plank",
            instructions: "Maintain straight body line from head to heels",
            cues: ["Head neutral", "Core engaged", "Hips level"],
            sides: vec![LEFT_BODY_LINE],
            labels: StageLabels::default(),
            form: FormChecks::default(),
            mode: ExerciseMode::Hold(HoldProfile {
                alignment_target: 180.0,
                alignment_tolerance: 10.0,
                min_hold_duration: 5,
            }),
        },
        Entry {
            key: "lat_pulldown",
            name: "Lat Pulldown",
            instructions: "Pull the bar toward the upper chest with elbows driving down, then return with control.",
            cues: [
                "Chest lifted, no leaning back",
                "Elbows track in front of body",
                "Full stretch at the top",
            ],
            sides: arms.clone(),
            labels: StageLabels::default(),
            form: FormChecks::default(),
            mode: reps(150.0, 90.0, 10.0, 10.0, 18, 50.0, 500.0, 9000.0),
        },
        Entry {
            key: "one_arm_row",
            name: "One-arm Row",
            instructions: "Hinge at the hips, pull the weight toward your hip, and lower with control.",
            cues: [
                "Back flat, neck neutral",
                "Elbow drives toward hip",
                "No twisting through the torso",
            ],
            sides: arms.clone(),
            labels: StageLabels::default(),
            form: FormChecks::default(),
            mode: reps(80.0, 150.0, 10.0, 10.0, 18, 45.0, 500.0, 8000.0),
        },
        Entry {
            key: "db_row",
            name: "Dumbbell Row",
            instructions: "Brace your core, pull the dumbbell toward your lower ribs, and lower with control.",
            cues: ["Back flat, no rounding", "Elbow close to body", "Smooth pull and lower"],
            sides: arms.clone(),
            labels: StageLabels::default(),
            form: FormChecks::default(),
            mode: reps(80.0, 150.0, 10.0, 10.0, 18, 45.0, 500.0, 8000.0),
        },
        Entry {
            key: "cable_pullover",
            name: "Cable Pullover",
            instructions: "With straight arms, sweep the cable down toward your hips, then return with a stretch.",
            cues: [
                "Ribs down, no flaring",
                "Arms stay nearly straight",
                "Movement comes from shoulders, not lower back",
            ],
            sides: arms,
            labels: StageLabels::default(),
            form: FormChecks::default(),
            mode: reps(150.0, 80.0, 10.0, 10.0, 18, 40.0, 500.0, 8000.0),
        },
    ]
}

impl ExerciseCatalog {
    /// The twelve exercises shipped with the coach
    pub fn builtin() -> Self {
        let profiles: BTreeMap<String, ExerciseProfile> = entries()
            .into_iter()
            .map(|entry| {
                let profile = ExerciseProfile {
                    name: entry.name.to_string(),
                    instructions: entry.instructions.to_string(),
                    form_cues: entry.cues.iter().map(|c| c.to_string()).collect(),
                    sides: entry.sides,
                    labels: entry.labels,
                    form: entry.form,
                    mode: entry.mode,
                };
                (entry.key.to_string(), profile)
            })
            .collect();
        Self::from_profiles(profiles)
    }
}
