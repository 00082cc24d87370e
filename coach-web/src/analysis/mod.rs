//! Per-frame pose analysis
//!
//! Pipeline for one frame:
//! 1. (optional) fuse a secondary detector's keypoints into the frame
//! 2. gate joints by visibility
//! 3. pick the angle from the usable candidate sides
//! 4. smooth it
//! 5. drive the rep tracker or the hold timer

pub mod fusion;
pub mod geometry;
pub mod history;
pub mod hold;
pub mod landmarks;
pub mod regions;
pub mod reps;
pub mod ring;
pub mod selector;
pub mod smoothing;
pub mod visibility;

pub use fusion::{LandmarkFuser, MoveNetKeypoint, SecondaryKeypoint, SecondaryPose};
pub use geometry::angle_at;
pub use hold::{HoldEvent, HoldTimer, HoldUpdate};
pub use landmarks::{LandmarkFrame, LandmarkPoint, LANDMARK_COUNT};
pub use regions::{regional_confidence, BodyRegion, RegionConfidence};
pub use reps::{FrameSample, Phase, RejectReason, RepEvent, RepRules, RepTracker, Thresholds};
pub use selector::{BilateralSelector, Selection, SideSwitch};
pub use smoothing::AngleSmoother;
pub use visibility::{is_usable, VisibilityGate};
