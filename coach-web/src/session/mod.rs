//! Session lifecycle and per-frame processing

pub mod coach;
pub mod fps;
pub mod metrics;

pub use coach::{Coach, CoachEvent, ConfidenceTier, FrameReport, TrackingStatus};
pub use fps::FrameRateMeter;
pub use metrics::{format_elapsed, SessionMetrics, SessionSummary};
