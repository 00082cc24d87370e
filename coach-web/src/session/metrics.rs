//! Session metrics aggregator

use serde::Serialize;

/// Render milliseconds as `mm:ss`
pub fn format_elapsed(elapsed_ms: f64) -> String {
    let total_seconds = (elapsed_ms.max(0.0) / 1000.0).floor() as u64;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Immutable result of one finished session
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub reps: u32,
    pub duration_ms: f64,
    /// `duration_ms` as `mm:ss`
    pub duration: String,
    pub avg_angle: Option<f32>,
    /// Mean confidence percentage
    pub avg_quality: Option<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct SessionMetrics {
    angle_sum: f64,
    confidence_sum: f64,
    samples: u32,
    start_ms: Option<f64>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the sums and open a session at `now_ms`
    pub fn begin(&mut self, now_ms: f64) {
        *self = Self {
            start_ms: Some(now_ms),
            ..Self::default()
        };
    }

    pub fn is_active(&self) -> bool {
        self.start_ms.is_some()
    }

    /// Accumulate one frame. Ignored outside a session.
    pub fn record_sample(&mut self, angle: f32, confidence_percent: f32) {
        if !self.is_active() {
            return;
        }
        self.angle_sum += f64::from(angle);
        self.confidence_sum += f64::from(confidence_percent);
        self.samples += 1;
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Close the session. A second call returns `None`.
    pub fn finalize(&mut self, reps: u32, now_ms: f64) -> Option<SessionSummary> {
        let start_ms = self.start_ms.take()?;
        let duration_ms = (now_ms - start_ms).max(0.0);
        let average = |sum: f64| (self.samples > 0).then(|| (sum / f64::from(self.samples)) as f32);

        let summary = SessionSummary {
            reps,
            duration_ms,
            duration: format_elapsed(duration_ms),
            avg_angle: average(self.angle_sum),
            avg_quality: average(self.confidence_sum),
        };
        *self = Self::default();
        Some(summary)
    }
}
