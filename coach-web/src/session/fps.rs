//! Frame-rate meter
//!
//! Counts processed frames in one-second windows. The value only changes
//! when a window closes.

const WINDOW_MS: f64 = 1000.0;

#[derive(Clone, Debug, Default)]
pub struct FrameRateMeter {
    window_start_ms: Option<f64>,
    frames: u32,
    fps: u32,
}

impl FrameRateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame; returns the latest closed-window rate
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        if now_ms - start >= WINDOW_MS {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start_ms = Some(now_ms);
        }
        self.fps
    }

    /// Latest measured rate, 0 until the first window closes
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn fps_or(&self, fallback: f32) -> f32 {
        if self.fps == 0 {
            fallback
        } else {
            self.fps as f32
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
