//! Coach Web - browser exercise-form coach
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules

pub mod analysis;
mod bridge;
pub mod config;
pub mod error;
pub mod feedback;
pub mod session;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen types for JS access
pub use bridge::FormCoach;
pub use bridge::{
    decode_frame, decode_landmarks, decode_secondary, decode_world, KEYPOINT_STRIDE,
    LANDMARK_STRIDE, WORLD_STRIDE,
};
pub use error::CoachError;
pub use session::{Coach, FrameReport, SessionSummary};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Route `log` output to the browser console. Accepts trace, debug, info,
/// warn or error; anything else means info.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    };
    wasm_logger::init(wasm_logger::Config::new(log_level));
    log::info!("coach-web {} logging at {}", env!("CARGO_PKG_VERSION"), log_level);
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
