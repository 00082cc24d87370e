//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod coach;
mod landmarks;

pub use coach::FormCoach;
pub use landmarks::{
    decode_frame, decode_landmarks, decode_secondary, decode_world, KEYPOINT_STRIDE,
    LANDMARK_STRIDE, WORLD_STRIDE,
};
