//! Errors raised at the crate boundary
//!
//! Only configuration loading and frame decoding can fail. The per-frame
//! analysis path never returns an error.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("unknown exercise '{0}'")]
    UnknownExercise(String),

    #[error("bad landmark buffer length {actual}: want a multiple of {stride}, at most {max}")]
    FrameLength {
        actual: usize,
        stride: usize,
        max: usize,
    },

    #[error("invalid profile '{key}': {reason}")]
    InvalidProfile { key: String, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed JS value: {0}")]
    JsValue(String),
}

impl CoachError {
    pub(crate) fn profile(key: &str, reason: impl Into<String>) -> Self {
        CoachError::InvalidProfile {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for CoachError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        CoachError::JsValue(err.to_string())
    }
}

impl From<CoachError> for JsValue {
    fn from(err: CoachError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
