//! JS-owned coach handle
//!
//! `FormCoach` wraps one `Coach`. JavaScript creates it once, feeds it a
//! frame per animation tick and renders the returned report object.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::landmarks::{decode_frame, decode_secondary};
use crate::config::{CoachConfig, ExerciseCatalog, ExerciseProfile, StageLabels};
use crate::error::CoachError;
use crate::session::Coach;

/// Milliseconds from the page's monotonic clock
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Plain JS object: `null` for `None`, maps as objects
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|err| CoachError::from(err).into())
}

fn is_missing(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

/// One entry of the exercise picker
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseListing<'a> {
    key: &'a str,
    name: &'a str,
    instructions: &'a str,
    form_cues: &'a [String],
    labels: &'a StageLabels,
    hold: bool,
}

impl<'a> ExerciseListing<'a> {
    fn new(key: &'a str, profile: &'a ExerciseProfile) -> Self {
        Self {
            key,
            name: &profile.name,
            instructions: &profile.instructions,
            form_cues: &profile.form_cues,
            labels: &profile.labels,
            hold: profile.is_hold(),
        }
    }
}

#[wasm_bindgen]
pub struct FormCoach {
    inner: Coach,
}

#[wasm_bindgen]
impl FormCoach {
    /// Built-in exercises with default tunables
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<FormCoach, JsValue> {
        Ok(Self {
            inner: Coach::with_defaults()?,
        })
    }

    /// Build from JS objects. Either argument may be `undefined` to keep
    /// the defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue, catalog: JsValue) -> Result<FormCoach, JsValue> {
        let config: CoachConfig = if is_missing(&config) {
            CoachConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(CoachError::from)?
        };
        let catalog: ExerciseCatalog = if is_missing(&catalog) {
            ExerciseCatalog::builtin()
        } else {
            serde_wasm_bindgen::from_value(catalog).map_err(CoachError::from)?
        };
        Ok(Self {
            inner: Coach::new(config, catalog)?,
        })
    }

    /// Build from JSON text. An absent catalog keeps the built-in one.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(
        config_json: &str,
        catalog_json: Option<String>,
    ) -> Result<FormCoach, JsValue> {
        let config = CoachConfig::from_json(config_json)?;
        let catalog = match catalog_json {
            Some(json) => ExerciseCatalog::from_json(&json)?,
            None => ExerciseCatalog::builtin(),
        };
        Ok(Self {
            inner: Coach::new(config, catalog)?,
        })
    }

    pub fn start(&mut self) {
        self.inner.start(now_ms());
    }

    /// Finish the session. Returns the summary, or `null` when not running.
    pub fn stop(&mut self) -> Result<JsValue, JsValue> {
        let summary = self.inner.stop(now_ms());
        to_js(&summary)
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn resume(&mut self) {
        self.inner.resume();
    }

    pub fn reset(&mut self) {
        self.inner.reset(now_ms());
    }

    #[wasm_bindgen(js_name = selectExercise)]
    pub fn select_exercise(&mut self, key: &str) -> Result<(), JsValue> {
        self.inner.select_exercise(key, now_ms())?;
        Ok(())
    }

    /// Process one frame. `landmarks` holds 4 floats per joint, `world`
    /// 3 floats per joint.
    #[wasm_bindgen(js_name = processFrame)]
    pub fn process_frame(
        &mut self,
        landmarks: &[f32],
        world: Option<Vec<f32>>,
    ) -> Result<JsValue, JsValue> {
        let frame = decode_frame(landmarks, world.as_deref())?;
        let report = self.inner.process_frame(&frame, now_ms());
        to_js(&report)
    }

    /// Process one frame after fusing MoveNet keypoints (3 floats each, in
    /// video pixels)
    #[wasm_bindgen(js_name = processFusedFrame)]
    pub fn process_fused_frame(
        &mut self,
        landmarks: &[f32],
        world: Option<Vec<f32>>,
        keypoints: &[f32],
        video_width: f32,
        video_height: f32,
    ) -> Result<JsValue, JsValue> {
        let frame = decode_frame(landmarks, world.as_deref())?;
        let secondary = decode_secondary(keypoints, video_width, video_height)?;
        let report = self.inner.process_fused_frame(&frame, &secondary, now_ms());
        to_js(&report)
    }

    /// Summary of the last finished session, or `null`
    #[wasm_bindgen(js_name = lastSummary)]
    pub fn last_summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.last_summary())
    }

    /// All exercises, for building a picker
    pub fn exercises(&self) -> Result<JsValue, JsValue> {
        let listing: Vec<ExerciseListing> = self
            .inner
            .catalog()
            .iter()
            .map(|(key, profile)| ExerciseListing::new(key, profile))
            .collect();
        to_js(&listing)
    }

    #[wasm_bindgen(getter)]
    pub fn exercise(&self) -> String {
        self.inner.exercise().to_string()
    }

    #[wasm_bindgen(getter, js_name = repCount)]
    pub fn rep_count(&self) -> u32 {
        self.inner.rep_count()
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    #[wasm_bindgen(getter, js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }
}
