//! Feedback message types

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Warning,
    Error,
    Info,
}

/// Text + severity before it is stamped onto the board
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackNote {
    pub text: String,
    pub severity: Severity,
}

impl FeedbackNote {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }

    pub fn good(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Good)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Warning)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Info)
    }
}

/// A displayed message
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackMessage {
    pub text: String,
    pub severity: Severity,
    pub timestamp_ms: f64,
}

impl FeedbackMessage {
    pub fn stamp(note: FeedbackNote, now_ms: f64) -> Self {
        Self {
            text: note.text,
            severity: note.severity,
            timestamp_ms: now_ms,
        }
    }
}
