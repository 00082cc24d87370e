//! Feedback board - the currently displayed messages
//!
//! Two write paths:
//! - `replace`: the form rules' per-frame set overwrites the list
//! - `push`: ad hoc single messages are appended, rate-limited by exact
//!   text, and the list is capped to the newest `max_items`
//!
//! A lone "good" message carries an expiry timestamp and is dropped by
//! `tick` once it passes. Nothing here schedules a timer, so a reset can
//! never race a stale callback.

use std::collections::{HashMap, VecDeque};

use super::message::{FeedbackMessage, FeedbackNote, Severity};
use crate::config::CoachConfig;

#[derive(Clone, Debug)]
pub struct FeedbackBoard {
    messages: VecDeque<FeedbackMessage>,
    /// Message text → last time it was shown
    last_shown: HashMap<String, f64>,
    /// When set, the list is cleared at or after this time
    clear_at: Option<f64>,
    cooldown_ms: f64,
    max_items: usize,
    clear_after_ms: f64,
}

impl FeedbackBoard {
    pub fn new(cooldown_ms: f64, max_items: usize, clear_after_ms: f64) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_items + 1),
            last_shown: HashMap::new(),
            clear_at: None,
            cooldown_ms,
            max_items: max_items.max(1),
            clear_after_ms,
        }
    }

    pub fn from_config(config: &CoachConfig) -> Self {
        Self::new(
            config.feedback_cooldown_ms,
            config.max_feedback_items,
            config.feedback_clear_ms,
        )
    }

    /// Cooldown check keyed on exact text. `force` always passes and
    /// still refreshes the timestamp.
    pub fn should_display(&mut self, text: &str, force: bool, now_ms: f64) -> bool {
        if text.is_empty() {
            return false;
        }
        if !force {
            if let Some(last) = self.last_shown.get(text) {
                if now_ms - last < self.cooldown_ms {
                    return false;
                }
            }
        }
        self.last_shown.insert(text.to_string(), now_ms);
        true
    }

    /// Append one message through the rate limiter. Returns whether it was
    /// shown.
    pub fn push(&mut self, note: FeedbackNote, force: bool, now_ms: f64) -> bool {
        if !self.should_display(&note.text, force, now_ms) {
            return false;
        }
        self.messages.push_back(FeedbackMessage::stamp(note, now_ms));
        while self.messages.len() > self.max_items {
            self.messages.pop_front();
        }
        self.rearm_expiry(now_ms);
        true
    }

    /// Overwrite the list with this frame's rule output. Not rate-limited.
    pub fn replace(&mut self, notes: Vec<FeedbackNote>, now_ms: f64) {
        let notes: Vec<FeedbackNote> = notes.into_iter().filter(|n| !n.text.is_empty()).collect();
        let skip = notes.len().saturating_sub(self.max_items);
        self.messages.clear();
        self.messages.extend(
            notes
                .into_iter()
                .skip(skip)
                .map(|n| FeedbackMessage::stamp(n, now_ms)),
        );
        self.rearm_expiry(now_ms);
    }

    /// Drop an expired lone "good" message
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(at) = self.clear_at {
            if now_ms >= at {
                self.messages.clear();
                self.clear_at = None;
            }
        }
    }

    fn rearm_expiry(&mut self, now_ms: f64) {
        let lone_good = self.messages.len() == 1
            && self.messages.front().is_some_and(|m| m.severity == Severity::Good);
        self.clear_at = if lone_good {
            Some(now_ms + self.clear_after_ms)
        } else {
            None
        };
    }

    pub fn messages(&self) -> Vec<FeedbackMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forget displayed messages, cooldowns and any pending expiry
    pub fn clear(&mut self) {
        self.messages.clear();
        self.last_shown.clear();
        self.clear_at = None;
    }
}

impl Default for FeedbackBoard {
    fn default() -> Self {
        Self::from_config(&CoachConfig::default())
    }
}
