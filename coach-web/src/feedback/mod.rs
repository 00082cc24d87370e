//! Coaching feedback: message types, the displayed board, form rules

pub mod board;
pub mod message;
pub mod rules;

pub use board::FeedbackBoard;
pub use message::{FeedbackMessage, FeedbackNote, Severity};
pub use rules::{FormCheck, FormChecks, RuleContext};
