//! Model selection and display labels
//!
//! The endpoint serves two checkpoints of the same tutor model: the base
//! checkpoint and a self-play fine-tune whose identifier carries the
//! `spin` marker.

use serde::Serialize;

/// Substring of `model_used` that marks the fine-tuned checkpoint.
/// The check is case-sensitive.
pub const FINE_TUNE_MARKER: &str = "spin";

/// Which endpoint to send a problem to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ModelChoice {
    #[default]
    Base,
    FineTuned,
}

impl ModelChoice {
    /// Chat endpoint path for this choice.
    pub fn endpoint(self) -> &'static str {
        match self {
            ModelChoice::Base => "/chat/base",
            ModelChoice::FineTuned => "/chat/fine-tuned",
        }
    }
}

/// Display label resolved from the `model_used` field of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelLabel {
    Base,
    Tuned,
}

impl ModelLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelLabel::Base => "Base Model",
            ModelLabel::Tuned => "Tuned Model",
        }
    }
}

/// Resolve the display label for a reported model identifier.
pub fn model_label(model_used: &str) -> ModelLabel {
    if model_used.contains(FINE_TUNE_MARKER) {
        ModelLabel::Tuned
    } else {
        ModelLabel::Base
    }
}
