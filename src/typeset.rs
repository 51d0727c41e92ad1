//! Typesetting seam
//!
//! The formatting core hands formula payloads to a downstream renderer it
//! does not own. [`Typesetter`] is that boundary: implementations may reject
//! a payload with a recoverable [`TypesetError`], which the segment scanner
//! turns into plain-text degradation. The shipped implementation renders
//! LaTeX to MathML Core via `pulldown-latex`.

use std::convert::Infallible;
use std::fmt;

use pulldown_latex::config::{DisplayMode, RenderConfig};
use pulldown_latex::mathml::push_mathml;
use pulldown_latex::{Parser, Storage};

/// Rendering mode for a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    /// Renders within a text flow.
    Inline,
    /// Renders as its own visually separated element.
    Block,
}

/// Recoverable failure to typeset a formula payload.
#[derive(Debug, Clone)]
pub struct TypesetError {
    message: String,
}

impl TypesetError {
    pub fn new(message: impl Into<String>) -> Self {
        TypesetError {
            message: message.into(),
        }
    }
}

impl fmt::Display for TypesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "typeset error: {}", self.message)
    }
}

impl std::error::Error for TypesetError {}

/// A math-typesetting backend.
pub trait Typesetter {
    /// Render a formula payload, or reject it with a recoverable error.
    fn typeset(&self, formula: &str, mode: MathMode) -> Result<String, TypesetError>;
}

/// LaTeX → MathML Core renderer backed by `pulldown-latex`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathmlTypesetter;

impl Typesetter for MathmlTypesetter {
    fn typeset(&self, formula: &str, mode: MathMode) -> Result<String, TypesetError> {
        let storage = Storage::new();
        // The writer renders parse failures as <merror> elements instead of
        // failing, so collect the event stream first to surface them as
        // recoverable errors.
        let events: Result<Vec<_>, _> = Parser::new(formula, &storage).collect();
        let events = events.map_err(|err| TypesetError::new(err.to_string()))?;

        let config = RenderConfig {
            display_mode: match mode {
                MathMode::Inline => DisplayMode::Inline,
                MathMode::Block => DisplayMode::Block,
            },
            ..RenderConfig::default()
        };
        let mut mathml = String::new();
        push_mathml(&mut mathml, events.into_iter().map(Ok::<_, Infallible>), config)
            .map_err(|err| TypesetError::new(err.to_string()))?;
        Ok(mathml)
    }
}

/// Accepts every payload and echoes it back. For callers that defer
/// validation to their own rendering layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTypesetter;

impl Typesetter for PassthroughTypesetter {
    fn typeset(&self, formula: &str, _mode: MathMode) -> Result<String, TypesetError> {
        Ok(formula.to_string())
    }
}
