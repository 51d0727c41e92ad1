//! Mathsolve - math-solver client and response formatter
//!
//! This crate turns the free-form output of a math-tutoring language model
//! into a renderable node tree. The model emits markdown-ish prose with
//! informal mathematical notation (`x^2`, `1/2`, `∫x^4 dx`); the formatting
//! pipeline detects those substrings, rewrites them into LaTeX, splits the
//! response into structural elements (headers, list items, step blocks,
//! final-answer callouts) and tokenizes each line into plain-text and
//! formula segments ready for a typesetting backend.
//!
//! The pipeline is pure and synchronous: one response string in, one node
//! sequence out. The only asynchronous boundary is the optional `client`
//! module, which talks to the inference endpoint.

pub mod format;
pub mod model;
pub mod typeset;

#[cfg(feature = "client")]
pub mod client;

pub use format::{
    convert_expression, convert_math_line, format_response, render_line, segment_line,
    DisplayNode, FormatOptions, Segment, StepBlock, StructureMode,
};
pub use model::{model_label, ModelChoice, ModelLabel, FINE_TUNE_MARKER};
pub use typeset::{MathMode, MathmlTypesetter, PassthroughTypesetter, TypesetError, Typesetter};

#[cfg(feature = "client")]
pub use client::{ChatRequest, ChatResponse, ClientError, SolverClient};
