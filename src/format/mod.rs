//! Response-formatting pipeline
//!
//! Raw response string → structurer splits and classifies lines → the
//! detector/converter rewrites informal math into LaTeX → the segment
//! scanner tokenizes each line into plain/formula spans → the caller renders
//! the resulting node sequence. Pure and synchronous throughout; every input
//! terminates in a renderable node tree.

mod convert;
mod segment;
mod structure;

pub use convert::{convert_expression, convert_math_line, looks_mathematical};
pub use segment::{segment_line, Segment};
pub use structure::{DisplayNode, StepBlock, StructureMode};

use crate::typeset::Typesetter;

/// Formatting configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    pub mode: StructureMode,
}

impl FormatOptions {
    pub fn flat() -> Self {
        FormatOptions {
            mode: StructureMode::Flat,
        }
    }

    pub fn stepwise() -> Self {
        FormatOptions {
            mode: StructureMode::Stepwise,
        }
    }
}

/// Convert and tokenize a single line of text.
///
/// Shorthand for [`convert_math_line`] followed by [`segment_line`]; exposed
/// for callers that render line fragments outside a full response.
pub fn render_line(text: &str, typesetter: &dyn Typesetter) -> Vec<Segment> {
    segment_line(&convert_math_line(text), typesetter)
}

/// Format a complete model response into an ordered sequence of display
/// nodes under the configured structuring policy.
pub fn format_response(
    response: &str,
    options: &FormatOptions,
    typesetter: &dyn Typesetter,
) -> Vec<DisplayNode> {
    match options.mode {
        StructureMode::Flat => structure::structure_flat(response, typesetter),
        StructureMode::Stepwise => structure::structure_stepwise(response, typesetter),
    }
}
