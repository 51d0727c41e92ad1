//! Response structuring
//!
//! Splits a full model response into display nodes. Two policies exist
//! because tutoring models answer in two registers: terse markdown
//! ([`StructureMode::Flat`]) and worked multi-step solutions
//! ([`StructureMode::Stepwise`]). The stepwise fold is explicit: an
//! accumulator holds the open step block and the emitted nodes, and a flush
//! is a no-op when no block is open.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::convert::convert_math_line;
use super::segment::{segment_line, Segment};
use crate::typeset::Typesetter;

lazy_static! {
    /// Step headers: `## Step 1: Differentiate`, `**Bước 2.** Rút gọn`,
    /// `step iv) substitute`. Case-insensitive, optional `#` prefix, arabic
    /// or roman numbering captured as a string. Bold markers are stripped
    /// before matching.
    static ref STEP_HEADER: Regex = Regex::new(
        r"(?i)^\s*(?:#{1,6}\s*)?(?:step|bước)\s*([0-9]+|[ivxlc]+)\s*[:.)\-]?\s*(.*?)\s*$"
    )
    .unwrap();

    /// Bilingual final-answer cues. Best-effort phrase matches; kept
    /// deliberately narrow rather than strengthened.
    static ref FINAL_ANSWER: Regex = Regex::new(
        r"(?i)^\s*(?:#{1,6}\s*)?(?:\*\*\s*)?(?:the\s+final\s+answer\s+is|final\s+answer|answer\s*:|vậy|đáp\s*án|đáp\s*số|kết\s+luận)"
    )
    .unwrap();

    static ref HEADER_HASHES: Regex = Regex::new(r"^#{1,3}\s*").unwrap();
    static ref BOLD_EDGES: Regex = Regex::new(r"^\*\*|\*\*$").unwrap();
    static ref LIST_PREFIX: Regex = Regex::new(r"^[-*]\s*").unwrap();
}

/// Structuring policy for [`format_response`](super::format_response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StructureMode {
    /// Every non-empty line becomes its own node; no cross-line grouping.
    Flat,
    /// Lines are grouped under step headers, with final-answer callouts.
    #[default]
    Stepwise,
}

/// A grouped unit of a multi-step explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepBlock {
    /// Step label as emitted by the model; not always numeric.
    pub number: String,
    pub title: String,
    /// Rendered content lines, in source order.
    pub body: Vec<Vec<Segment>>,
}

/// One renderable element of a formatted response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DisplayNode {
    Header(Vec<Segment>),
    ListItem(Vec<Segment>),
    Paragraph(Vec<Segment>),
    /// Vertical spacing produced by an empty source line (flat mode only).
    Spacer,
    Step(StepBlock),
    FinalAnswer(Vec<Segment>),
}

/// Per-line classification, computed for one pass and not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineClass {
    Blank,
    Header(String),
    ListItem(String),
    StepHeader { number: String, title: String },
    FinalAnswer(String),
    Plain(String),
}

/// Classify one line under the flat policy.
pub(crate) fn classify_flat(line: &str) -> LineClass {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineClass::Blank;
    }
    if trimmed.starts_with("##") || trimmed.starts_with("**") {
        let text = HEADER_HASHES.replace(trimmed, "");
        let text = BOLD_EDGES.replace_all(&text, "");
        return LineClass::Header(text.trim().to_string());
    }
    if trimmed.starts_with('-') || (trimmed.starts_with('*') && !trimmed.starts_with("**")) {
        let text = LIST_PREFIX.replace(trimmed, "");
        return LineClass::ListItem(text.trim().to_string());
    }
    LineClass::Plain(trimmed.to_string())
}

/// Classify one line under the stepwise policy.
pub(crate) fn classify_stepwise(line: &str) -> LineClass {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineClass::Blank;
    }
    let unbold = trimmed.replace("**", "");
    if let Some(caps) = STEP_HEADER.captures(unbold.trim()) {
        return LineClass::StepHeader {
            number: caps[1].to_string(),
            title: caps[2].trim().to_string(),
        };
    }
    if FINAL_ANSWER.is_match(trimmed) {
        return LineClass::FinalAnswer(trimmed.to_string());
    }
    LineClass::Plain(trimmed.to_string())
}

/// Convert and tokenize one line of text.
fn render(text: &str, typesetter: &dyn Typesetter) -> Vec<Segment> {
    segment_line(&convert_math_line(text), typesetter)
}

/// Flat policy: one node per line, no grouping.
pub(crate) fn structure_flat(response: &str, typesetter: &dyn Typesetter) -> Vec<DisplayNode> {
    response
        .lines()
        .map(|line| match classify_flat(line) {
            LineClass::Blank => DisplayNode::Spacer,
            LineClass::Header(text) => DisplayNode::Header(render(&text, typesetter)),
            LineClass::ListItem(text) => DisplayNode::ListItem(render(&text, typesetter)),
            LineClass::Plain(text) => DisplayNode::Paragraph(render(&text, typesetter)),
            // Flat classification never produces these.
            LineClass::StepHeader { title, .. } => DisplayNode::Header(render(&title, typesetter)),
            LineClass::FinalAnswer(text) => DisplayNode::Paragraph(render(&text, typesetter)),
        })
        .collect()
}

/// Accumulator for the stepwise fold.
#[derive(Debug, Default)]
struct StepFold {
    current: Option<StepBlock>,
    nodes: Vec<DisplayNode>,
}

impl StepFold {
    /// Convert the open block into a node. No-op when none is open.
    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            self.nodes.push(DisplayNode::Step(block));
        }
    }
}

/// Stepwise policy: group content lines under step headers and emit
/// distinguished final-answer nodes.
pub(crate) fn structure_stepwise(response: &str, typesetter: &dyn Typesetter) -> Vec<DisplayNode> {
    let mut fold = StepFold::default();

    for line in response.lines() {
        match classify_stepwise(line) {
            LineClass::Blank => {}
            LineClass::StepHeader { number, title } => {
                fold.flush();
                fold.current = Some(StepBlock {
                    number,
                    title,
                    body: Vec::new(),
                });
            }
            LineClass::FinalAnswer(text) => {
                fold.flush();
                fold.nodes.push(DisplayNode::FinalAnswer(render(&text, typesetter)));
            }
            LineClass::Plain(text) | LineClass::Header(text) | LineClass::ListItem(text) => {
                let rendered = render(&text, typesetter);
                match fold.current.as_mut() {
                    Some(block) => block.body.push(rendered),
                    None => fold.nodes.push(DisplayNode::Paragraph(rendered)),
                }
            }
        }
    }

    fold.flush();
    fold.nodes
}
