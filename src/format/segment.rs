//! Inline markup scanning
//!
//! Tokenizes a (possibly freshly converted) line into plain-text and formula
//! segments. Four delimiter forms are recognized: `$$…$$` block, `$…$`
//! inline (non-greedy, never crossing a line break), `\[…\]` display
//! (may cross lines) and `\(…\)` inline. Payloads the typesetter rejects
//! degrade to plain text with their delimiters intact; the scan never fails.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::typeset::{MathMode, Typesetter};

lazy_static! {
    static ref MARKUP_SPAN: Regex =
        Regex::new(r"\$\$[\s\S]*?\$\$|\$[^$\n]+?\$|\\\[[\s\S]*?\\\]|\\\(.*?\\\)").unwrap();
}

/// One typed span of a line. Ordering within a line is significant and is
/// preserved exactly as encountered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    /// Verbatim text, whitespace included.
    Text(String),
    /// Inline formula payload, delimiters stripped and interior trimmed.
    Inline(String),
    /// Block formula payload, delimiters stripped and interior trimmed.
    Block(String),
}

impl Segment {
    /// The segment's text content, ignoring the tag.
    pub fn content(&self) -> &str {
        match self {
            Segment::Text(s) | Segment::Inline(s) | Segment::Block(s) => s,
        }
    }
}

/// Scan a line left-to-right into plain/formula segments.
///
/// The typesetter is consulted once per formula span; a rejected payload
/// becomes a [`Segment::Text`] holding the original delimited text.
pub fn segment_line(text: &str, typesetter: &dyn Typesetter) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in MARKUP_SPAN.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Text(text[last..m.start()].to_string()));
        }
        let span = m.as_str();
        let (payload, mode) = strip_delimiters(span);
        match typesetter.typeset(payload, mode) {
            Ok(_) => segments.push(match mode {
                MathMode::Inline => Segment::Inline(payload.to_string()),
                MathMode::Block => Segment::Block(payload.to_string()),
            }),
            Err(_) => segments.push(Segment::Text(span.to_string())),
        }
        last = m.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }
    segments
}

/// Strip the enclosing delimiters from a matched span and pick its mode.
fn strip_delimiters(span: &str) -> (&str, MathMode) {
    if let Some(inner) = span.strip_prefix("$$").and_then(|s| s.strip_suffix("$$")) {
        return (inner.trim(), MathMode::Block);
    }
    if let Some(inner) = span.strip_prefix(r"\[").and_then(|s| s.strip_suffix(r"\]")) {
        return (inner.trim(), MathMode::Block);
    }
    if let Some(inner) = span.strip_prefix(r"\(").and_then(|s| s.strip_suffix(r"\)")) {
        return (inner.trim(), MathMode::Inline);
    }
    if let Some(inner) = span.strip_prefix('$').and_then(|s| s.strip_suffix('$')) {
        return (inner.trim(), MathMode::Inline);
    }
    (span, MathMode::Inline)
}
