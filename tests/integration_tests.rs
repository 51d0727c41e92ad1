//! Integration tests for the full response-formatting pipeline

use mathsolve::{
    convert_expression, convert_math_line, format_response, model_label, render_line,
    segment_line, DisplayNode, FormatOptions, ModelLabel, PassthroughTypesetter, Segment,
};

fn text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::content).collect()
}

// ============================================================================
// Converter properties
// ============================================================================

mod converter {
    use super::*;

    #[test]
    fn test_delimited_input_is_idempotent() {
        let cases = [
            "$x^2 + 1$",
            "$$\\frac{1}{2}$$",
            "mixed prose with \\(a+b\\) inline",
            "display \\[\\int_0^1 x \\, dx\\] form",
        ];
        for case in cases {
            assert_eq!(convert_math_line(case), case, "input: {case:?}");
        }
    }

    #[test]
    fn test_no_heuristic_match_returns_input_unchanged() {
        let cases = ["We substitute and simplify", "done", "Kết quả như sau"];
        for case in cases {
            assert_eq!(convert_math_line(case), case, "input: {case:?}");
        }
    }

    #[test]
    fn test_fraction_becomes_latex_fraction() {
        let converted = convert_math_line("1/2");
        assert!(
            converted.contains("\\frac{1}{2}"),
            "expected a fraction construct, got {converted:?}"
        );
    }

    #[test]
    fn test_exponent_parenthesized_suffix_is_braced() {
        let converted = convert_expression("x^(n-1)");
        assert_eq!(converted, "x^{(n-1)}");
    }

    #[test]
    fn test_integral_consumes_differential() {
        let converted = convert_math_line("∫x^4 dx");
        assert_eq!(converted, "$\\int x^{4} \\, dx$");
    }
}

// ============================================================================
// Segment scanner properties
// ============================================================================

mod segments {
    use super::*;

    #[test]
    fn test_concatenation_is_lossless_without_markup() {
        let line = "a sentence with no formulas at all";
        let joined = text(&segment_line(line, &PassthroughTypesetter));
        assert_eq!(joined, line);
    }

    #[test]
    fn test_malformed_delimiter_never_panics() {
        let segments = render_line("$unclosed", &PassthroughTypesetter);
        assert_eq!(segments, vec![Segment::Text("$unclosed".to_string())]);
    }

    #[test]
    fn test_converted_line_yields_formula_segments() {
        let segments = render_line("x^2 = 4", &PassthroughTypesetter);
        assert!(segments
            .iter()
            .any(|s| matches!(s, Segment::Inline(f) if f == "x^{2}")));
    }
}

// ============================================================================
// Structuring policies
// ============================================================================

mod flat_mode {
    use super::*;

    #[test]
    fn test_header_list_paragraph_in_order() {
        let nodes = format_response(
            "## Title\n- item one\nplain text",
            &FormatOptions::flat(),
            &PassthroughTypesetter,
        );
        assert_eq!(nodes.len(), 3);
        assert!(
            matches!(&nodes[0], DisplayNode::Header(s) if text(s) == "Title"),
            "got {:?}",
            nodes[0]
        );
        assert!(
            matches!(&nodes[1], DisplayNode::ListItem(s) if text(s) == "item one"),
            "got {:?}",
            nodes[1]
        );
        assert!(
            matches!(&nodes[2], DisplayNode::Paragraph(s) if text(s) == "plain text"),
            "got {:?}",
            nodes[2]
        );
    }

    #[test]
    fn test_empty_lines_become_spacers() {
        let nodes = format_response("a\n\nb", &FormatOptions::flat(), &PassthroughTypesetter);
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[1], DisplayNode::Spacer));
    }
}

mod step_mode {
    use super::*;

    #[test]
    fn test_two_steps_then_final_answer() {
        let response =
            "## Step 1: Differentiate\nx^2\n## Step 2: Simplify\ndone\nThe final answer is 5";
        let nodes = format_response(response, &FormatOptions::stepwise(), &PassthroughTypesetter);
        assert_eq!(nodes.len(), 3, "got {nodes:?}");

        let steps: Vec<_> = nodes
            .iter()
            .filter_map(|node| match node {
                DisplayNode::Step(block) => Some(block),
                _ => None,
            })
            .collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].number, "1");
        assert_eq!(steps[0].title, "Differentiate");
        assert_eq!(steps[0].body.len(), 1);
        assert_eq!(steps[1].number, "2");
        assert_eq!(steps[1].title, "Simplify");
        assert_eq!(steps[1].body.len(), 1);

        match &nodes[2] {
            DisplayNode::FinalAnswer(segments) => assert!(text(segments).contains('5')),
            other => panic!("expected a final-answer node, got {other:?}"),
        }
    }

    #[test]
    fn test_bilingual_final_answer_cue() {
        let nodes = format_response(
            "Bước 1: Tính đạo hàm\n2x\nVậy đạo hàm là 2x",
            &FormatOptions::stepwise(),
            &PassthroughTypesetter,
        );
        assert!(nodes
            .iter()
            .any(|node| matches!(node, DisplayNode::FinalAnswer(_))));
    }

    #[test]
    fn test_response_without_steps_is_all_paragraphs() {
        let nodes = format_response(
            "just one observation\nand another",
            &FormatOptions::stepwise(),
            &PassthroughTypesetter,
        );
        assert_eq!(nodes.len(), 2);
        assert!(nodes
            .iter()
            .all(|node| matches!(node, DisplayNode::Paragraph(_))));
    }
}

// ============================================================================
// Model labels
// ============================================================================

mod labels {
    use super::*;

    #[test]
    fn test_fine_tune_marker_selects_tuned_label() {
        assert_eq!(model_label("qwen2.5-math-spin-iter2"), ModelLabel::Tuned);
        assert_eq!(model_label("qwen2.5-math-base"), ModelLabel::Base);
        // Case-sensitive on purpose.
        assert_eq!(model_label("SPIN"), ModelLabel::Base);
    }
}
