//! Math-expression detection and LaTeX conversion
//!
//! Model responses carry informal notation (`x^2`, `1/2`, `∫x^4 dx`) rather
//! than valid markup. This module classifies substrings as mathematical and
//! rewrites them into LaTeX, leaving prose untouched. Everything here is
//! best-effort: an unmatched or malformed expression stays plain text, and
//! no code path returns an error.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// Any recognized delimiter pair; lines that already contain one are
    /// passed through unchanged to prevent double-conversion.
    static ref DELIMITED: Regex =
        Regex::new(r"\$\$[\s\S]*?\$\$|\$[^$]+?\$|\\\[[\s\S]*?\\\]|\\\(.*?\\\)").unwrap();

    /// Surface patterns that mark a substring as mathematical. A single
    /// match suffices; there is no scoring.
    static ref MATH_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\^").unwrap(),                         // exponent
        Regex::new(r"(?i)[a-z]\d+").unwrap(),               // variable with number (x2, C1)
        Regex::new(r"\d+/\d+").unwrap(),                    // numeric fraction
        Regex::new(r"\([^)]+\)").unwrap(),                  // parenthesized group
        Regex::new(r"(?i)\d+x").unwrap(),                   // coefficient and variable
        Regex::new(r"(?i)x\^").unwrap(),                    // x^ pattern
        Regex::new(r"(?i)ln\(").unwrap(),
        Regex::new(r"(?i)log\(").unwrap(),
        Regex::new(r"(?i)sqrt\(").unwrap(),
        Regex::new(r"(?i)sin\(|cos\(|tan\(").unwrap(),
        Regex::new(r"\d+\s*[+\-*/]\s*\d+").unwrap(),        // arithmetic between numbers
        Regex::new(r"(?i)[a-z]\s*[+\-*/]\s*[a-z]").unwrap(), // arithmetic between variables
    ];

    static ref PAREN_FRACTION: Regex = Regex::new(r"\((\d+)/(\d+)\)").unwrap();
    static ref BARE_FRACTION: Regex = Regex::new(r"(\d+)/(\d+)").unwrap();
    static ref EXPONENT_PAREN: Regex = Regex::new(r"\^(\([^)]+\))").unwrap();
    static ref EXPONENT_DIGITS: Regex = Regex::new(r"\^(\d+)").unwrap();
    static ref EXPONENT_LETTER: Regex = Regex::new(r"\^([a-zA-Z])").unwrap();
    static ref FUNCTION_CALL: Regex =
        Regex::new(r"(?i)(ln|log|sqrt|sin|cos|tan)\(([^)]+)\)").unwrap();
    static ref CONSTANT_LABEL: Regex = Regex::new(r"(C)(\d+)").unwrap();

    /// Integral with a trailing differential: `∫x^4 dx`, `∫(2t) dt`.
    static ref INTEGRAL_LINE: Regex =
        Regex::new(r"∫([^∫]+?)(?:\s*dx|\s*dy|\s*dt|\s*d[a-z])").unwrap();
    /// Integral equation: `∫x^4 dx = (x^5)/5 + C1`.
    static ref INTEGRAL_EQUATION: Regex = Regex::new(r"(∫[^=]+)\s*=\s*([^,]+)").unwrap();
    static ref DIFFERENTIAL_TAIL: Regex = Regex::new(r"(?i)\s*dx\s*$").unwrap();

    /// Bilingual antiderivative-rule phrase: `Tích phân của x^n là nx^(n-1)`.
    static ref INTEGRAL_RULE_PHRASE: Regex =
        Regex::new(r"(?i)(Tích phân của\s+)(\S+\s+là\s+\S+)").unwrap();
    static ref LA_CONNECTOR: Regex = Regex::new(r"\s+là\s+").unwrap();

    /// Function notation spans: `f'(x)`, `g(x)`, `c(t)`.
    static ref FUNCTION_NOTATION: Regex = Regex::new(r"([cfg])'?\(([^)]+)\)").unwrap();

    /// Polynomial runs: `x^4 + 1/2x^3 - 7x^2`.
    static ref POLYNOMIAL_RUN: Regex =
        Regex::new(r"(?i)([a-z]\^\d+(?:\s*[+\-]\s*(?:\d+/?\d*)?[a-z]?\^?\d*)+)").unwrap();

    /// Equation connectors the splitting pass preserves verbatim.
    static ref CONNECTOR: Regex = Regex::new(r"\s*[=-]\s*").unwrap();
    static ref DOLLAR_GAP: Regex = Regex::new(r"\$\s*\$").unwrap();
    static ref DOUBLE_DOLLAR: Regex = Regex::new(r"\$\$").unwrap();
}

/// One rewrite rule of the expression pipeline.
type Rule = fn(&str) -> String;

/// The conversion cascade in application order. Later rules assume earlier
/// ones already normalized their target syntax (fractions before exponents,
/// functions before `\cdot` insertion).
const RULES: &[(&str, Rule)] = &[
    ("integral-symbol", rule_integral_symbol),
    ("fractions", rule_fractions),
    ("exponents", rule_exponents),
    ("functions", rule_functions),
    ("multiplication", rule_multiplication),
    ("constant-subscripts", rule_constant_subscripts),
];

/// Check whether a substring looks mathematical.
pub fn looks_mathematical(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    MATH_PATTERNS.iter().any(|pattern| pattern.is_match(trimmed))
}

/// Convert a single math expression to LaTeX by running the rule cascade.
///
/// The input is assumed to be an expression, not prose; prose callers should
/// go through [`convert_math_line`], which detects math first.
pub fn convert_expression(expr: &str) -> String {
    RULES
        .iter()
        .fold(expr.to_string(), |acc, (_, rule)| rule(&acc))
}

fn rule_integral_symbol(s: &str) -> String {
    s.replace('∫', "\\int ")
}

fn rule_fractions(s: &str) -> String {
    let s = PAREN_FRACTION.replace_all(s, r"\frac{${1}}{${2}}");
    BARE_FRACTION.replace_all(&s, r"\frac{${1}}{${2}}").into_owned()
}

fn rule_exponents(s: &str) -> String {
    let s = EXPONENT_PAREN.replace_all(s, r"^{${1}}");
    let s = EXPONENT_DIGITS.replace_all(&s, r"^{${1}}");
    EXPONENT_LETTER.replace_all(&s, r"^{${1}}").into_owned()
}

/// Style of a named function's converted form.
#[derive(Clone, Copy)]
enum FnStyle {
    /// Control sequence keeps the parenthesized argument: `\ln(x)`.
    Paren(&'static str),
    /// Control sequence braces the argument: `\sqrt{x}`.
    Brace(&'static str),
}

static FUNCTIONS: phf::Map<&'static str, FnStyle> = phf::phf_map! {
    "ln" => FnStyle::Paren(r"\ln"),
    "log" => FnStyle::Paren(r"\log"),
    "sqrt" => FnStyle::Brace(r"\sqrt"),
    "sin" => FnStyle::Paren(r"\sin"),
    "cos" => FnStyle::Paren(r"\cos"),
    "tan" => FnStyle::Paren(r"\tan"),
};

fn rule_functions(s: &str) -> String {
    FUNCTION_CALL
        .replace_all(s, |caps: &Captures| {
            let name = caps[1].to_ascii_lowercase();
            match FUNCTIONS.get(name.as_str()) {
                Some(FnStyle::Paren(cs)) => format!("{}({})", cs, &caps[2]),
                Some(FnStyle::Brace(cs)) => format!("{}{{{}}}", cs, &caps[2]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn rule_multiplication(s: &str) -> String {
    s.replace('*', " \\cdot ")
}

fn rule_constant_subscripts(s: &str) -> String {
    CONSTANT_LABEL.replace_all(s, r"${1}_{${2}}").into_owned()
}

/// Convert the mathematical substrings of one line of prose into LaTeX,
/// wrapping them in `$…$` delimiters.
///
/// A line that already contains a recognized delimiter pair is returned
/// byte-for-byte unchanged. Targeted passes run first (integral equations,
/// bilingual rule phrases, function notation, polynomial runs); when none of
/// them fires, a generic equation-aware pass splits the line on `=`/`-`
/// connectors and wraps each mathematical part.
pub fn convert_math_line(line: &str) -> String {
    if DELIMITED.is_match(line) {
        return line.to_string();
    }

    let result = INTEGRAL_RULE_PHRASE
        .replace_all(line, |caps: &Captures| {
            let parts: Vec<&str> = LA_CONNECTOR.split(&caps[2]).collect();
            if parts.len() == 2 {
                format!(
                    "{}${}$ là ${}$",
                    &caps[1],
                    convert_expression(parts[0]),
                    convert_expression(parts[1])
                )
            } else {
                format!("{}{}", &caps[1], &caps[2])
            }
        })
        .into_owned();

    let result = INTEGRAL_EQUATION
        .replace_all(&result, |caps: &Captures| {
            let left = DIFFERENTIAL_TAIL.replace(&caps[1], "");
            let left = convert_expression(&format!("{} \\, dx", left));
            let right = convert_expression(caps[2].trim());
            format!("${} = {}$", left, right)
        })
        .into_owned();

    let result = INTEGRAL_LINE
        .replace_all(&result, |caps: &Captures| {
            format!("$\\int {} \\, dx$", convert_expression(caps[1].trim()))
        })
        .into_owned();

    let result = FUNCTION_NOTATION
        .replace_all(&result, |caps: &Captures| format!("${}$", &caps[0]))
        .into_owned();

    let result = POLYNOMIAL_RUN
        .replace_all(&result, |caps: &Captures| {
            format!("${}$", convert_expression(&caps[1]))
        })
        .into_owned();

    // The targeted passes emit their own delimiters; the generic split is a
    // fallback for lines none of them recognized.
    if result.contains('$') {
        result
    } else {
        equation_pass(&result)
    }
}

/// Split a line on `=`/`-` connectors and wrap each mathematical part in
/// inline delimiters, then collapse the adjacent/duplicate dollars the
/// splitting produces.
fn equation_pass(line: &str) -> String {
    let mut rebuilt = String::with_capacity(line.len());
    let mut changed = false;
    let mut last = 0;

    for m in CONNECTOR.find_iter(line) {
        push_candidate(&line[last..m.start()], &mut rebuilt, &mut changed);
        rebuilt.push_str(m.as_str());
        last = m.end();
    }
    push_candidate(&line[last..], &mut rebuilt, &mut changed);

    if !changed {
        return line.to_string();
    }
    let cleaned = DOLLAR_GAP.replace_all(&rebuilt, " ");
    DOUBLE_DOLLAR.replace_all(&cleaned, "$$").into_owned()
}

fn push_candidate(part: &str, out: &mut String, changed: &mut bool) {
    if looks_mathematical(part) {
        *changed = true;
        out.push('$');
        out.push_str(&convert_expression(part.trim()));
        out.push('$');
    } else {
        out.push_str(part);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn delimited_lines_pass_through_unchanged() {
        let cases = [
            "The area is $x^2$ square units",
            "$$\\int_0^1 x \\, dx$$",
            "inline \\(a+b\\) form",
            "display \\[a+b\\] form",
        ];
        for case in cases {
            assert_eq!(convert_math_line(case), case);
        }
    }

    #[test]
    fn prose_without_math_is_unchanged() {
        assert_eq!(convert_math_line("We proceed as follows"), "We proceed as follows");
        assert_eq!(convert_math_line("done"), "done");
    }

    #[test]
    fn detection_requires_a_pattern_match() {
        assert!(looks_mathematical("x^2"));
        assert!(looks_mathematical("1/2"));
        assert!(looks_mathematical("3 + 4"));
        assert!(looks_mathematical("ln(x)"));
        assert!(!looks_mathematical("plain prose here"));
        assert!(!looks_mathematical("   "));
    }

    #[test]
    fn fraction_rule_converts_both_forms() {
        assert_eq!(rule_fractions("(1/2)"), "\\frac{1}{2}");
        assert_eq!(rule_fractions("3/4"), "\\frac{3}{4}");
    }

    #[test]
    fn exponent_rule_braces_all_suffix_forms() {
        assert_eq!(rule_exponents("x^(n-1)"), "x^{(n-1)}");
        assert_eq!(rule_exponents("x^4"), "x^{4}");
        assert_eq!(rule_exponents("e^x"), "e^{x}");
    }

    #[test]
    fn function_rule_uses_the_static_table() {
        assert_eq!(rule_functions("ln(x)"), "\\ln(x)");
        assert_eq!(rule_functions("sqrt(16)"), "\\sqrt{16}");
        assert_eq!(rule_functions("SIN(t)"), "\\sin(t)");
        assert_eq!(rule_functions("foo(x)"), "foo(x)");
    }

    #[test]
    fn multiplication_and_subscript_rules() {
        assert_eq!(rule_multiplication("2*x"), "2 \\cdot x");
        assert_eq!(rule_constant_subscripts("C1 + C2"), "C_{1} + C_{2}");
    }

    #[test]
    fn cascade_applies_rules_in_order() {
        assert_eq!(convert_expression("(1/2)x^2"), "\\frac{1}{2}x^{2}");
        assert_eq!(convert_expression("∫x^4"), "\\int x^{4}");
    }

    #[test]
    fn bare_fraction_is_wrapped_by_the_equation_pass() {
        assert_eq!(convert_math_line("1/2"), "$\\frac{1}{2}$");
    }

    #[test]
    fn integral_with_differential_is_wrapped() {
        let converted = convert_math_line("∫x^4 dx");
        assert_eq!(converted, "$\\int x^{4} \\, dx$");
    }

    #[test]
    fn integral_equation_converts_as_one_formula() {
        let converted = convert_math_line("∫x^4 dx = (x^5)/5 + C1");
        assert_eq!(converted, "$\\int x^{4} \\, dx = (x^{5})/5 + C_{1}$");
    }

    #[test]
    fn bilingual_rule_phrase_wraps_both_sides() {
        let converted = convert_math_line("Tích phân của x^n là nx^(n-1)");
        assert_eq!(converted, "Tích phân của $x^{n}$ là $nx^{(n-1)}$");
    }

    #[test]
    fn function_notation_is_wrapped() {
        let converted = convert_math_line("Differentiate f'(x) with respect to x");
        assert!(converted.contains("$f'(x)$"));
    }

    #[test]
    fn equation_split_preserves_connectors() {
        // "4" alone matches no detection pattern, so only the left side is
        // wrapped and the connector survives verbatim.
        let converted = convert_math_line("x^2 = 4");
        assert_eq!(converted, "$x^{2}$ = 4");
    }

    #[test]
    fn stray_dollar_is_left_alone() {
        assert_eq!(convert_math_line("$unclosed"), "$unclosed");
    }
}
