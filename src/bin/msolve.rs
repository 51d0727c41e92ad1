//! Mathsolve CLI - submit a math problem to the solver endpoint and render
//! the formatted answer in the terminal, as JSON, or as HTML+MathML.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use mathsolve::{
    format_response, model_label, DisplayNode, FormatOptions, MathMode, MathmlTypesetter,
    ModelChoice, Segment, SolverClient, StructureMode, Typesetter,
};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

#[derive(Parser)]
#[command(name = "msolve")]
#[command(version)]
#[command(about = "Solve math problems with a remote tutor model and typeset the answer", long_about = None)]
struct Cli {
    /// The problem to solve (reads from stdin if neither this nor --input is given)
    problem: Option<String>,

    /// Read the problem (or, with --render, a saved response) from a file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Model checkpoint to query
    #[arg(short, long, value_enum, default_value_t = Model::Base)]
    model: Model,

    /// Response structuring policy
    #[arg(long, value_enum, default_value_t = Mode::Steps)]
    mode: Mode,

    /// Endpoint base URL (falls back to MATHSOLVE_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// API key (falls back to MATHSOLVE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Format the input as a saved model response without calling the endpoint
    #[arg(long)]
    render: bool,

    /// Probe the endpoint's health and exit
    #[arg(long)]
    health: bool,

    /// Emit the display nodes as JSON
    #[arg(long)]
    json: bool,

    /// Emit an HTML fragment with MathML formulas
    #[arg(long)]
    html: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Model {
    Base,
    Tuned,
}

impl From<Model> for ModelChoice {
    fn from(model: Model) -> Self {
        match model {
            Model::Base => ModelChoice::Base,
            Model::Tuned => ModelChoice::FineTuned,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Flat,
    Steps,
}

impl From<Mode> for StructureMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Flat => StructureMode::Flat,
            Mode::Steps => StructureMode::Stepwise,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Mirrors the web UI's localized failure card.
            eprintln!("{}Có lỗi xảy ra:{} {}", RED, RESET, err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.health {
        let client = build_client(&cli)?;
        let healthy = client.health().await;
        println!("{}", if healthy { "ok" } else { "unreachable" });
        return Ok(());
    }

    let text = read_text(&cli)?;
    if text.trim().is_empty() {
        return Err("no problem text given".into());
    }

    let (response, model_used) = if cli.render {
        (text, None)
    } else {
        let client = build_client(&cli)?;
        let answer = client.solve(text, cli.model.into()).await?;
        (answer.response, Some(answer.model_used))
    };

    let options = FormatOptions {
        mode: cli.mode.into(),
    };
    let typesetter = MathmlTypesetter;
    let nodes = format_response(&response, &options, &typesetter);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
    } else if cli.html {
        println!("{}", render_html(&nodes, &typesetter));
    } else {
        print!("{}", render_terminal(&nodes));
        if let Some(model_used) = &model_used {
            let label = model_label(model_used);
            println!(
                "\n{}Model: {} ({}){}",
                DIM,
                label.display_name(),
                model_used,
                RESET
            );
        }
    }
    Ok(())
}

fn build_client(cli: &Cli) -> Result<SolverClient, Box<dyn std::error::Error>> {
    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| std::env::var("MATHSOLVE_ENDPOINT").ok())
        .ok_or("no endpoint configured (use --endpoint or MATHSOLVE_ENDPOINT)")?;
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("MATHSOLVE_API_KEY").ok())
        .unwrap_or_default();
    Ok(SolverClient::new(endpoint, api_key)?)
}

fn read_text(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(problem) = &cli.problem {
        return Ok(problem.clone());
    }
    if let Some(path) = &cli.input {
        return Ok(fs::read_to_string(path)?);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

// ============================================================================
// Terminal rendering
// ============================================================================

fn render_terminal(nodes: &[DisplayNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            DisplayNode::Header(segments) => {
                out.push_str(&format!("{}{}{}\n", BOLD, segments_text(segments), RESET));
            }
            DisplayNode::ListItem(segments) => {
                out.push_str(&format!("  • {}\n", segments_text(segments)));
            }
            DisplayNode::Paragraph(segments) => {
                out.push_str(&format!("{}\n", segments_text(segments)));
            }
            DisplayNode::Spacer => out.push('\n'),
            DisplayNode::Step(block) => {
                out.push_str(&format!(
                    "{}{}Step {}: {}{}\n",
                    BOLD, CYAN, block.number, block.title, RESET
                ));
                for line in &block.body {
                    out.push_str(&format!("    {}\n", segments_text(line)));
                }
            }
            DisplayNode::FinalAnswer(segments) => {
                out.push_str(&format!(
                    "{}✓ {}{}\n",
                    GREEN,
                    segments_text(segments),
                    RESET
                ));
            }
        }
    }
    out
}

/// Flatten a segment run for terminal display; formulas keep their LaTeX
/// payload, tinted so they stand out from prose.
fn segments_text(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Inline(formula) => {
                out.push_str(&format!("{}{}{}", CYAN, formula, RESET));
            }
            Segment::Block(formula) => {
                out.push_str(&format!("\n    {}{}{}\n", CYAN, formula, RESET));
            }
        }
    }
    out
}

// ============================================================================
// HTML rendering
// ============================================================================

fn render_html(nodes: &[DisplayNode], typesetter: &dyn Typesetter) -> String {
    let mut out = String::from("<div class=\"solution\">\n");
    for node in nodes {
        match node {
            DisplayNode::Header(segments) => {
                out.push_str(&format!("<h3>{}</h3>\n", segments_html(segments, typesetter)));
            }
            DisplayNode::ListItem(segments) => {
                out.push_str(&format!("<li>{}</li>\n", segments_html(segments, typesetter)));
            }
            DisplayNode::Paragraph(segments) => {
                out.push_str(&format!("<p>{}</p>\n", segments_html(segments, typesetter)));
            }
            DisplayNode::Spacer => out.push_str("<br>\n"),
            DisplayNode::Step(block) => {
                out.push_str(&format!(
                    "<section class=\"step\"><h4>Step {}: {}</h4>\n",
                    escape_html(&block.number),
                    escape_html(&block.title)
                ));
                for line in &block.body {
                    out.push_str(&format!("<p>{}</p>\n", segments_html(line, typesetter)));
                }
                out.push_str("</section>\n");
            }
            DisplayNode::FinalAnswer(segments) => {
                out.push_str(&format!(
                    "<p class=\"final-answer\">{}</p>\n",
                    segments_html(segments, typesetter)
                ));
            }
        }
    }
    out.push_str("</div>");
    out
}

fn segments_html(segments: &[Segment], typesetter: &dyn Typesetter) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(&escape_html(text)),
            Segment::Inline(formula) => match typesetter.typeset(formula, MathMode::Inline) {
                Ok(mathml) => out.push_str(&mathml),
                Err(_) => out.push_str(&escape_html(formula)),
            },
            Segment::Block(formula) => match typesetter.typeset(formula, MathMode::Block) {
                Ok(mathml) => out.push_str(&mathml),
                Err(_) => out.push_str(&escape_html(formula)),
            },
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
