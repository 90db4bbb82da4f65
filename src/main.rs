//! Canvas Arranger CLI
//!
//! Usage:
//!   canvas-arranger [OPTIONS] [SNAPSHOT]
//!
//! Reads a canvas snapshot (`{"container": {...}, "nodes": [...]}`) as JSON,
//! arranges its nodes and prints the report as JSON. With `--plan-new`, the
//! input is a list of elements to create and the output their placements.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use canvas_arranger::layout::FixedResponse;
use canvas_arranger::{
    plan_new_elements, ArrangeRequest, Arranger, CanvasSnapshot, Container, EngineConfig,
    LayoutMode, LayoutParams, MemoryCanvas, NewElementSpec,
};

#[derive(Parser)]
#[command(name = "canvas-arranger")]
#[command(about = "Infer the structure of a canvas frame and arrange its elements")]
struct Cli {
    /// Snapshot file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Engine configuration (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Layout mode for generic interfaces: grid, row or column
    #[arg(short, long, default_value = "grid")]
    layout: String,

    /// Grid columns
    #[arg(long, default_value_t = 4)]
    columns: usize,

    #[arg(long, default_value_t = 10.0)]
    gap_x: f64,

    #[arg(long, default_value_t = 10.0)]
    gap_y: f64,

    #[arg(long, default_value_t = 20.0)]
    start_x: f64,

    #[arg(long, default_value_t = 20.0)]
    start_y: f64,

    /// Arrange only these node ids (comma separated) instead of every child
    #[arg(long, value_delimiter = ',')]
    elements: Vec<String>,

    /// File holding a decision response; enables delegated planning
    #[arg(long)]
    decision_response: Option<PathBuf>,

    /// Write the updated snapshot here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Treat the input as a JSON list of elements to create and print placements
    #[arg(long)]
    plan_new: bool,

    /// Container size for --plan-new, as WIDTHxHEIGHT
    #[arg(long, default_value = "300x450")]
    container_size: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr, stdout carries the JSON report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(&format!("Error loading config '{}': {}", path.display(), e)),
        },
        None => EngineConfig::default(),
    };

    let layout: LayoutMode = match cli.layout.parse() {
        Ok(mode) => mode,
        Err(e) => fail(&format!("Error: {}", e)),
    };
    let params = LayoutParams::new()
        .with_layout(layout)
        .with_columns(cli.columns)
        .with_gap(cli.gap_x, cli.gap_y)
        .with_start(cli.start_x, cli.start_y);

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(&format!("Error reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => fail(&format!("Error reading from stdin: {}", e)),
            }
        }
    };

    if cli.plan_new {
        run_plan_new(&cli, &source, &params, &config);
    } else {
        run_rearrange(&cli, &source, params, config).await;
    }
}

fn run_plan_new(cli: &Cli, source: &str, params: &LayoutParams, config: &EngineConfig) {
    let specs: Vec<NewElementSpec> = match serde_json::from_str(source) {
        Ok(specs) => specs,
        Err(e) => fail(&format!("Error parsing element list: {}", e)),
    };
    let container = match parse_size(&cli.container_size) {
        Some((width, height)) => Container::new(width, height),
        None => fail(&format!(
            "Error: container size '{}' is not WIDTHxHEIGHT",
            cli.container_size
        )),
    };
    match plan_new_elements(&specs, params, &container, config) {
        Ok(placements) => print_json(&placements),
        Err(e) => fail(&format!("Error: {}", e)),
    }
}

async fn run_rearrange(cli: &Cli, source: &str, params: LayoutParams, config: EngineConfig) {
    let snapshot: CanvasSnapshot = match serde_json::from_str(source) {
        Ok(snapshot) => snapshot,
        Err(e) => fail(&format!("Error parsing snapshot: {}", e)),
    };

    let canvas = Arc::new(MemoryCanvas::from_snapshot(snapshot));
    let mut arranger = Arranger::new(canvas.clone(), canvas.clone()).with_config(config);
    if let Some(path) = &cli.decision_response {
        let response = read_or_fail(path);
        arranger = arranger.with_decision_maker(Arc::new(FixedResponse::new(response)));
    }

    let request = if cli.elements.is_empty() {
        ArrangeRequest::container(canvas.container_id())
    } else {
        ArrangeRequest::elements(cli.elements.clone()).within(canvas.container_id())
    };
    let request = request
        .with_params(params)
        .with_delegated_decision(cli.decision_response.is_some());

    let report = match arranger.rearrange(&request).await {
        Ok(report) => report,
        Err(e) => fail(&format!("Error: {}", e)),
    };

    if let Some(path) = &cli.output {
        let updated = match serde_json::to_string_pretty(&canvas.snapshot()) {
            Ok(json) => json,
            Err(e) => fail(&format!("Error serializing snapshot: {}", e)),
        };
        if let Err(e) = fs::write(path, updated) {
            fail(&format!("Error writing '{}': {}", path.display(), e));
        }
    }
    print_json(&report);
}

fn parse_size(text: &str) -> Option<(f64, f64)> {
    let (width, height) = text.split_once(['x', 'X'])?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

fn read_or_fail(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(&format!("Error reading file '{}': {}", path.display(), e)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(&format!("Error serializing output: {}", e)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
