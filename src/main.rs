//! # glyphflow CLI
//!
//! Usage:
//!   glyphflow job.json
//!   echo '{ "text": "..." }' | glyphflow --pretty
//!   glyphflow job.json --set verticalSpacing=4 --set supportsCommands=true
//!   glyphflow --example > job.json
//!
//! Prints the layout report as JSON on stdout. Set `RUST_LOG=debug` to see
//! layout passes.

use glyphflow::{LayoutError, LayoutJob};
use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", glyphflow::model::example_job_json());
        return;
    }

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("✗ Layout failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<String, LayoutError> {
    // Read input
    let input = match input_path(args) {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut job: LayoutJob = serde_json::from_str(&input)?;

    // Option overrides, `--set name=value`
    let overrides: Vec<(&str, &str)> = args
        .windows(2)
        .filter(|w| w[0] == "--set")
        .map(|w| w[1].split_once('=').unwrap_or((w[1].as_str(), "")))
        .collect();
    job.override_options(overrides)?;

    let report = job.run()?;
    log::info!(
        "laid out {} lines, {}x{}",
        report.line_count,
        report.size.width,
        report.size.height
    );

    let json = if args.iter().any(|a| a == "--pretty") {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    json.map_err(LayoutError::Report)
}

/// The first argument that is neither a flag nor the value of `--set`.
fn input_path(args: &[String]) -> Option<&str> {
    args.iter()
        .enumerate()
        .skip(1)
        .find(|(i, a)| !a.starts_with('-') && args[i - 1] != "--set")
        .map(|(_, a)| a.as_str())
}
