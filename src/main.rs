//! # Tide Windows Application Entry Point
//!
//! Loads configuration, fetches the tide predictions once, and writes the chart.
//!
//! Usage:
//!   tide-windows [--config <path>] [--output <path>] [--stdout]
//!
//! `--stdout` draws an ASCII chart on the terminal instead of writing the SVG file.
//! Set `RUST_LOG=debug` for more detail.


use anyhow::{anyhow, Context};
use chrono::Local;
use std::env;
use std::path::PathBuf;
use tide_windows_lib::config::{Config, CONFIG_FILE};
use tide_windows_lib::pipeline;
use tide_windows_lib::renderer::{Destination, RenderOutcome};
use tide_windows_lib::TideError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Parsed command line.
#[derive(Debug, PartialEq)]
struct Args {
    config_path: PathBuf,
    output: Option<PathBuf>,
    stdout: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Args> {
    let mut parsed = Args {
        config_path: PathBuf::from(CONFIG_FILE),
        output: None,
        stdout: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            // Development mode: render to stdout for testing without an image viewer
            "--stdout" => parsed.stdout = true,
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config_path = PathBuf::from(path);
            }
            "--output" => {
                let path = args.next().context("--output needs a path")?;
                parsed.output = Some(PathBuf::from(path));
            }
            other => return Err(anyhow!("unknown argument: {other}")),
        }
    }
    Ok(parsed)
}

/// Config file plus environment, then the `--output` flag on top.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::load(&args.config_path).map_err(TideError::from)?;
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    init_logging();
    let args = parse_args(env::args().skip(1))?;

    let config = load_config(&args)?;

    let destination = if args.stdout {
        Destination::Terminal
    } else {
        Destination::File(config.output.path.clone())
    };

    // Runtime for the single async fetch
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(pipeline::run(
        &config,
        Local::now().date_naive(),
        &destination,
    ))?;

    match report.outcome {
        RenderOutcome::Written(path) => info!(
            "Done: {} tides, {} favorable, chart at {}",
            report.series.len(),
            report.series.favorable().count(),
            path.display()
        ),
        RenderOutcome::Displayed => {}
        RenderOutcome::NothingToPlot => warn!(
            "Data could not be retrieved for station {}. Please check your station ID and date range.",
            config.station.id
        ),
    }

    Ok(())
}
