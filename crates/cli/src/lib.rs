//! CLI for perfdelta.
//!
//! Loads a directory of pre/post benchmark result files, writes the
//! comparison CSV and charts, and optionally prints the textual report.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use perfdelta_report::{io, report};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "PERFDELTA_LOG";

/// Compare pre/post benchmark results.
#[derive(Parser, Debug)]
#[command(name = "perfdelta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing test result files.
    pub results_dir: PathBuf,

    /// Output CSV file.
    #[arg(short, long, default_value = "comparison_results.csv")]
    pub output: PathBuf,

    /// Directory for rendered charts (default: <results_dir>/visualizations).
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,

    /// Print the comparison report to stdout.
    #[arg(short, long)]
    pub report: bool,

    /// Open the chart directory with the platform opener after rendering.
    #[arg(short, long)]
    pub show: bool,
}

/// Parse arguments, initialize logging and run the comparison.
pub fn run() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    execute(Cli::parse())
}

/// Run the comparison for already-parsed arguments.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let session = io::load_session(&cli.results_dir)?;
    let deltas = session.compute_deltas();

    io::write_csv(&session, &cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("Results exported to: {}", cli.output.display());

    let charts_dir = cli
        .charts_dir
        .clone()
        .unwrap_or_else(|| io::default_charts_dir(&cli.results_dir));
    let charts = io::write_charts(&session, &charts_dir)
        .with_context(|| format!("writing charts to {}", charts_dir.display()))?;
    for chart in &charts {
        println!("Saved: {}", chart.display());
    }

    if cli.report {
        print!("{}", report::render(&deltas));
    }

    if cli.show {
        open_directory(&charts_dir);
    }

    Ok(())
}

/// Best-effort open of the chart directory; failure is logged, never
/// fatal.
fn open_directory(dir: &std::path::Path) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    if let Err(e) = std::process::Command::new(opener).arg(dir).spawn() {
        warn!(dir = %dir.display(), error = %e, "could not open chart directory");
    }
}
