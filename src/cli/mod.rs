//! Command-line parsing for the video duration/view-rate curve fitter.
//!
//! Argument parsing stays separate from dispatch (`app`) and from the
//! fitting code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::RationalParams;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "viewfit",
    version,
    about = "Fit a rational curve to YouTube view rate vs. video duration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch video metadata from the YouTube Data API into a CSV.
    Fetch(FetchArgs),
    /// Derive duration minutes, months since release, and views per month.
    Process(ProcessArgs),
    /// Fit y = (a + b*x) / (1 + c*x), print the results, and optionally plot/export.
    Fit(FitArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Write a noisy sample CSV drawn from known curve parameters.
    Simulate(SimulateArgs),
    /// Report whether the YouTube API key is available.
    CheckEnv,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Comma-separated video ids, or a file with one id per line (or comma-separated).
    #[arg(long, value_name = "IDS|FILE")]
    pub ids: String,

    /// Output CSV for the raw video table.
    #[arg(short, long, default_value = "youtube_videos.csv")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ProcessArgs {
    /// Raw video CSV produced by `viewfit fetch`.
    #[arg(short, long, default_value = "youtube_videos.csv")]
    pub input: PathBuf,

    /// Output CSV with the derived columns.
    #[arg(short, long, default_value = "youtube_videos_processed.csv")]
    pub output: PathBuf,

    /// Reference date for months-since-release (defaults to today, UTC).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Processed CSV with `duration_minutes` (or `duration_readable`) and `views_per_month`.
    #[arg(short, long, default_value = "youtube_videos_processed.csv")]
    pub input: PathBuf,

    /// Initial guess as `a,b,c`.
    #[arg(long, value_name = "A,B,C", default_value = "1,1,0.1", allow_hyphen_values = true)]
    pub guess: RationalParams,

    /// Retry from a grid of initial guesses and keep the lowest SSE.
    #[arg(long)]
    pub multistart: bool,

    /// Show top-N videos above and below the curve.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write an SVG chart of the data and fitted curve.
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,

    /// Export per-video results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export curve (params + fitted grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Curve JSON file produced by `viewfit fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also write the curve as an SVG chart.
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 100.0, allow_hyphen_values = true)]
    pub a: f64,

    #[arg(long, default_value_t = 2.0, allow_hyphen_values = true)]
    pub b: f64,

    #[arg(long, default_value_t = 0.1, allow_hyphen_values = true)]
    pub c: f64,

    /// Number of samples.
    #[arg(short, long, default_value_t = 40)]
    pub n: usize,

    /// Shortest duration (minutes).
    #[arg(long, default_value_t = 1.0)]
    pub x_min: f64,

    /// Longest duration (minutes).
    #[arg(long, default_value_t = 60.0)]
    pub x_max: f64,

    /// Standard deviation of Gaussian noise added to y.
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (`duration_minutes,views_per_month`).
    #[arg(short, long, default_value = "synthetic_samples.csv")]
    pub output: PathBuf,
}

/// Split a `--ids` value into video ids.
///
/// A value naming an existing file is read as a list; otherwise it is treated
/// as a comma-separated list. Blank entries and `#` comment lines are skipped.
pub fn resolve_ids(raw: &str) -> std::io::Result<Vec<String>> {
    let path = std::path::Path::new(raw);
    let text = if path.is_file() {
        std::fs::read_to_string(path)?
    } else {
        raw.to_string()
    };
    Ok(split_ids(&text))
}

fn split_ids(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
