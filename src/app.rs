//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real entry point that:
//! - parses CLI arguments and sets up logging
//! - fetches and reshapes video tables
//! - runs the curve fit and prints reports/plots
//! - writes optional exports

use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FetchArgs, FitArgs, PlotArgs, ProcessArgs, SimulateArgs};
use crate::data::youtube::{API_KEY_VAR, mask_key};
use crate::data::{SynthSpec, YouTubeClient, generate_samples, process_video};
use crate::domain::{DatasetStats, FitConfig, RationalParams};
use crate::error::AppError;
use crate::io::ingest::RowError;
use crate::plot::{DEFAULT_SVG_SIZE, SvgChart};

pub mod pipeline;

/// Entry point for the `viewfit` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Process(args) => handle_process(args),
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::CheckEnv => handle_check_env(),
    }
}

/// Log to stderr so reports on stdout stay pipeable. `RUST_LOG` overrides the `warn` default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let ids = crate::cli::resolve_ids(&args.ids)
        .map_err(|e| AppError::new(2, format!("Failed to read video ids from '{}': {e}", args.ids)))?;
    let client = YouTubeClient::from_env()?;
    let videos = client.fetch_videos(&ids)?;

    crate::io::export::write_video_csv(&args.output, &videos)?;
    println!("Saved {} videos to {}", videos.len(), args.output.display());
    Ok(())
}

fn handle_process(args: ProcessArgs) -> Result<(), AppError> {
    let (videos, errors) = crate::io::ingest::read_video_csv(&args.input)?;
    log_row_errors(&errors);

    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let rows: Vec<_> = videos.into_iter().map(|v| process_video(v, today)).collect();
    let unparsed = rows.iter().filter(|r| r.duration_minutes.is_none()).count();
    if unparsed > 0 {
        warn!(count = unparsed, "durations could not be parsed; those rows will be skipped when fitting");
    }

    crate::io::export::write_processed_csv(&args.output, &rows)?;
    info!(today = %today, rows = rows.len(), "processed video table");
    println!("Processed {} videos into {}", rows.len(), args.output.display());
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;
    log_row_errors(&run.ingest.row_errors);

    println!("{}", crate::report::format_fit_summary(&run.ingest, &run.fit, &config));
    println!("{}", crate::report::format_outliers(&run.outliers));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            &run.fit,
            config.plot_width,
            config.plot_height,
            Some(&run.outliers),
        );
        println!("{plot}");
    }

    if let Some(path) = &config.svg_path {
        let points: Vec<(f64, f64)> = run.ingest.samples.iter().map(|s| (s.x, s.y)).collect();
        let grid = crate::io::curve::build_grid(&run.fit, run.ingest.stats.x_min, run.ingest.stats.x_max, 200);
        let curve: Vec<(f64, f64)> = grid.x.iter().copied().zip(grid.y.iter().copied()).collect();
        SvgChart {
            points: &points,
            curve: &curve,
            r_squared: run.fit.r_squared,
        }
        .write(path, DEFAULT_SVG_SIZE)?;
        println!("Wrote SVG chart to {}", path.display());
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.ingest.samples, &run.fit)?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &run.fit, &run.ingest.stats, Some(config.csv_path.as_path()))?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;

    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);
    println!("{plot}");

    if let Some(path) = &args.svg {
        let points: Vec<(f64, f64)> = curve.grid.x.iter().copied().zip(curve.grid.y.iter().copied()).collect();
        SvgChart {
            points: &[],
            curve: &points,
            r_squared: curve.fit.r_squared,
        }
        .write(path, DEFAULT_SVG_SIZE)?;
        println!("Wrote SVG chart to {}", path.display());
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let spec = SynthSpec {
        params: RationalParams::new(args.a, args.b, args.c),
        n: args.n,
        x_min: args.x_min,
        x_max: args.x_max,
        noise_sd: args.noise,
        seed: args.seed,
    };
    let samples = generate_samples(&spec)?;
    crate::io::export::write_samples_csv(&args.output, &samples)?;

    if let Some(stats) = DatasetStats::from_samples(&samples) {
        println!(
            "Wrote {} samples ({}) to {} | x=[{:.2}, {:.2}]",
            stats.n_points,
            spec.params,
            args.output.display(),
            stats.x_min,
            stats.x_max
        );
    }
    Ok(())
}

fn handle_check_env() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => println!("Loaded API key: {}", mask_key(&key)),
        _ => println!("Missing key!"),
    }
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.input.clone(),
        initial_guess: args.guess,
        multistart: args.multistart,
        top_n: args.top,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        svg_path: args.svg.clone(),
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

fn log_row_errors(errors: &[RowError]) {
    for e in errors {
        warn!(line = e.line, id = ?e.id, "{}", e.message);
    }
}
