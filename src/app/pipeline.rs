//! Shared fit pipeline used by the `fit` command.
//!
//! ingest CSV -> fit (single start or multi-start) -> residuals -> outliers
//!
//! Keeping the workflow here leaves `app` to handle presentation and exports.

use tracing::info;

use crate::domain::{FitConfig, FitResult};
use crate::error::AppError;
use crate::fit::{CurveFitter, default_guess_grid, fit_multistart};
use crate::io::ingest::{IngestedData, load_samples};
use crate::report::{Outliers, Residual, compute_residuals, rank_outliers};

/// All computed outputs of a single `viewfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub fit: FitResult,
    pub residuals: Vec<Residual>,
    pub outliers: Outliers,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = load_samples(&config.csv_path)?;
    info!(
        path = %config.csv_path.display(),
        used = ingest.rows_used(),
        dropped = ingest.rows_dropped,
        errors = ingest.row_errors.len(),
        "loaded samples"
    );

    run_fit_on(config, ingest)
}

/// Fit already-ingested samples.
pub fn run_fit_on(config: &FitConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    let fitter = CurveFitter::new();
    let fit = if config.multistart {
        let guesses = default_guess_grid(config.initial_guess);
        fit_multistart(&fitter, &ingest.samples, &guesses)?
    } else {
        fitter.fit(&ingest.samples, config.initial_guess)?
    };
    info!(params = %fit.params, r_squared = fit.r_squared, iterations = fit.iterations, "fit complete");

    let residuals = compute_residuals(&ingest.samples, &fit)?;
    let outliers = rank_outliers(&residuals, config.top_n);

    Ok(RunOutput {
        ingest,
        fit,
        residuals,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SynthSpec, generate_samples};
    use crate::domain::RationalParams;
    use crate::io::export::write_samples_csv;

    fn config(path: std::path::PathBuf, multistart: bool) -> FitConfig {
        FitConfig {
            csv_path: path,
            initial_guess: RationalParams::DEFAULT_GUESS,
            multistart,
            top_n: 3,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            svg_path: None,
            export_results: None,
            export_curve: None,
        }
    }

    fn synthetic_csv(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let samples = generate_samples(&SynthSpec {
            params: RationalParams::new(100.0, 2.0, 0.1),
            n: 40,
            x_min: 1.0,
            x_max: 60.0,
            noise_sd: 0.1,
            seed: 7,
        })
        .unwrap();
        let path = dir.path().join("samples.csv");
        write_samples_csv(&path, &samples).unwrap();
        path
    }

    #[test]
    fn simulated_csv_fits_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_fit(&config(synthetic_csv(&dir), false)).unwrap();

        assert_eq!(run.ingest.rows_used(), 40);
        assert_eq!(run.residuals.len(), 40);
        assert!(run.fit.r_squared > 0.95);
        assert!((run.fit.params.a - 100.0).abs() / 100.0 < 0.05);
        assert!(run.outliers.above.len() <= 3);
    }

    #[test]
    fn multistart_matches_or_beats_single_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = synthetic_csv(&dir);
        let single = run_fit(&config(path.clone(), false)).unwrap();
        let multi = run_fit(&config(path, true)).unwrap();
        assert!(multi.fit.sse <= single.fit.sse * (1.0 + 1e-9));
    }

    #[test]
    fn too_few_rows_exit_with_data_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.csv");
        std::fs::write(&path, "duration_minutes,views_per_month\n1,100\n2,90\n5,60\n").unwrap();
        assert_eq!(run_fit(&config(path, false)).unwrap_err().exit_code(), 3);
    }
}
