//! Reporting utilities: residuals, outlier tables, and formatted terminal output.
//!
//! Formatting lives here so the fitting code stays free of presentation details.

use crate::domain::{FitConfig, FitResult, Sample};
use crate::error::AppError;
use crate::io::ingest::IngestedData;
use crate::models::evaluate;

/// One sample with its fitted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub sample: Sample,
    pub y_fit: f64,
    /// `y_obs - y_fit`; positive means the video beats the curve.
    pub residual: f64,
}

/// Videos furthest above and below the fitted curve.
#[derive(Debug, Clone)]
pub struct Outliers {
    pub above: Vec<Residual>,
    pub below: Vec<Residual>,
}

/// Compute fitted values and residuals for each sample.
pub fn compute_residuals(samples: &[Sample], fit: &FitResult) -> Result<Vec<Residual>, AppError> {
    let mut out = Vec::with_capacity(samples.len());
    for s in samples {
        let y_fit = evaluate(s.x, &fit.params);
        if !y_fit.is_finite() {
            return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
        }
        out.push(Residual {
            sample: *s,
            y_fit,
            residual: s.y - y_fit,
        });
    }
    Ok(out)
}

/// Largest positive and negative residuals, `top_n` each side.
pub fn rank_outliers(residuals: &[Residual], top_n: usize) -> Outliers {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.residual.total_cmp(&a.residual));

    let above = sorted.iter().filter(|r| r.residual > 0.0).take(top_n).copied().collect();
    let below = sorted.iter().rev().filter(|r| r.residual < 0.0).take(top_n).copied().collect();

    Outliers { above, below }
}

/// Format the fit summary (dataset stats, coefficients, R²).
pub fn format_fit_summary(ingest: &IngestedData, fit: &FitResult, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== Rational Regression Results ===\n");
    out.push_str(&format!("Input: {}\n", config.csv_path.display()));
    out.push_str(&format!("Columns: x={} | y={}\n", ingest.x_column, ingest.y_column));
    out.push_str(&format!(
        "Rows: read={} | used={} | dropped={} | errors={}\n",
        ingest.rows_read,
        ingest.rows_used(),
        ingest.rows_dropped,
        ingest.row_errors.len(),
    ));
    out.push_str(&format!(
        "Points: n={} | x=[{:.2}, {:.2}] min | y=[{:.0}, {:.0}] views/month\n",
        ingest.stats.n_points, ingest.stats.x_min, ingest.stats.x_max, ingest.stats.y_min, ingest.stats.y_max,
    ));
    let start = if config.multistart { "multi-start grid around" } else { "initial guess" };
    out.push_str(&format!("Start: {start} {}\n", config.initial_guess));

    out.push_str("\nModel: y = (a + b*x) / (1 + c*x)\n");
    out.push_str(&format!("a = {:.4}\n", fit.params.a));
    out.push_str(&format!("b = {:.4}\n", fit.params.b));
    out.push_str(&format!("c = {:.4}\n", fit.params.c));
    out.push_str(&format!("R² = {:.4}\n", fit.r_squared));
    out.push_str(&format!(
        "SSE={:.3} RMSE={:.3} n={} iterations={}\n",
        fit.sse, fit.rmse, fit.n, fit.iterations
    ));

    out
}

/// Format the above/below-curve tables.
pub fn format_outliers(outliers: &Outliers) -> String {
    let mut out = String::new();

    out.push_str("Above the curve (positive residual):\n");
    out.push_str(&format_table(&outliers.above));
    out.push('\n');

    out.push_str("Below the curve (negative residual):\n");
    out.push_str(&format_table(&outliers.below));

    out
}

fn format_table(rows: &[Residual]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>10} {:>14} {:>14} {:>14}\n", "minutes", "y_obs", "y_fit", "residual"));
    out.push_str(&format!("{:-<10} {:-<14} {:-<14} {:-<14}\n", "", "", "", ""));

    for r in rows {
        out.push_str(&format!(
            "{:>10.2} {:>14.1} {:>14.1} {:>14.1}\n",
            r.sample.x, r.sample.y, r.y_fit, r.residual
        ));
    }

    out
}
