//! Read/write curve JSON files.
//!
//! Curve JSON is the portable form of a fitted curve:
//! - the fit result (coefficients, R², SSE, RMSE)
//! - where the samples came from
//! - a precomputed grid for plotting without refitting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, CurveGrid, DatasetStats, FitResult};
use crate::error::AppError;
use crate::models::evaluate;

pub const GRID_POINTS: usize = 101;

/// Write a curve JSON file.
pub fn write_curve_json(
    path: &Path,
    fit: &FitResult,
    stats: &DatasetStats,
    source: Option<&Path>,
) -> Result<(), AppError> {
    let curve = build_curve_file(fit, stats, source);
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}

pub fn build_curve_file(fit: &FitResult, stats: &DatasetStats, source: Option<&Path>) -> CurveFile {
    CurveFile {
        tool: "viewfit".to_string(),
        source: source.map(|p| p.display().to_string()),
        fit: fit.clone(),
        grid: build_grid(fit, stats.x_min, stats.x_max, GRID_POINTS),
    }
}

/// Evenly spaced `(x, ŷ)` points over `[x_min, x_max]`.
///
/// Non-finite predictions (a pole between samples) are skipped.
pub fn build_grid(fit: &FitResult, x_min: f64, x_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let mut x0 = x_min;
    let mut x1 = x_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.5;
        x1 = 60.0;
    }
    if (x1 - x0).abs() < 1e-9 {
        x0 = (x0 - 0.5).max(0.01);
        x1 += 0.5;
    }

    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x0 + u * (x1 - x0);
        let y = evaluate(x, &fit.params);
        if y.is_finite() {
            xs.push(x);
            ys.push(y);
        }
    }

    CurveGrid { x: xs, y: ys }
}
