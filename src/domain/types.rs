//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation: video duration (minutes) against views per month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Duration in minutes (positive).
    pub x: f64,
    /// Views per month (non-negative).
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Coefficients of the rational model `y = (a + b·x) / (1 + c·x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RationalParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl RationalParams {
    /// Starting point used when the caller does not supply one.
    pub const DEFAULT_GUESS: RationalParams = RationalParams { a: 1.0, b: 1.0, c: 0.1 };

    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    pub fn from_slice(p: &[f64]) -> Self {
        Self { a: p[0], b: p[1], c: p[2] }
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }
}

impl Default for RationalParams {
    fn default() -> Self {
        Self::DEFAULT_GUESS
    }
}

impl FromStr for RationalParams {
    type Err = String;

    /// Parse `a,b,c` (used by `--guess`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected three comma-separated values `a,b,c`, got '{s}'"));
        }
        let mut values = [0.0; 3];
        for (slot, raw) in values.iter_mut().zip(parts.iter()) {
            let v: f64 = raw
                .parse()
                .map_err(|e| format!("invalid number '{raw}': {e}"))?;
            if !v.is_finite() {
                return Err(format!("non-finite value '{raw}'"));
            }
            *slot = v;
        }
        Ok(RationalParams::from_slice(&values))
    }
}

impl std::fmt::Display for RationalParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a={:.4}, b={:.4}, c={:.4}", self.a, self.b, self.c)
    }
}

/// Output of a single curve fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: RationalParams,
    /// Coefficient of determination, in `(-inf, 1]`.
    pub r_squared: f64,
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    /// Solver iterations used.
    pub iterations: usize,
}

/// Summary stats about the samples actually used for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DatasetStats {
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        let mut stats = DatasetStats {
            n_points: samples.len(),
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        for s in &samples[1..] {
            stats.x_min = stats.x_min.min(s.x);
            stats.x_max = stats.x_max.max(s.x);
            stats.y_min = stats.y_min.min(s.y);
            stats.y_max = stats.y_max.max(s.y);
        }
        Some(stats)
    }
}

/// A video row as returned by the fetch step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub views: u64,
    /// Duration formatted as `HH:MM:SS`.
    pub duration_readable: String,
}

/// A video row after reshaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedVideo {
    #[serde(flatten)]
    pub video: VideoRecord,
    /// `None` when `duration_readable` cannot be parsed.
    pub duration_minutes: Option<f64>,
    pub months_since_release: i64,
    pub views_per_month: i64,
}

/// A full fit run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub initial_guess: RationalParams,
    pub multistart: bool,
    /// Rows shown in each of the above/below-curve tables.
    pub top_n: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub svg_path: Option<PathBuf>,

    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub source: Option<String>,
    pub fit: FitResult,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_parse_from_comma_list() {
        let p: RationalParams = "120, 0.5,0.2".parse().unwrap();
        assert_eq!(p, RationalParams::new(120.0, 0.5, 0.2));
    }

    #[test]
    fn params_parse_rejects_wrong_arity_and_garbage() {
        assert!("1,2".parse::<RationalParams>().is_err());
        assert!("1,x,3".parse::<RationalParams>().is_err());
        assert!("1,inf,3".parse::<RationalParams>().is_err());
    }

    #[test]
    fn dataset_stats_tracks_ranges() {
        let samples = [Sample::new(3.0, 10.0), Sample::new(1.0, 40.0), Sample::new(7.0, 5.0)];
        let stats = DatasetStats::from_samples(&samples).unwrap();
        assert_eq!(stats.n_points, 3);
        assert_eq!(stats.x_min, 1.0);
        assert_eq!(stats.x_max, 7.0);
        assert_eq!(stats.y_min, 5.0);
        assert_eq!(stats.y_max, 40.0);
        assert!(DatasetStats::from_samples(&[]).is_none());
    }
}
