//! SVG chart of the observed videos and the fitted curve, drawn with Plotters.
//!
//! The chart is rendered to an in-memory string first, then written to disk, so
//! tests can inspect the markup without touching the filesystem.

use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::error::AppError;

pub const DEFAULT_SVG_SIZE: (u32, u32) = (800, 500);

const TITLE: &str = "Rational Regression: Views vs. Duration";

/// Data needed to draw one chart.
pub struct SvgChart<'a> {
    /// Observed `(duration, views/month)` pairs; may be empty.
    pub points: &'a [(f64, f64)],
    /// Fitted curve, sorted by x.
    pub curve: &'a [(f64, f64)],
    pub r_squared: f64,
}

impl SvgChart<'_> {
    /// Render the chart as SVG markup.
    pub fn render(&self, size: (u32, u32)) -> Result<String, AppError> {
        let (x_bounds, y_bounds) = self
            .bounds()
            .ok_or_else(|| AppError::new(3, "Nothing to plot: no finite points or curve values."))?;

        let mut svg = String::new();
        self.draw(SVGBackend::with_string(&mut svg, size), x_bounds, y_bounds)
            .map_err(|e| AppError::new(4, format!("Failed to render SVG chart: {e}")))?;
        Ok(svg)
    }

    /// Render and write the chart to `path`.
    pub fn write(&self, path: &Path, size: (u32, u32)) -> Result<(), AppError> {
        let svg = self.render(size)?;
        std::fs::write(path, svg)
            .map_err(|e| AppError::new(2, format!("Failed to write SVG '{}': {e}", path.display())))?;
        debug!(path = %path.display(), "wrote SVG chart");
        Ok(())
    }

    fn draw(
        &self,
        backend: SVGBackend<'_>,
        (x0, x1): (f64, f64),
        (y0, y1): (f64, f64),
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = backend.into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, ("sans-serif", 22))
            .margin(12)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        chart
            .configure_mesh()
            .x_desc("Video duration (minutes)")
            .y_desc("Views per month")
            .x_labels(8)
            .y_labels(8)
            .draw()?;

        let data_color = BLUE.mix(0.7);
        chart
            .draw_series(self.points.iter().map(|&(x, y)| Circle::new((x, y), 3, data_color.filled())))?
            .label("Data")
            .legend(move |(x, y)| Circle::new((x, y), 3, data_color.filled()));

        // A pole splits the curve into separate segments.
        let label = format!("Rational fit (R²={:.3})", self.r_squared);
        let segments = finite_segments(self.curve);
        for (i, segment) in segments.into_iter().enumerate() {
            let series = chart.draw_series(LineSeries::new(segment, RED.stroke_width(2)))?;
            if i == 0 {
                series
                    .label(label.as_str())
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let finite = self
            .points
            .iter()
            .chain(self.curve.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite());

        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for &(px, py) in finite {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        if !x.0.is_finite() {
            return None;
        }
        Some((pad(x), pad(y)))
    }
}

fn pad((min, max): (f64, f64)) -> (f64, f64) {
    let span = max - min;
    let pad = if span > 0.0 { span * 0.05 } else { min.abs().max(1.0) * 0.05 };
    (min - pad, max + pad)
}

fn finite_segments(curve: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
    let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in curve {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_has_title_and_fit_label() {
        let points = [(1.0, 100.0), (5.0, 60.0), (20.0, 25.0)];
        let curve = [(1.0, 98.0), (10.0, 40.0), (20.0, 26.0)];
        let chart = SvgChart {
            points: &points,
            curve: &curve,
            r_squared: 0.9969,
        };

        let svg = chart.render((640, 400)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Rational Regression: Views vs. Duration"));
        assert!(svg.contains("R²=0.997"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn curve_splits_at_non_finite_values() {
        let curve = [(1.0, 1.0), (2.0, f64::INFINITY), (3.0, 3.0), (4.0, 4.0)];
        let segments = finite_segments(&curve);
        assert_eq!(segments, vec![vec![(1.0, 1.0)], vec![(3.0, 3.0), (4.0, 4.0)]]);
    }

    #[test]
    fn empty_chart_is_rejected() {
        let chart = SvgChart {
            points: &[],
            curve: &[],
            r_squared: 0.0,
        };
        assert_eq!(chart.render(DEFAULT_SVG_SIZE).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.svg");
        let curve = [(1.0, 10.0), (2.0, 5.0)];
        SvgChart {
            points: &[],
            curve: &curve,
            r_squared: 0.5,
        }
        .write(&path, DEFAULT_SVG_SIZE)
        .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("</svg>"));
    }
}
