//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid, kept deterministic so it can be snapshot tested.
//!
//! Plot elements:
//! - observed videos: `o`
//! - fitted curve: `-` line
//! - optional highlights: `+` (furthest above the curve), `x` (furthest below)

use crate::domain::{CurveFile, FitResult};
use crate::models::evaluate;
use crate::report::{Outliers, Residual};

/// Render a plot for an in-memory fit result.
pub fn render_ascii_plot(
    residuals: &[Residual],
    fit: &FitResult,
    width: usize,
    height: usize,
    outliers: Option<&Outliers>,
) -> String {
    let (x_min, x_max) = x_range_from_residuals(residuals).unwrap_or((0.5, 60.0));
    let curve = sample_curve(fit, x_min, x_max, width.max(2));
    render_plot(residuals, &curve, x_min, x_max, width, height, outliers)
}

/// Render a plot from a saved curve JSON file (curve only, no overlay points).
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = curve
        .grid
        .x
        .iter()
        .zip(curve.grid.y.iter())
        .map(|(&x, &y)| (x, y))
        .collect();
    let (x_min, x_max) = x_range(points.iter().map(|p| p.0)).unwrap_or((0.5, 60.0));

    render_plot(&[], &points, x_min, x_max, width, height, None)
}

fn render_plot(
    residuals: &[Residual],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
    outliers: Option<&Outliers>,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(residuals, curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);

    for r in residuals {
        let col = map_x(r.sample.x, x_min, x_max, width);
        let row = map_y(r.sample.y, y_min, y_max, height);
        grid[row][col] = marker(r, outliers);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: duration=[{x_min:.2}, {x_max:.2}] min | views/month=[{y_min:.1}, {y_max:.1}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn marker(r: &Residual, outliers: Option<&Outliers>) -> char {
    match outliers {
        Some(o) if o.above.contains(r) => '+',
        Some(o) if o.below.contains(r) => 'x',
        _ => 'o',
    }
}

fn x_range_from_residuals(residuals: &[Residual]) -> Option<(f64, f64)> {
    x_range(residuals.iter().map(|r| r.sample.x))
}

fn x_range(xs: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min_x, max_x) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn sample_curve(fit: &FitResult, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, evaluate(x, &fit.params))
        })
        .collect()
}

fn y_range(residuals: &[Residual], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let ys = residuals
        .iter()
        .map(|r| r.sample.y)
        .chain(curve.iter().map(|&(_, y)| y))
        .filter(|y| y.is_finite());
    for y in ys {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        // A pole between grid points breaks the line.
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveGrid, RationalParams, Sample};
    use crate::report::{compute_residuals, rank_outliers};

    fn flat_fit() -> FitResult {
        FitResult {
            params: RationalParams::new(100.0, 0.0, 0.0),
            r_squared: 0.0,
            sse: 100.0,
            rmse: 7.07,
            n: 2,
            iterations: 1,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let samples = [Sample::new(1.0, 100.0), Sample::new(10.0, 110.0)];
        let residuals = compute_residuals(&samples, &flat_fit()).unwrap();

        let txt = render_ascii_plot(&residuals, &flat_fit(), 10, 5, None);
        let expected = concat!(
            "Plot: duration=[1.00, 10.00] min | views/month=[99.5, 110.5]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn outliers_get_their_own_markers() {
        let samples = [Sample::new(1.0, 100.0), Sample::new(5.0, 90.0), Sample::new(10.0, 110.0)];
        let residuals = compute_residuals(&samples, &flat_fit()).unwrap();
        let outliers = rank_outliers(&residuals, 1);

        let txt = render_ascii_plot(&residuals, &flat_fit(), 10, 5, Some(&outliers));
        let body: String = txt.lines().skip(1).collect();
        assert!(body.contains('+'));
        assert!(body.contains('x'));
        assert!(body.contains('o'));
    }

    #[test]
    fn curve_file_plot_draws_only_the_line() {
        let curve = CurveFile {
            tool: "viewfit".to_string(),
            source: None,
            fit: flat_fit(),
            grid: CurveGrid {
                x: vec![1.0, 2.0, 3.0],
                y: vec![30.0, 20.0, 10.0],
            },
        };
        let txt = render_ascii_plot_from_curve_file(&curve, 12, 6);
        assert!(txt.starts_with("Plot: duration=[1.00, 3.00] min"));
        let body: String = txt.lines().skip(1).collect();
        assert!(body.contains('-'));
        assert!(!body.contains('o'));
    }
}
