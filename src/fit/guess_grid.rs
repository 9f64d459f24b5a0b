//! Initial-guess grids for multi-start fitting.
//!
//! The solver is local, and the rational model has a pole wherever `1 + c·x = 0`,
//! so the starting `c` matters most. We vary `c` on a log-spaced grid (both signs
//! are not needed: durations are positive and a negative `c` puts a pole inside
//! the data range) and keep `a`, `b` from the base guess.

use crate::domain::RationalParams;
use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    Ok((0..steps).map(|i| (ln_min + step * i as f64).exp()).collect())
}

/// Build a guess grid: the base guess first, then one guess per `c` value.
pub fn guess_grid(
    base: RationalParams,
    c_min: f64,
    c_max: f64,
    steps: usize,
) -> Result<Vec<RationalParams>, AppError> {
    let mut out = vec![base];
    for c in log_space(c_min, c_max, steps)? {
        if c != base.c {
            out.push(RationalParams { c, ..base });
        }
    }
    Ok(out)
}

/// Grid used by `fit --multistart`: `c` from 1e-3 to 10.
pub fn default_guess_grid(base: RationalParams) -> Vec<RationalParams> {
    // The range is a valid constant, so the fallback is never taken.
    guess_grid(base, 1e-3, 10.0, 9).unwrap_or_else(|_| vec![base])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert_relative_eq!(v[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(v[v.len() - 1], 10.0, epsilon = 1e-12);
        assert_relative_eq!(v[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn log_space_rejects_bad_ranges() {
        assert_eq!(log_space(0.0, 1.0, 5).unwrap_err().exit_code(), 2);
        assert_eq!(log_space(2.0, 1.0, 5).unwrap_err().exit_code(), 2);
        assert_eq!(log_space(0.1, 1.0, 1).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn grid_starts_with_base_and_varies_only_c() {
        let base = RationalParams::DEFAULT_GUESS;
        let grid = default_guess_grid(base);
        assert_eq!(grid[0], base);
        assert!(grid.len() > 5);
        for g in &grid[1..] {
            assert_eq!(g.a, base.a);
            assert_eq!(g.b, base.b);
            assert!(g.c > 0.0);
        }
    }
}
