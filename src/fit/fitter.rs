//! Single-start rational curve fitting.
//!
//! Given samples `(x_i, y_i)` and an initial guess `(a₀, b₀, c₀)`, we:
//! - validate the inputs (size, finiteness, target variance)
//! - minimize `Σ (y_i − f(x_i; a, b, c))²` with Levenberg–Marquardt
//! - compute `ŷ_i` with `models::evaluate` and report R², SSE and RMSE
//!
//! The fit is pure: no I/O, no shared state, same output for the same input.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{FitResult, RationalParams, Sample};
use crate::fit::error::{FitError, FitOutcome};
use crate::fit::lm::{LmOptions, levenberg_marquardt};
use crate::math::{is_effectively_constant, r_squared, sum_squared_residuals};
use crate::models::{denominator_is_safe, evaluate, evaluate_many, fill_jacobian_row};

/// Minimum sample count: three parameters plus one residual degree of freedom.
pub const MIN_SAMPLES: usize = 4;

/// Fits `y = (a + b·x) / (1 + c·x)` to samples.
#[derive(Debug, Clone, Default)]
pub struct CurveFitter {
    options: LmOptions,
}

impl CurveFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LmOptions) -> Self {
        Self { options }
    }

    /// Fit the model starting from `initial_guess`.
    pub fn fit(&self, samples: &[Sample], initial_guess: RationalParams) -> FitOutcome<FitResult> {
        validate_samples(samples)?;
        if !initial_guess.is_finite() {
            return Err(FitError::InvalidInput(format!(
                "initial guess must be finite ({initial_guess})"
            )));
        }

        let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
        let ys: Vec<f64> = samples.iter().map(|s| s.y).collect();
        let n = xs.len();

        let residuals = |p: &[f64]| -> Option<DVector<f64>> {
            let params = RationalParams::from_slice(p);
            if !denominator_is_safe(&xs, &params) {
                return None;
            }
            let r = DVector::from_iterator(
                n,
                xs.iter().zip(ys.iter()).map(|(&x, &y)| evaluate(x, &params) - y),
            );
            r.iter().all(|v| v.is_finite()).then_some(r)
        };

        let jacobian = |p: &[f64]| -> DMatrix<f64> {
            let params = RationalParams::from_slice(p);
            let mut jac = DMatrix::<f64>::zeros(n, 3);
            let mut row = [0.0; 3];
            for (i, &x) in xs.iter().enumerate() {
                fill_jacobian_row(x, &params, &mut row);
                for (j, v) in row.iter().enumerate() {
                    jac[(i, j)] = *v;
                }
            }
            jac
        };

        let solution = levenberg_marquardt(
            residuals,
            jacobian,
            &initial_guess.to_array(),
            &self.options,
        )?;
        let params = RationalParams::from_slice(&solution.params);

        if !params.is_finite() || !denominator_is_safe(&xs, &params) {
            return Err(FitError::Convergence(format!(
                "fitted parameters put a pole on the data ({params})"
            )));
        }

        let y_hat = evaluate_many(&xs, &params);
        let sse = sum_squared_residuals(&ys, &y_hat);
        let r_squared = r_squared(&ys, &y_hat).ok_or(FitError::DegenerateInput)?;
        if !(sse.is_finite() && r_squared.is_finite()) {
            return Err(FitError::Convergence("non-finite fit statistics".to_string()));
        }

        debug!(
            %params,
            r_squared,
            sse,
            iterations = solution.iterations,
            stop = ?solution.stop,
            "rational fit converged"
        );

        Ok(FitResult {
            params,
            r_squared,
            sse,
            rmse: (sse / n as f64).sqrt(),
            n,
            iterations: solution.iterations,
        })
    }
}

/// Fit with default solver options.
pub fn fit(samples: &[Sample], initial_guess: RationalParams) -> FitOutcome<FitResult> {
    CurveFitter::new().fit(samples, initial_guess)
}

/// Check the preconditions shared by every fit entry point.
pub fn validate_samples(samples: &[Sample]) -> FitOutcome<()> {
    if samples.len() < MIN_SAMPLES {
        return Err(FitError::InsufficientData {
            got: samples.len(),
            required: MIN_SAMPLES,
        });
    }
    if let Some((i, s)) = samples
        .iter()
        .enumerate()
        .find(|(_, s)| !(s.x.is_finite() && s.y.is_finite()))
    {
        return Err(FitError::InvalidInput(format!(
            "sample {i} is not finite (x={}, y={})",
            s.x, s.y
        )));
    }

    let ys: Vec<f64> = samples.iter().map(|s| s.y).collect();
    if is_effectively_constant(&ys) {
        return Err(FitError::DegenerateInput);
    }

    Ok(())
}
