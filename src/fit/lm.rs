//! Levenberg–Marquardt solver for small nonlinear least-squares problems.
//!
//! Minimizes `‖r(p)‖²` from a starting point `p0`, given closures for the
//! residual vector and its Jacobian. Each iteration:
//!
//! - solves the damped step `min ‖J δ + r‖² + λ ‖D δ‖²` (see `math::ols`)
//! - accepts the step only if it lowers the cost, shrinking `λ`
//! - otherwise grows `λ` and retries from the same point
//!
//! `D` is the Marquardt scaling: the running maximum of the Jacobian column norms.
//! The solver is deterministic: same inputs, same iterates.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use crate::fit::error::{FitError, FitOutcome};
use crate::math::solve_damped_step;

/// Solver tolerances and limits.
#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Maximum number of outer iterations (Jacobian evaluations).
    pub max_iter: usize,
    /// Relative tolerance on actual and predicted cost reduction.
    pub f_tol: f64,
    /// Relative tolerance on the step length.
    pub x_tol: f64,
    pub lambda_init: f64,
    pub lambda_up: f64,
    pub lambda_down: f64,
    /// Damping beyond which no descent step exists (the point is stationary).
    pub lambda_max: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            f_tol: 1.49e-8,
            x_tol: 1.49e-8,
            lambda_init: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            lambda_max: 1e16,
        }
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Residuals are exactly zero.
    ExactFit,
    /// Actual and predicted relative reductions fell below `f_tol`.
    CostTolerance,
    /// The accepted step was below `x_tol` relative to the parameters.
    StepTolerance,
    /// No damped step lowers the cost (first-order stationary point).
    Stationary,
}

/// Converged solver output.
#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: Vec<f64>,
    /// `‖r‖²` at `params`.
    pub cost: f64,
    pub iterations: usize,
    pub stop: StopReason,
}

/// Run Levenberg–Marquardt.
///
/// `residuals` returns `None` when the model is not finite at the given
/// parameters; such trial steps are rejected like any other uphill step.
pub fn levenberg_marquardt<R, J>(
    residuals: R,
    jacobian: J,
    p0: &[f64],
    options: &LmOptions,
) -> FitOutcome<LmSolution>
where
    R: Fn(&[f64]) -> Option<DVector<f64>>,
    J: Fn(&[f64]) -> DMatrix<f64>,
{
    let n = p0.len();
    if n == 0 {
        return Err(FitError::InvalidInput("empty initial guess".to_string()));
    }

    let mut p = DVector::from_column_slice(p0);
    let mut r = residuals(p.as_slice()).ok_or_else(|| {
        FitError::Convergence("model is not finite at the initial guess".to_string())
    })?;
    let mut cost = r.norm_squared();
    let mut lambda = options.lambda_init;
    let mut scale = vec![0.0_f64; n];

    for iter in 0..options.max_iter {
        if cost == 0.0 {
            return Ok(solution(p, cost, iter, StopReason::ExactFit));
        }

        let jac = jacobian(p.as_slice());
        if jac.iter().any(|v| !v.is_finite()) {
            return Err(FitError::Convergence(format!(
                "non-finite Jacobian at iteration {iter}"
            )));
        }

        let gradient = jac.transpose() * &r;
        if gradient.amax() == 0.0 {
            return Ok(solution(p, cost, iter, StopReason::Stationary));
        }

        for (j, s) in scale.iter_mut().enumerate() {
            *s = s.max(jac.column(j).norm());
        }

        // Inner loop: raise damping until a step lowers the cost.
        loop {
            if let Some(step) = solve_damped_step(&jac, &r, lambda, &scale) {
                let p_new = &p + &step;
                if let Some(r_new) = residuals(p_new.as_slice()) {
                    let cost_new = r_new.norm_squared();
                    if cost_new < cost {
                        let predicted = cost - (&r + &jac * &step).norm_squared();
                        let actual_rel = (cost - cost_new) / cost;
                        let predicted_rel = predicted / cost;
                        let small_step =
                            step.norm() <= options.x_tol * (p.norm() + options.x_tol);

                        trace!(iter, lambda, cost = cost_new, "lm step accepted");
                        p = p_new;
                        r = r_new;
                        cost = cost_new;
                        lambda = (lambda * options.lambda_down).max(1e-15);

                        if actual_rel <= options.f_tol && predicted_rel <= options.f_tol {
                            return Ok(solution(p, cost, iter + 1, StopReason::CostTolerance));
                        }
                        if small_step {
                            return Ok(solution(p, cost, iter + 1, StopReason::StepTolerance));
                        }
                        break;
                    }
                }
            }

            lambda *= options.lambda_up;
            if lambda > options.lambda_max {
                debug!(iter, cost, "lm damping exhausted; treating point as stationary");
                return Ok(solution(p, cost, iter + 1, StopReason::Stationary));
            }
        }
    }

    Err(FitError::Convergence(format!(
        "iteration cap of {} reached (cost={cost:.6e})",
        options.max_iter
    )))
}

fn solution(p: DVector<f64>, cost: f64, iterations: usize, stop: StopReason) -> LmSolution {
    LmSolution {
        params: p.iter().copied().collect(),
        cost,
        iterations,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn exp_problem() -> (Vec<f64>, Vec<f64>) {
        let xs: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * (-0.5 * x).exp()).collect();
        (xs, ys)
    }

    #[test]
    fn fits_linear_model() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 5.0, 7.0, 9.0];

        let res = |p: &[f64]| {
            Some(DVector::from_iterator(
                xs.len(),
                xs.iter().zip(ys.iter()).map(|(&x, &y)| p[0] + p[1] * x - y),
            ))
        };
        let jac = |_: &[f64]| {
            DMatrix::from_fn(xs.len(), 2, |i, j| if j == 0 { 1.0 } else { xs[i] })
        };

        let sol = levenberg_marquardt(res, jac, &[0.0, 0.0], &LmOptions::default()).unwrap();
        assert_abs_diff_eq!(sol.params[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.params[1], 2.0, epsilon = 1e-6);
        assert!(sol.cost < 1e-12);
    }

    #[test]
    fn fits_exponential_decay() {
        let (xs, ys) = exp_problem();
        let res = |p: &[f64]| {
            Some(DVector::from_iterator(
                xs.len(),
                xs.iter()
                    .zip(ys.iter())
                    .map(|(&x, &y)| p[0] * (-p[1] * x).exp() - y),
            ))
        };
        let jac = |p: &[f64]| {
            DMatrix::from_fn(xs.len(), 2, |i, j| {
                let e = (-p[1] * xs[i]).exp();
                if j == 0 { e } else { -p[0] * xs[i] * e }
            })
        };

        let sol = levenberg_marquardt(res, jac, &[1.0, 1.0], &LmOptions::default()).unwrap();
        assert_abs_diff_eq!(sol.params[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.params[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn non_finite_start_is_a_convergence_error() {
        let res = |_: &[f64]| -> Option<DVector<f64>> { None };
        let jac = |_: &[f64]| DMatrix::zeros(1, 1);
        let err = levenberg_marquardt(res, jac, &[1.0], &LmOptions::default()).unwrap_err();
        assert!(matches!(err, FitError::Convergence(_)));
    }

    #[test]
    fn exhausted_damping_stops_as_stationary() {
        // The Jacobian has the wrong sign, so every damped step goes uphill.
        let res = |p: &[f64]| Some(DVector::from_element(1, p[0]));
        let jac = |_: &[f64]| DMatrix::from_element(1, 1, -1.0);

        let sol = levenberg_marquardt(res, jac, &[1.0], &LmOptions::default()).unwrap();
        assert_eq!(sol.stop, StopReason::Stationary);
        assert_eq!(sol.params, vec![1.0]);
        assert_eq!(sol.cost, 1.0);
        assert_eq!(sol.iterations, 1);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let (xs, ys) = exp_problem();
        let res = |p: &[f64]| {
            Some(DVector::from_iterator(
                xs.len(),
                xs.iter()
                    .zip(ys.iter())
                    .map(|(&x, &y)| p[0] * (-p[1] * x).exp() - y),
            ))
        };
        let jac = |p: &[f64]| {
            DMatrix::from_fn(xs.len(), 2, |i, j| {
                let e = (-p[1] * xs[i]).exp();
                if j == 0 { e } else { -p[0] * xs[i] * e }
            })
        };
        let options = LmOptions {
            max_iter: 1,
            ..LmOptions::default()
        };

        let err = levenberg_marquardt(res, jac, &[10.0, 3.0], &options).unwrap_err();
        assert!(matches!(err, FitError::Convergence(msg) if msg.contains("iteration cap")));
    }
}
