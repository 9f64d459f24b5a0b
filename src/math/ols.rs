//! Linear least-squares solves used by the nonlinear solver.
//!
//! Each Levenberg–Marquardt iteration needs the step `δ` minimizing
//!
//! ```text
//! ‖J δ + r‖² + λ ‖D δ‖²
//! ```
//!
//! which is the ordinary least-squares problem on the stacked system
//! `[J; √λ·D] δ = [-r; 0]`. Solving that with SVD avoids forming `JᵀJ`, which
//! squares the condition number and hurts when `c` pushes the Jacobian columns
//! close to collinear.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    // Nalgebra's `QR::solve` only handles square systems, and the stacked LM
    // system is always tall.
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve the damped step `min ‖J δ + r‖² + λ ‖diag(scale) δ‖²`.
///
/// `scale` holds the Marquardt column scaling (typically the column norms of
/// `J`). Entries are floored so that a column of zeros still gets damped.
pub fn solve_damped_step(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
    lambda: f64,
    scale: &[f64],
) -> Option<DVector<f64>> {
    let m = jacobian.nrows();
    let n = jacobian.ncols();
    debug_assert_eq!(residuals.len(), m);
    debug_assert_eq!(scale.len(), n);

    let sqrt_lambda = lambda.max(0.0).sqrt();
    let mut a = DMatrix::<f64>::zeros(m + n, n);
    let mut rhs = DVector::<f64>::zeros(m + n);

    a.view_mut((0, 0), (m, n)).copy_from(jacobian);
    for i in 0..m {
        rhs[i] = -residuals[i];
    }
    for j in 0..n {
        a[(m + j, j)] = sqrt_lambda * scale[j].max(1e-12);
    }

    solve_least_squares(&a, &rhs)
}
