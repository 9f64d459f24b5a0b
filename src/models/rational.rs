//! The rational response curve `y = (a + b·x) / (1 + c·x)`.
//!
//! The fitter relies on two primitive operations:
//! - predict `y(x)` given the coefficients (for residuals, R², plots)
//! - fill a Jacobian row `∂y/∂(a, b, c)` at a given `x` (for the solver)
//!
//! Both share `denominator` so fit-time and evaluate-time values never drift.

use crate::domain::RationalParams;

/// Smallest `|1 + c·x|` we still treat as a usable denominator.
pub const DENOM_EPS: f64 = 1e-12;

/// `1 + c·x`.
#[inline]
pub fn denominator(x: f64, params: &RationalParams) -> f64 {
    1.0 + params.c * x
}

/// Evaluate the model at `x`.
///
/// Returns a non-finite value when the denominator vanishes; callers decide how
/// to treat that.
#[inline]
pub fn evaluate(x: f64, params: &RationalParams) -> f64 {
    (params.a + params.b * x) / denominator(x, params)
}

/// Evaluate the model over a slice of `x` values.
pub fn evaluate_many(xs: &[f64], params: &RationalParams) -> Vec<f64> {
    xs.iter().map(|&x| evaluate(x, params)).collect()
}

/// True when `1 + c·x` stays away from zero for every `x`.
pub fn denominator_is_safe(xs: &[f64], params: &RationalParams) -> bool {
    xs.iter()
        .all(|&x| denominator(x, params).abs() > DENOM_EPS)
}

/// Fill the Jacobian row `[∂y/∂a, ∂y/∂b, ∂y/∂c]` at `x`.
///
/// # Panics
/// Panics if `out` has fewer than 3 elements.
pub fn fill_jacobian_row(x: f64, params: &RationalParams, out: &mut [f64]) {
    let d = denominator(x, params);
    out[0] = 1.0 / d;
    out[1] = x / d;
    out[2] = -x * (params.a + params.b * x) / (d * d);
}
