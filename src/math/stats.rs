//! Summary statistics for fit quality.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `Σ (y_i − ȳ)²`.
pub fn total_sum_of_squares(y: &[f64]) -> f64 {
    let Some(y_bar) = mean(y) else {
        return 0.0;
    };
    y.iter().map(|&v| (v - y_bar) * (v - y_bar)).sum()
}

/// `Σ (y_i − ŷ_i)²`.
pub fn sum_squared_residuals(y: &[f64], y_hat: &[f64]) -> f64 {
    y.iter()
        .zip(y_hat.iter())
        .map(|(&obs, &fit)| (obs - fit) * (obs - fit))
        .sum()
}

/// True when `y` has no variance beyond float rounding.
///
/// `SS_tot` must exceed `ε · n · ȳ²`; below that the spread is indistinguishable
/// from rounding in the mean and R² is meaningless.
pub fn is_effectively_constant(y: &[f64]) -> bool {
    let Some(y_bar) = mean(y) else {
        return true;
    };
    let ss_tot = total_sum_of_squares(y);
    !ss_tot.is_finite() || ss_tot <= 0.0 || ss_tot <= f64::EPSILON * y.len() as f64 * y_bar * y_bar
}

/// Coefficient of determination `1 − SS_res / SS_tot`.
///
/// Returns `None` when the target has no usable variance (R² undefined).
pub fn r_squared(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if is_effectively_constant(y) {
        return None;
    }
    let ss_tot = total_sum_of_squares(y);
    Some(1.0 - sum_squared_residuals(y, y_hat) / ss_tot)
}
