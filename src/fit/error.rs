use thiserror::Error;

/// Simplified `Result` using [`FitError`] as error type.
pub type FitOutcome<T> = std::result::Result<T, FitError>;

/// Failure modes of the curve fitter.
///
/// None of these are recovered from inside the fitter: the caller decides whether
/// to retry with other initial guesses, fall back to another model, or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Fewer samples than the fit requires.
    #[error("insufficient data: got {got} samples, need at least {required}")]
    InsufficientData { got: usize, required: usize },
    /// Every observed `y` is identical, so R² is undefined.
    #[error("degenerate input: all target values are identical")]
    DegenerateInput,
    /// The solver failed to converge, or hit a pole of the model.
    #[error("did not converge: {0}")]
    Convergence(String),
    /// Non-finite samples or initial guess.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
