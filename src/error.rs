//! Application-level error with a process exit code.
//!
//! Exit codes:
//! - 2: usage, configuration, or input file problems
//! - 3: not enough usable data after preprocessing
//! - 4: numerical or network failure

use crate::fit::FitError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match err {
            FitError::InvalidInput(_) => 2,
            FitError::InsufficientData { .. } | FitError::DegenerateInput => 3,
            FitError::Convergence(_) => 4,
        };
        AppError::new(exit_code, format!("Curve fit failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let err: AppError = FitError::InsufficientData { got: 2, required: 4 }.into();
        assert_eq!(err.exit_code(), 3);

        let err: AppError = FitError::DegenerateInput.into();
        assert_eq!(err.exit_code(), 3);

        let err: AppError = FitError::Convergence("iteration cap reached".to_string()).into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("iteration cap"));
    }
}
