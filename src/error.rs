//! Error types.
//!
//! - `KineticsError`: typed failures of ingest and fitting (library core)
//! - `AppError`: message + process exit code, used at the CLI/TUI edge

use thiserror::Error;

/// Exit code for usage, IO and parse errors.
pub const EXIT_USAGE: u8 = 2;
/// Exit code when no complete observation pairs were supplied.
pub const EXIT_EMPTY: u8 = 3;
/// Exit code for fit failures.
pub const EXIT_FIT: u8 = 4;

/// Which column of an observation a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Time,
    Quantity,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Time => write!(f, "time"),
            Field::Quantity => write!(f, "quantity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KineticsError {
    #[error("No data available for fitting kinetics.")]
    EmptyInput,

    #[error("times and quantities have different lengths: {times} vs {quantities}")]
    LengthMismatch { times: usize, quantities: usize },

    #[error("row {row}: {field} '{text}' is not a finite number")]
    InvalidNumber { row: usize, field: Field, text: String },

    #[error(
        "row {row}: quantity {quantity} is not below the dissolution scale {scale}; \
         ln({scale} - quantity) is undefined"
    )]
    InvalidInput { row: usize, quantity: f64, scale: f64 },

    #[error("{model}: degenerate data ({reason})")]
    Degenerate { model: &'static str, reason: String },

    #[error("{model}: optimizer did not converge after {iterations} iterations")]
    NonConvergence { model: &'static str, iterations: usize },
}

impl KineticsError {
    pub fn exit_code(&self) -> u8 {
        match self {
            KineticsError::EmptyInput => EXIT_EMPTY,
            KineticsError::LengthMismatch { .. } | KineticsError::InvalidNumber { .. } => EXIT_USAGE,
            KineticsError::InvalidInput { .. }
            | KineticsError::Degenerate { .. }
            | KineticsError::NonConvergence { .. } => EXIT_FIT,
        }
    }

    /// Empty input is a warning for the user, not a failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, KineticsError::EmptyInput)
    }
}

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
}

impl From<KineticsError> for AppError {
    fn from(err: KineticsError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinetics_errors_map_to_exit_codes() {
        let empty: AppError = KineticsError::EmptyInput.into();
        assert_eq!(empty.exit_code(), EXIT_EMPTY);

        let parse: AppError = KineticsError::InvalidNumber {
            row: 3,
            field: Field::Quantity,
            text: "abc".to_string(),
        }
        .into();
        assert_eq!(parse.exit_code(), EXIT_USAGE);
        assert!(parse.to_string().contains("row 3"));

        let domain: AppError = KineticsError::InvalidInput { row: 1, quantity: 100.0, scale: 100.0 }.into();
        assert_eq!(domain.exit_code(), EXIT_FIT);
    }
}
