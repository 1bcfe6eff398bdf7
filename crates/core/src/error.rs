use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by pure domain logic (input validation, date parsing).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid date format '{value}', expected YYYY-MM-DD")]
    InvalidDateFormat { value: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("navigation: {0}")]
    Navigation(String),
}

impl CoreError {
    /// Whether the caller should prompt the user for corrected input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidDateFormat { .. } | Self::InvalidInput(_))
    }
}

pub type Result<T> = StdResult<T, CoreError>;
