//! Typed error enum for the service layer.
//!
//! Folds domain, storage and relay failures into the taxonomy the command
//! surface reports: validation, not found, conflict, forbidden, unavailable
//! and internal.

use pathbot_core::CoreError;
use pathbot_runner::RunnerError;
use pathbot_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage failure that is not a not-found or duplicate outcome.
    #[error("storage: {0}")]
    Storage(#[source] StorageError),

    /// Bad user input; the command is not applied.
    #[error("{0}")]
    Validation(String),

    /// A date that does not parse as `YYYY-MM-DD`. Callers ask for a corrected value.
    #[error("The date '{value}' is not in the correct format (YYYY-MM-DD).")]
    InvalidDate { value: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    /// An optional backend (the execution relay) has no credentials.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The execution service could not be reached or answered garbage.
    #[error("could not reach execution service: {0}")]
    ExecutionUnavailable(#[source] RunnerError),
}

impl ServiceError {
    /// Stable machine-readable kind, reported with every error reply.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidDate { .. } => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Forbidden(_) => "forbidden",
            Self::NotConfigured(_) | Self::ExecutionUnavailable(_) => "unavailable",
            Self::Storage(_) => "internal",
        }
    }

    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::ExecutionUnavailable(e) => e.is_transport(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether details must stay out of user-facing replies.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidDateFormat { value } => Self::InvalidDate { value },
            CoreError::InvalidInput(msg) | CoreError::Navigation(msg) => Self::Validation(msg),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id} not found")),
            StorageError::Duplicate(msg) => Self::Conflict(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<RunnerError> for ServiceError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::UnsupportedLanguage(lang) => {
                Self::Validation(format!("Unsupported language: {lang}"))
            },
            RunnerError::ClientInit(msg) => Self::NotConfigured(msg),
            other => Self::ExecutionUnavailable(other),
        }
    }
}
