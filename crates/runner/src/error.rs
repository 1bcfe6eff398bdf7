//! Typed error enum for the runner crate.

use thiserror::Error;

/// Errors from the execution service. Every variant except
/// `UnsupportedLanguage` means the service could not be used.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl RunnerError {
    /// Whether the sandbox was unreachable or answered with something unusable.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::HttpRequest(_) | Self::HttpStatus { .. } | Self::MalformedResponse(_))
    }
}
