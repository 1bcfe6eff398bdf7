//! Typed API error for HTTP handlers.
//!
//! Only transport-level failures become HTTP errors: unknown commands, unknown
//! sessions and foreign session owners. Domain failures are replied to the user
//! as an `error` reply instead, see [`error_reply`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pathbot_service::ServiceError;

use crate::api_types::CommandReply;

/// API error with HTTP status code and human-readable message.
///
/// Converts to JSON response: `{"error": "message"}`.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: malformed request from the gateway.
    BadRequest(String),
    /// 403 Forbidden: the caller does not own the session.
    Forbidden(String),
    /// 404 Not Found: unknown command, or unknown or expired session.
    NotFound(String),
    /// 500 Internal Server Error: unexpected failure. Details logged, not exposed.
    Internal(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::BadRequest(msg),
            ServiceError::InvalidDate { .. } => Self::BadRequest(err.to_string()),
            ServiceError::NotFound(msg) => Self::NotFound(msg),
            ServiceError::Forbidden(msg) => Self::Forbidden(msg),
            _ => Self::Internal(err),
        }
    }
}

/// User-facing reply for a failed operation.
///
/// Internal failures are logged server-side and replaced by a generic text.
pub fn error_reply(err: &ServiceError) -> CommandReply {
    if err.is_internal() {
        tracing::error!(error = %err, "internal error while handling command");
        return CommandReply::error(err.kind(), "Something went wrong, please try again later.");
    }
    tracing::debug!(kind = err.kind(), error = %err, "command failed");
    CommandReply::error(err.kind(), err.to_string())
}
