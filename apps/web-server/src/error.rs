//! Server error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::session::SessionError;

/// Server error type.
///
/// Every variant answers with a plain 500; the detail only goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Session error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");

        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
