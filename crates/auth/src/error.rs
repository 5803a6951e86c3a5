//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during the authorization code flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider discovery failed.
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// The provider redirected back with an error.
    #[error("Provider returned {error}: {description}")]
    Provider {
        /// OAuth error code.
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// Invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Code exchange failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// ID token validation failed.
    #[error("ID token validation failed: {0}")]
    IdToken(String),

    /// ID token expired.
    #[error("ID token expired")]
    TokenExpired,

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::IdToken(e.to_string()),
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
