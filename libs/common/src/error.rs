//! Custom error types for the session and directory clients
//!
//! This module defines the error taxonomy shared by the session client and
//! its consumers. Session-lifecycle errors (`SessionExpired`,
//! `RefreshFailed`) are resolved inside the HTTP client's refresh path and
//! only reach callers as the final rejection after a failed refresh; all
//! other variants pass through for caller-level handling.

use thiserror::Error;

/// Custom error type for authentication and API operations
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login rejected by the server; carries the server's message
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Access credential rejected (401) and not recoverable by this request
    #[error("session expired")]
    SessionExpired,

    /// Refresh credential missing, expired, or rejected; fatal to the session
    #[error("session refresh failed: {0}")]
    RefreshFailed(String),

    /// Authenticated but not permitted (403); no session-state change
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Server-side failure (5xx)
    #[error("server error: status {0}")]
    Server(u16),

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Credential persistence failure
    #[error("credential storage error: {0}")]
    Storage(#[source] std::io::Error),

    /// Response body did not match the expected shape
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Client configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Client-side input validation failure
    #[error("validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AuthError
pub type AuthResult<T> = Result<T, AuthError>;

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err)
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Storage(err)
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Decode(err)
    }
}

impl AuthError {
    /// Whether this error terminated the session (caller should prompt for
    /// a fresh login rather than retry)
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, AuthError::RefreshFailed(_) | AuthError::SessionExpired)
    }
}
