//! Common error types for Photogate.

use thiserror::Error;

/// Top-level error type for Photogate operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connection refused, reset, DNS, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Backend answered 401; the session is missing or expired.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// Backend answered 403.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status.
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this failure is a timeout and therefore eligible for retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Whether the caller must re-run the authentication flow.
    pub fn requires_login(&self) -> bool {
        matches!(self, Error::NotAuthenticated(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
