//! Store client error types.

use std::sync::Arc;

/// Errors from the table store clients.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store URL or key not configured.
    #[error("store not configured: {0}")]
    MissingConfig(String),

    /// A row failed validation before it was sent.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// The store rejected the API key.
    #[error("authentication failed: store rejected the API key")]
    AuthError,

    /// No row with this id.
    #[error("row {0} not found")]
    NotFound(i64),

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { StoreError::Timeout } else { StoreError::Network(Arc::new(err)) }
    }
}

impl From<StoreError> for kiteshell_core::Error {
    fn from(err: StoreError) -> Self {
        use kiteshell_core::Error;

        match err {
            StoreError::MissingConfig(msg) => Error::Config(msg),
            StoreError::Invalid(msg) => Error::InvalidInput(msg),
            StoreError::AuthError => Error::Unauthorized(err.to_string()),
            StoreError::NotFound(id) => Error::InvalidInput(format!("row {id} not found")),
            StoreError::HttpError { .. } | StoreError::Parse(_) => Error::HttpError(err.to_string()),
            StoreError::Timeout | StoreError::Network(_) => Error::Network(err.to_string()),
        }
    }
}
