//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the backend's own text when it sent
    /// one (`{"message": ...}` or `{"error": ...}`).
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// Client configuration is unusable (bad URL, bad header value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the request never got an answer (timeout or connect failure).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_timeout() || e.is_connect())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
