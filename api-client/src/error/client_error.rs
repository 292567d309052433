//! HTTP transport errors.

use thiserror::Error;

/// Errors from the transport layer while an operation is dispatched.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying `reqwest` call failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success HTTP status code.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: u16,
        /// Response body, or the canonical reason when the body is empty.
        message: String,
    },

    /// Request exceeded the configured timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        duration_ms: u64,
    },

    /// A send handler could not deliver the request.
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl ClientError {
    /// Returns `true` if resending the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
        }
    }

    /// Returns the HTTP status code if the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
