//! Error types for vetter-info

use thiserror::Error;

/// Result type alias for vetter-info operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vetter-info operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid package name format
    #[error("Invalid package name: {0}")]
    InvalidPackageName(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Resource not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded for URL: {0}")]
    RateLimitExceeded(String),

    /// Any other non-success status
    #[error("HTTP request failed with status {status}: {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Batch response did not line up with the request
    #[error("Advisory response has {actual} results for {expected} queries")]
    MisalignedResponse {
        /// Number of queries sent
        expected: usize,
        /// Number of results received
        actual: usize,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether the remote side reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
