//! Error types for the analysis engine.
//!
//! Nothing here is fatal to an analysis: lookups that fail are folded into
//! failure markers by the stage that issued them. Only the cancellable entry
//! point surfaces an error to the caller.

use std::time::Duration;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur inside an analysis.
#[derive(Debug, Error)]
pub enum Error {
    /// An external call exceeded its deadline and was dropped.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// What was being attempted.
        operation: &'static str,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// Registry or advisory lookup failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] vetter_info::Error),

    /// A version or range string could not be parsed.
    #[error("Invalid version '{0}': {1}")]
    InvalidVersion(String, String),

    /// The caller cancelled the analysis.
    #[error("Analysis cancelled")]
    Cancelled,
}
