//! Core error types for `LeadLens`.

use thiserror::Error;

/// Core error type for `LeadLens` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration (missing API key, unknown tier or model).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Malformed caller input, rejected before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),
}
