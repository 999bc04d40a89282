//! Client engine error types.

use thiserror::Error;

/// Error type for rate-limited client operations.
///
/// Only two conditions recover locally (via exponential backoff):
/// HTTP 429 responses and transport-level failures. Everything else is
/// terminal and surfaces immediately to the caller awaiting the task.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration or validation error from the core types.
    #[error(transparent)]
    Core(#[from] leadlens_core::CoreError),

    /// Rate limit still exceeded after exhausting all retries.
    #[error("Rate limit exceeded after {attempts} attempts. Upgrade your plan or wait before retrying")]
    RateLimitExceeded {
        /// Total attempts made, including the initial one.
        attempts: u32,
    },

    /// Non-429, non-2xx HTTP response. Never retried.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the server.
        body: String,
    },

    /// Transport-level failure (connect, reset, timeout). Retried per the
    /// backoff policy and rethrown verbatim once retries are exhausted.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body could not be deserialized.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The task was dropped from the queue by `clear_queue` before it
    /// started.
    #[error("Request cancelled before execution")]
    Cancelled,

    /// Every configured provider failed for an enrichment request.
    #[error("All providers failed: {message}")]
    AllProvidersFailed {
        /// Summary of the provider chain that was attempted.
        message: String,
        /// The terminal error from the last provider tried.
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Returns true for errors that end a task with no further retry.
    ///
    /// All `ClientError` values returned from the engine are terminal by
    /// definition; this distinguishes upstream-fault terminals (worth
    /// falling back to another provider) from caller faults.
    pub fn is_provider_fault(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. }
                | Self::Http { .. }
                | Self::Network(_)
                | Self::InvalidResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ClientError::Http {
            status: 500,
            body: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: internal error");
    }

    #[test]
    fn test_rate_limit_display_mentions_attempts() {
        let err = ClientError::RateLimitExceeded { attempts: 4 };
        assert!(err.to_string().contains("4 attempts"));
    }

    #[test]
    fn test_provider_fault_classification() {
        assert!(ClientError::Http { status: 503, body: String::new() }.is_provider_fault());
        assert!(ClientError::RateLimitExceeded { attempts: 1 }.is_provider_fault());
        assert!(!ClientError::Cancelled.is_provider_fault());
        assert!(
            !ClientError::Core(leadlens_core::CoreError::Validation("bad input".to_string()))
                .is_provider_fault()
        );
    }
}
