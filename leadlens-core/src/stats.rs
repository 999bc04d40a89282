//! Usage statistics snapshot types.

use serde::{Deserialize, Serialize};

/// An immutable snapshot of a client's usage statistics.
///
/// Counter fields reflect activity since construction or the last reset;
/// the remaining fields are derived from the client's live state at
/// snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Attempts made, including retries.
    pub total_requests: u64,
    /// Tasks that reached a successful terminal outcome.
    pub successful_requests: u64,
    /// Tasks that reached a failed terminal outcome.
    pub failed_requests: u64,
    /// HTTP 429 responses observed, one per rate-limited attempt.
    pub rate_limit_hits: u64,
    /// Running mean of successful response times in milliseconds.
    pub average_response_time_ms: f64,
    /// Tasks queued but not yet started.
    pub queue_length: usize,
    /// Whether the sliding-window limiter is active.
    pub rate_limiting_enabled: bool,
    /// Current rate limit in requests per second.
    pub requests_per_second: u32,
}

impl UsageStats {
    /// Total terminal outcomes observed (successes plus failures).
    pub fn completed_requests(&self) -> u64 {
        self.successful_requests + self.failed_requests
    }
}
