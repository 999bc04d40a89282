//! Retry and execution policy for one network task.
//!
//! One attempt is an HTTP send plus response handling. HTTP 429 and
//! transport-level failures back off exponentially and retry; every other
//! non-2xx status is terminal on the first sighting. The attempt loop is
//! iterative, never recursive.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::stats::StatsRecorder;

/// Retry policy: how many times to retry and how long to back off.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts after the initial one.
    pub max_retries: u32,
    /// Base delay; attempt `n` (zero-based) waits `retry_delay * 2^n`.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Backoff delay before retrying after the given zero-based attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.retry_delay * 2u32.saturating_pow(attempt)
    }

    /// Executes a request, retrying per this policy, and deserializes the
    /// successful response body.
    ///
    /// Statistics contract: `total_requests` is bumped on every attempt;
    /// `rate_limit_hits` on every 429; the terminal outcome (success or
    /// failure) is recorded exactly once per call, after the last attempt.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RateLimitExceeded`] after `max_retries + 1`
    ///   consecutive 429 responses.
    /// - [`ClientError::Http`] immediately for any other non-2xx status.
    /// - [`ClientError::Network`] once transport failures exhaust the
    ///   retries, wrapping the last underlying error.
    /// - [`ClientError::InvalidResponse`] if a 2xx body fails to parse.
    pub async fn execute<T>(
        &self,
        request: reqwest::RequestBuilder,
        stats: Arc<StatsRecorder>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let mut attempt: u32 = 0;

        loop {
            stats.record_attempt();
            let started = Instant::now();

            let Some(cloned) = request.try_clone() else {
                stats.record_failure();
                return Err(ClientError::InvalidResponse(
                    "request body is not cloneable".to_string(),
                ));
            };

            match cloned.send().await {
                Ok(response) => {
                    let status = response.status();
                    let elapsed = started.elapsed();

                    if status.is_success() {
                        let body = match response.text().await {
                            Ok(body) => body,
                            Err(err) => {
                                stats.record_failure();
                                return Err(ClientError::Network(err));
                            }
                        };
                        return match serde_json::from_str(&body) {
                            Ok(parsed) => {
                                stats.record_success(elapsed);
                                Ok(parsed)
                            }
                            Err(err) => {
                                warn!(error = %err, "Failed to parse response body");
                                stats.record_failure();
                                Err(ClientError::InvalidResponse(err.to_string()))
                            }
                        };
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        stats.record_rate_limit_hit();
                        if attempt < self.max_retries {
                            let delay = self.delay_for_attempt(attempt);
                            debug!(attempt, ?delay, "Rate limited, backing off");
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            continue;
                        }
                        stats.record_failure();
                        return Err(ClientError::RateLimitExceeded {
                            attempts: attempt + 1,
                        });
                    }

                    // Any other non-2xx status is terminal.
                    let body = response.text().await.unwrap_or_default();
                    stats.record_failure();
                    return Err(ClientError::Http {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => {
                    // Transport failure: no HTTP response at all.
                    if attempt < self.max_retries {
                        let delay = self.delay_for_attempt(attempt);
                        warn!(error = %err, attempt, ?delay, "Network error, backing off");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    stats.record_failure();
                    return Err(ClientError::Network(err));
                }
            }
        }
    }
}
