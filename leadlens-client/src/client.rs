//! The rate-limited client core shared by all provider facades.

use std::sync::Arc;
use std::time::Duration;

use leadlens_core::{ClientConfig, CoreError, RateTier, UsageStats};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::ClientError;
use crate::executor::RetryPolicy;
use crate::scheduler::Scheduler;
use crate::stats::StatsRecorder;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A rate-limited, retrying HTTP client bound to one API host and key.
///
/// Every request funnels through the instance's [`Scheduler`], so the
/// sliding-window limit holds across all callers sharing the instance (and
/// only within it; separate instances, and separate processes, enforce
/// their own limits). Cloning is cheap and shares the queue, window, and
/// statistics.
#[derive(Clone)]
pub struct RateLimitedClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    retry: RetryPolicy,
    scheduler: Arc<Scheduler>,
    stats: Arc<StatsRecorder>,
}

impl RateLimitedClient {
    /// Creates a client from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the underlying HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("leadlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let retry = RetryPolicy::new(config.max_retries, config.retry_delay);
        let scheduler = Scheduler::new(config.requests_per_second, config.enable_rate_limiting);

        Ok(Self {
            http,
            config: Arc::new(config),
            retry,
            scheduler,
            stats: Arc::new(StatsRecorder::new()),
        })
    }

    /// The config this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issues a rate-limited GET with the given query pairs.
    ///
    /// # Errors
    ///
    /// See [`RetryPolicy::execute`] for the error taxonomy; additionally
    /// [`ClientError::Cancelled`] if the task is dropped by
    /// [`clear_queue`](Self::clear_queue) before starting.
    #[instrument(skip(self, query), fields(host = %self.config.api_host))]
    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = self
            .http
            .get(format!("{}{}", self.config.base_url(), path))
            .query(query)
            .header("x-rapidapi-host", &self.config.api_host)
            .header("x-rapidapi-key", &self.config.api_key);

        let retry = self.retry.clone();
        let stats = Arc::clone(&self.stats);
        self.scheduler
            .enqueue(async move { retry.execute(request, stats).await })
            .await
    }

    /// Issues a rate-limited POST with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[instrument(skip(self, body), fields(host = %self.config.api_host))]
    pub async fn post_json<T>(&self, path: &str, body: serde_json::Value) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = self
            .http
            .post(format!("{}{}", self.config.base_url(), path))
            .header("content-type", "application/json")
            .header("x-rapidapi-host", &self.config.api_host)
            .header("x-rapidapi-key", &self.config.api_key)
            .json(&body);

        let retry = self.retry.clone();
        let stats = Arc::clone(&self.stats);
        self.scheduler
            .enqueue(async move { retry.execute(request, stats).await })
            .await
    }

    /// Updates the rate limit, effective from the next scheduling decision.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] for a zero limit, leaving the
    /// current limit unchanged.
    pub fn set_rate_limit(&self, requests_per_second: u32) -> Result<(), CoreError> {
        self.scheduler.set_rate_limit(requests_per_second)
    }

    /// Applies a named tier preset's rate limit.
    pub fn set_tier(&self, tier: RateTier) {
        // Tier presets are a closed set with non-zero limits, so this
        // cannot fail.
        let _ = self.scheduler.set_rate_limit(tier.requests_per_second());
    }

    /// Snapshot of usage statistics, including derived queue state.
    pub fn stats(&self) -> UsageStats {
        self.stats.snapshot(
            self.scheduler.queue_len(),
            self.scheduler.rate_limiting_enabled(),
            self.scheduler.rate_limit(),
        )
    }

    /// Zeroes all counters without touching queued or in-flight work.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Waits until the queue is empty and the pump has stopped.
    pub async fn flush(&self) {
        self.scheduler.flush().await;
    }

    /// Drops all queued, not-yet-started tasks; their callers receive
    /// [`ClientError::Cancelled`].
    pub fn clear_queue(&self) {
        self.scheduler.clear_queue();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(rps: u32) -> RateLimitedClient {
        let config = ClientConfig::builder("test-key", "api.example.com")
            .requests_per_second(rps)
            .build()
            .unwrap();
        RateLimitedClient::new(config).unwrap()
    }

    #[test]
    fn test_initial_stats_snapshot() {
        let client = client(2);
        let stats = client.stats();

        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.queue_length, 0);
        assert!(stats.rate_limiting_enabled);
        assert_eq!(stats.requests_per_second, 2);
    }

    #[test]
    fn test_set_rate_limit_validation() {
        let client = client(1);
        assert!(client.set_rate_limit(0).is_err());
        assert_eq!(client.stats().requests_per_second, 1);

        client.set_rate_limit(10).unwrap();
        assert_eq!(client.stats().requests_per_second, 10);
    }

    #[test]
    fn test_set_tier_updates_rate_limit() {
        let client = client(1);
        client.set_tier(RateTier::Mega);
        assert_eq!(client.stats().requests_per_second, 20);
    }
}
