//! Usage-statistics aggregation.

use std::sync::Mutex;
use std::time::Duration;

use leadlens_core::UsageStats;

#[derive(Debug, Default)]
struct Counters {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    rate_limit_hits: u64,
    average_response_time_ms: f64,
}

/// Shared, mutex-guarded usage counters for one client instance.
///
/// The executor records attempts and terminal outcomes; the owning client
/// derives queue length and limiter state at snapshot time. Counters never
/// decrease except through [`StatsRecorder::reset`].
#[derive(Debug, Default)]
pub struct StatsRecorder {
    counters: Mutex<Counters>,
}

impl StatsRecorder {
    /// Creates a recorder with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one network attempt (initial or retry).
    pub fn record_attempt(&self) {
        self.lock().total_requests += 1;
    }

    /// Records one HTTP 429 response.
    pub fn record_rate_limit_hit(&self) {
        self.lock().rate_limit_hits += 1;
    }

    /// Records a successful terminal outcome and folds the response time
    /// into the running mean.
    ///
    /// The mean is computed against the success count *before* this result
    /// is counted: `avg' = (avg * n + latest) / (n + 1)`.
    pub fn record_success(&self, response_time: Duration) {
        let mut counters = self.lock();
        let n = counters.successful_requests as f64;
        let latest_ms = response_time.as_secs_f64() * 1000.0;
        counters.average_response_time_ms =
            (counters.average_response_time_ms * n + latest_ms) / (n + 1.0);
        counters.successful_requests += 1;
    }

    /// Records a failed terminal outcome. Called exactly once per
    /// terminally failed task, regardless of how many attempts it took.
    pub fn record_failure(&self) {
        self.lock().failed_requests += 1;
    }

    /// Zeroes all counters. Does not touch the queue, in-flight tasks, or
    /// the admission window.
    pub fn reset(&self) {
        *self.lock() = Counters::default();
    }

    /// Produces an immutable snapshot, merging in the derived fields.
    pub fn snapshot(
        &self,
        queue_length: usize,
        rate_limiting_enabled: bool,
        requests_per_second: u32,
    ) -> UsageStats {
        let counters = self.lock();
        UsageStats {
            total_requests: counters.total_requests,
            successful_requests: counters.successful_requests,
            failed_requests: counters.failed_requests,
            rate_limit_hits: counters.rate_limit_hits,
            average_response_time_ms: counters.average_response_time_ms,
            queue_length,
            rate_limiting_enabled,
            requests_per_second,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        // Counter updates cannot panic, so the lock cannot be poisoned.
        self.counters.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
