//! Sliding-window request scheduler.
//!
//! Admits queued tasks under a trailing one-second window: bursts of up to
//! `requests_per_second` tasks start back-to-back, then the pump pauses
//! until the oldest admission falls out of the window. This is not a token
//! bucket; the burst-then-full-pause behavior is load-bearing for callers
//! tuned to the upstream RapidAPI plans.
//!
//! Each client instance owns one scheduler. At most one pump task is
//! dequeuing at any time, guarded by a flag held under the state mutex; the
//! pump exits when the queue drains and is respawned by the next enqueue.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use leadlens_core::CoreError;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::ClientError;

/// Length of the trailing admission window.
const WINDOW: Duration = Duration::from_millis(1000);

/// Poll interval used by [`Scheduler::flush`].
const FLUSH_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A queued unit of work. The boxed job settles its caller's completion
/// channel exactly once when polled to completion; dropping it unstarted
/// rejects the caller with [`ClientError::Cancelled`].
struct QueuedTask {
    job: BoxFuture<'static, ()>,
}

struct SchedulerState {
    queue: VecDeque<QueuedTask>,
    /// Start timestamps of admitted tasks, oldest first.
    window: VecDeque<Instant>,
    /// True while a pump task is alive.
    pumping: bool,
}

/// FIFO scheduler enforcing a per-instance sliding-window rate limit.
///
/// Tasks are admitted to *start* in strict enqueue order; completion order
/// may differ with per-call latency. The scheduler itself never fails, and
/// one task's failure never blocks or cancels its siblings.
pub struct Scheduler {
    state: Mutex<SchedulerState>,
    requests_per_second: AtomicU32,
    enabled: bool,
}

impl Scheduler {
    /// Creates a scheduler with the given rate limit.
    ///
    /// When `enabled` is false, [`enqueue`](Self::enqueue) bypasses the
    /// queue entirely and runs jobs on the caller's future.
    pub fn new(requests_per_second: u32, enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SchedulerState {
                queue: VecDeque::new(),
                window: VecDeque::new(),
                pumping: false,
            }),
            requests_per_second: AtomicU32::new(requests_per_second),
            enabled,
        })
    }

    /// Queues a job and waits for its result.
    ///
    /// With rate limiting disabled the job runs immediately, with no
    /// ordering guarantee relative to other callers. Otherwise the job is
    /// appended to the FIFO queue and the pump is started if it is not
    /// already running.
    ///
    /// # Errors
    ///
    /// Returns the job's own error, or [`ClientError::Cancelled`] if the
    /// job was dropped by [`clear_queue`](Self::clear_queue) before it
    /// started.
    pub async fn enqueue<T, F>(self: &Arc<Self>, job: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
        T: Send + 'static,
    {
        if !self.enabled {
            return job.await;
        }

        let (tx, rx) = oneshot::channel();
        let wrapped: BoxFuture<'static, ()> = Box::pin(async move {
            // The receiver may have gone away; the send result is irrelevant.
            let _ = tx.send(job.await);
        });

        {
            let mut state = self.lock();
            state.queue.push_back(QueuedTask { job: wrapped });
            trace!(queue_length = state.queue.len(), "Task enqueued");
            if !state.pumping {
                state.pumping = true;
                let scheduler = Arc::clone(self);
                tokio::spawn(async move { scheduler.pump().await });
            }
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Cancelled),
        }
    }

    /// The scheduling loop. Exactly one pump runs per scheduler; the
    /// `pumping` flag is cleared under the same lock that observes the
    /// empty queue, so a concurrent enqueue either sees the pump alive or
    /// restarts it.
    async fn pump(self: Arc<Self>) {
        loop {
            let now = Instant::now();
            let next = {
                let mut state = self.lock();

                // Drop admissions older than the trailing window.
                while state
                    .window
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= WINDOW)
                {
                    state.window.pop_front();
                }

                if state.queue.is_empty() {
                    state.pumping = false;
                    return;
                }

                let limit = self.requests_per_second.load(Ordering::Relaxed) as usize;
                if state.window.len() < limit {
                    match state.queue.pop_front() {
                        Some(task) => {
                            state.window.push_back(now);
                            PumpStep::Start(task)
                        }
                        None => unreachable!("queue checked non-empty under lock"),
                    }
                } else {
                    // Oldest admission leaves the window first.
                    let oldest = state.window[0];
                    PumpStep::Wait(WINDOW.saturating_sub(now.duration_since(oldest)))
                }
            };

            match next {
                PumpStep::Start(task) => {
                    // Admission is the rate-limited event; execution runs
                    // concurrently and never blocks the pump.
                    tokio::spawn(task.job);
                }
                PumpStep::Wait(delay) => {
                    trace!(?delay, "Admission window full, pump waiting");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Updates the rate limit, effective from the next scheduling decision.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] for a zero limit; the current
    /// limit is left unchanged.
    pub fn set_rate_limit(&self, requests_per_second: u32) -> Result<(), CoreError> {
        if requests_per_second == 0 {
            return Err(CoreError::Configuration(
                "Rate limit must be greater than 0".to_string(),
            ));
        }
        self.requests_per_second
            .store(requests_per_second, Ordering::Relaxed);
        debug!(requests_per_second, "Rate limit updated");
        Ok(())
    }

    /// Current rate limit in requests per second.
    pub fn rate_limit(&self) -> u32 {
        self.requests_per_second.load(Ordering::Relaxed)
    }

    /// Whether the sliding-window limiter is active.
    pub fn rate_limiting_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of tasks queued but not yet started.
    pub fn queue_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// True when the queue is empty and no pump is running.
    pub fn is_idle(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && !state.pumping
    }

    /// Drops all queued, not-yet-started tasks.
    ///
    /// Callers awaiting a dropped task receive [`ClientError::Cancelled`].
    /// Tasks already started are unaffected.
    pub fn clear_queue(&self) {
        let dropped = {
            let mut state = self.lock();
            let dropped = state.queue.len();
            state.queue.clear();
            dropped
        };
        if dropped > 0 {
            debug!(dropped, "Queue cleared");
        }
    }

    /// Waits until the queue is empty and the pump has stopped, polling at
    /// a fixed interval. In-flight tasks that already started are not
    /// awaited; their callers still hold completion handles.
    pub async fn flush(&self) {
        while !self.is_idle() {
            tokio::time::sleep(FLUSH_POLL_INTERVAL).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        // State mutations cannot panic, so the lock cannot be poisoned.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum PumpStep {
    Start(QueuedTask),
    Wait(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_returns_job_result() {
        let scheduler = Scheduler::new(10, true);
        let result: Result<u32, ClientError> = scheduler.enqueue(async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_job_error_propagates_to_caller_only() {
        let scheduler = Scheduler::new(10, true);

        let failing = scheduler.enqueue(async {
            Err::<u32, _>(ClientError::Http {
                status: 500,
                body: "boom".to_string(),
            })
        });
        let succeeding = scheduler.enqueue(async { Ok(7) });

        let (failed, succeeded) = tokio::join!(failing, succeeding);
        assert!(matches!(failed, Err(ClientError::Http { status: 500, .. })));
        assert_eq!(succeeded.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_disabled_rate_limiting_bypasses_queue() {
        let scheduler = Scheduler::new(1, false);
        let result: Result<u32, ClientError> = scheduler.enqueue(async { Ok(1) }).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(scheduler.queue_len(), 0);
        assert!(scheduler.is_idle());
    }

    #[tokio::test]
    async fn test_set_rate_limit_rejects_zero() {
        let scheduler = Scheduler::new(3, true);
        assert!(scheduler.set_rate_limit(0).is_err());
        assert_eq!(scheduler.rate_limit(), 3);

        scheduler.set_rate_limit(8).unwrap();
        assert_eq!(scheduler.rate_limit(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_queue_cancels_pending_tasks() {
        let scheduler = Scheduler::new(1, true);

        // First task occupies the window; the second stays queued.
        let first = scheduler.enqueue(async { Ok::<_, ClientError>(1) });
        let scheduler2 = Arc::clone(&scheduler);
        let second = tokio::spawn(async move {
            scheduler2
                .enqueue(async {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok::<_, ClientError>(2)
                })
                .await
        });

        assert_eq!(first.await.unwrap(), 1);
        // Let the pump park on the full window with the second task queued.
        tokio::task::yield_now().await;
        scheduler.clear_queue();

        let result = second.await.unwrap();
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
