// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LeadLens` Client
//!
//! The rate-limited client engine shared by every `LeadLens` provider
//! facade. Three pieces compose into [`RateLimitedClient`]:
//!
//! - [`Scheduler`] - FIFO queue with sliding-window admission: at most
//!   `requests_per_second` task-starts in any trailing one-second window.
//! - [`RetryPolicy`] - one attempt per iteration, exponential backoff on
//!   HTTP 429 and transport failures, everything else terminal.
//! - [`StatsRecorder`] - usage counters snapshot as
//!   [`leadlens_core::UsageStats`].
//!
//! Limits are enforced per client instance only; there is no cross-process
//! coordination for credentials shared between processes.

pub mod client;
pub mod error;
pub mod executor;
pub mod scheduler;
pub mod stats;

pub use client::RateLimitedClient;
pub use error::ClientError;
pub use executor::RetryPolicy;
pub use scheduler::Scheduler;
pub use stats::StatsRecorder;
