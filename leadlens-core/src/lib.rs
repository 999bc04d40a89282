// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LeadLens` Core
//!
//! Core types shared by the `LeadLens` client engine and provider facades:
//!
//! - [`ClientConfig`] - API client configuration with validation
//! - [`RateTier`] - closed set of rate-limit presets
//! - [`UsageStats`] - immutable usage-statistics snapshot
//! - [`CoreError`] - configuration and validation errors
//!
//! This crate performs no I/O. The rate-limiting and retry machinery lives
//! in `leadlens-client`; the provider-specific request builders live in
//! `leadlens-providers`.

pub mod config;
pub mod error;
pub mod stats;
pub mod tier;

pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_MAX_RETRIES, DEFAULT_REQUESTS_PER_SECOND,
    DEFAULT_RETRY_DELAY,
};
pub use error::CoreError;
pub use stats::UsageStats;
pub use tier::RateTier;
