// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LeadLens` Providers
//!
//! Provider facades built on the `leadlens-client` engine. Each facade
//! binds one API host and key to its own scheduler, retry policy, and
//! stats, and exposes domain request builders:
//!
//! - [`PerplexityClient`] - AI lead enrichment over a JSON chat API
//!   (POST body, prompt templates, token tracking).
//! - [`SocialLinksClient`] - social profile search (GET query string,
//!   closed network set).
//! - [`EnrichmentService`] - orchestration with provider fallback and
//!   combined AI + social enrichment.
//!
//! Every network call a facade makes routes through its shared scheduler,
//! so per-instance rate limits hold across all of a facade's methods.

pub mod enrichment;
pub mod perplexity;
pub mod social_links;

pub use enrichment::{
    ContactEnrichment, EnrichmentProvider, EnrichmentReport, EnrichmentService, EnrichmentStats,
    EnrichmentSubject,
};
pub use perplexity::{
    ChatMessage, ChatParams, ChatResponse, PerplexityClient, PerplexityModel, RecencyFilter,
    TokenUsage, DEFAULT_PERPLEXITY_HOST,
};
pub use social_links::{
    SearchParams, SearchResponse, SocialLinksClient, SocialNetwork, DEFAULT_SOCIAL_LINKS_HOST,
};
