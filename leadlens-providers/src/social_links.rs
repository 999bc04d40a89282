//! Social Links Search facade.
//!
//! GET variant of the shared client core: requests carry a query string and
//! the RapidAPI host/key header pair. Supported networks are a closed set
//! validated before any network call.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use leadlens_client::{ClientError, RateLimitedClient};
use leadlens_core::{ClientConfig, CoreError, RateTier, UsageStats};
use serde::{Deserialize, Serialize};

/// Default RapidAPI host for the Social Links Search API.
pub const DEFAULT_SOCIAL_LINKS_HOST: &str = "social-links-search.p.rapidapi.com";

// ============================================================================
// Networks
// ============================================================================

/// Social networks supported by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialNetwork {
    /// Facebook profiles and pages.
    Facebook,
    /// TikTok accounts.
    TikTok,
    /// Instagram accounts.
    Instagram,
    /// Snapchat accounts.
    Snapchat,
    /// Twitter/X accounts.
    Twitter,
    /// YouTube channels.
    YouTube,
    /// LinkedIn profiles.
    LinkedIn,
    /// GitHub profiles.
    GitHub,
    /// Pinterest accounts.
    Pinterest,
}

impl SocialNetwork {
    /// Wire name used in the `social_networks` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::TikTok => "tiktok",
            Self::Instagram => "instagram",
            Self::Snapchat => "snapchat",
            Self::Twitter => "twitter",
            Self::YouTube => "youtube",
            Self::LinkedIn => "linkedin",
            Self::GitHub => "github",
            Self::Pinterest => "pinterest",
        }
    }

    /// Returns all supported networks.
    pub fn all() -> &'static [SocialNetwork] {
        &[
            Self::Facebook,
            Self::TikTok,
            Self::Instagram,
            Self::Snapchat,
            Self::Twitter,
            Self::YouTube,
            Self::LinkedIn,
            Self::GitHub,
            Self::Pinterest,
        ]
    }
}

impl fmt::Display for SocialNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialNetwork {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|n| n.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid social network: {s}. Supported networks: {}",
                    Self::all()
                        .iter()
                        .map(|n| n.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

// ============================================================================
// Requests & Responses
// ============================================================================

/// Parameters for a social-links search.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Search query: a name, email address, or handle. Must not be empty.
    pub query: String,
    /// Networks to search; empty means all supported networks.
    pub networks: Vec<SocialNetwork>,
}

impl SearchParams {
    /// Searches all networks for the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            networks: Vec::new(),
        }
    }

    /// Restricts the search to specific networks.
    #[must_use]
    pub fn with_networks(mut self, networks: &[SocialNetwork]) -> Self {
        self.networks = networks.to_vec();
        self
    }
}

/// Search results: profile URLs grouped by network.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// API status string.
    #[serde(default)]
    pub status: Option<String>,
    /// Opaque request identifier from the API.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Profile URLs keyed by network wire name.
    #[serde(default)]
    pub data: HashMap<String, Vec<String>>,
}

impl SearchResponse {
    /// Profile URLs found for a network.
    pub fn links_for(&self, network: SocialNetwork) -> &[String] {
        self.data
            .get(network.as_str())
            .map_or(&[] as &[String], Vec::as_slice)
    }

    /// Total number of profile URLs across all networks.
    pub fn total_links(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}

// ============================================================================
// Client
// ============================================================================

/// Rate-limited Social Links Search client.
pub struct SocialLinksClient {
    engine: RateLimitedClient,
}

impl SocialLinksClient {
    /// Creates a client from a full config.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the engine cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        Ok(Self {
            engine: RateLimitedClient::new(config)?,
        })
    }

    /// Creates a client for the default RapidAPI host with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if `api_key` is empty.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(ClientConfig::builder(api_key, DEFAULT_SOCIAL_LINKS_HOST).build()?)
    }

    /// Searches for social profile links.
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] (wrapped) if the query is empty; otherwise
    /// the engine's error taxonomy.
    pub async fn search(&self, params: SearchParams) -> Result<SearchResponse, ClientError> {
        if params.query.trim().is_empty() {
            return Err(CoreError::Validation(
                "Query parameter is required".to_string(),
            )
            .into());
        }

        let mut query = vec![("query", params.query.clone())];
        if !params.networks.is_empty() {
            let networks = params
                .networks
                .iter()
                .map(SocialNetwork::as_str)
                .collect::<Vec<_>>()
                .join(",");
            query.push(("social_networks", networks));
        }

        self.engine.get("/search-social-links", &query).await
    }

    /// Convenience wrapper: search specific networks for a query.
    ///
    /// # Errors
    ///
    /// See [`search`](Self::search).
    pub async fn search_networks(
        &self,
        query: impl Into<String>,
        networks: &[SocialNetwork],
    ) -> Result<SearchResponse, ClientError> {
        self.search(SearchParams::new(query).with_networks(networks))
            .await
    }

    /// Updates the rate limit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] for a zero limit.
    pub fn set_rate_limit(&self, requests_per_second: u32) -> Result<(), CoreError> {
        self.engine.set_rate_limit(requests_per_second)
    }

    /// Applies a tier preset's rate limit.
    pub fn set_tier(&self, tier: RateTier) {
        self.engine.set_tier(tier);
    }

    /// Usage-statistics snapshot.
    pub fn stats(&self) -> UsageStats {
        self.engine.stats()
    }

    /// Zeroes the usage counters.
    pub fn reset_stats(&self) {
        self.engine.reset_stats();
    }

    /// Waits for the request queue to drain.
    pub async fn flush(&self) {
        self.engine.flush().await;
    }

    /// Drops all queued, not-yet-started requests.
    pub fn clear_queue(&self) {
        self.engine.clear_queue();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parsing() {
        assert_eq!("linkedin".parse::<SocialNetwork>().unwrap(), SocialNetwork::LinkedIn);
        assert_eq!(" GitHub ".parse::<SocialNetwork>().unwrap(), SocialNetwork::GitHub);

        let err = "myspace".parse::<SocialNetwork>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("myspace"));
    }

    #[test]
    fn test_all_networks_round_trip() {
        for network in SocialNetwork::all() {
            assert_eq!(network.as_str().parse::<SocialNetwork>().unwrap(), *network);
        }
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_network() {
        let client = SocialLinksClient::from_api_key("key").unwrap();
        let err = client.search(SearchParams::new("  ")).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::Validation(_))));
        // Rejected synchronously; nothing was queued or attempted.
        assert_eq!(client.stats().total_requests, 0);
    }

    #[test]
    fn test_response_accessors() {
        let json = r#"{
            "status": "OK",
            "request_id": "abc",
            "data": {
                "linkedin": ["https://linkedin.com/in/jane"],
                "github": ["https://github.com/jane", "https://github.com/jdoe"]
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.links_for(SocialNetwork::GitHub).len(), 2);
        assert_eq!(
            response.links_for(SocialNetwork::LinkedIn),
            ["https://linkedin.com/in/jane".to_string()]
        );
        assert!(response.links_for(SocialNetwork::TikTok).is_empty());
        assert_eq!(response.total_links(), 3);
    }
}
