//! Perplexity AI facade for lead enrichment.
//!
//! POST variant of the shared client core: requests carry a JSON chat body
//! and the RapidAPI host/key header pair, and every call routes through the
//! engine's scheduler and retry policy.

pub mod templates;

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use leadlens_client::{ClientError, RateLimitedClient};
use leadlens_core::{ClientConfig, CoreError, RateTier, UsageStats};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default RapidAPI host for the Perplexity gateway.
pub const DEFAULT_PERPLEXITY_HOST: &str = "perplexity2.p.rapidapi.com";

/// Default maximum tokens per completion.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.2;

// ============================================================================
// Models
// ============================================================================

/// Perplexity models available through the gateway. A closed set; unknown
/// model names are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerplexityModel {
    /// `llama-3.1-sonar-small-128k-online`
    SonarSmall,
    /// `llama-3.1-sonar-large-128k-online`
    SonarLarge,
    /// `llama-3.1-sonar-huge-128k-online`
    SonarHuge,
}

impl PerplexityModel {
    /// The wire name sent in request bodies.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::SonarSmall => "llama-3.1-sonar-small-128k-online",
            Self::SonarLarge => "llama-3.1-sonar-large-128k-online",
            Self::SonarHuge => "llama-3.1-sonar-huge-128k-online",
        }
    }

    /// Returns all supported models.
    pub fn all() -> &'static [PerplexityModel] {
        &[Self::SonarSmall, Self::SonarLarge, Self::SonarHuge]
    }
}

impl fmt::Display for PerplexityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for PerplexityModel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.wire_name() == s)
            .ok_or_else(|| {
                CoreError::Configuration(format!(
                    "Invalid model: {s}. Valid models: {}",
                    Self::all()
                        .iter()
                        .map(|m| m.wire_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// Recency filter for search-backed completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyFilter {
    /// Results from the last day.
    Day,
    /// Results from the last week.
    Week,
    /// Results from the last month.
    Month,
    /// Results from the last year.
    Year,
}

impl RecencyFilter {
    /// Maps a human timeframe ("last week", "last 3 months") onto the
    /// nearest filter.
    pub fn from_timeframe(timeframe: &str) -> Self {
        let lower = timeframe.to_ascii_lowercase();
        if lower.contains("day") {
            Self::Day
        } else if lower.contains("week") {
            Self::Week
        } else if lower.contains("month") {
            Self::Month
        } else {
            Self::Year
        }
    }
}

// ============================================================================
// Chat Requests
// ============================================================================

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `user`, `assistant`, or `system`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// A system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Parameters for a chat completion request. Unset options are omitted
/// from the wire body and fall back to the client defaults or the API's.
#[derive(Debug, Clone, Default)]
pub struct ChatParams {
    /// Conversation messages, oldest first. Must not be empty.
    pub messages: Vec<ChatMessage>,
    /// Model override for this request.
    pub model: Option<PerplexityModel>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0-2).
    pub temperature: Option<f32>,
    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,
    /// Ask the API to return citations.
    pub return_citations: bool,
    /// Ask the API to return related images.
    pub return_images: bool,
    /// Ask the API to return related questions.
    pub return_related_questions: bool,
    /// Restrict search to one domain.
    pub search_domain_filter: Option<String>,
    /// Restrict search results by recency.
    pub search_recency_filter: Option<RecencyFilter>,
}

impl ChatParams {
    /// Single user message.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            ..Self::default()
        }
    }

    /// Enables citations.
    pub fn with_citations(mut self) -> Self {
        self.return_citations = true;
        self
    }

    /// Sets the model for this request.
    pub fn with_model(mut self, model: PerplexityModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the recency filter.
    pub fn with_recency(mut self, recency: RecencyFilter) -> Self {
        self.search_recency_filter = Some(recency);
        self
    }
}

/// Wire body for a chat completion. Optional fields are dropped rather
/// than sent as null.
#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'static str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_citations: bool,
    return_images: bool,
    return_related_questions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_domain_filter: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_recency_filter: Option<RecencyFilter>,
}

// ============================================================================
// Chat Responses
// ============================================================================

/// A chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion choices; the first one carries the answer.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Source citations, when requested.
    #[serde(default)]
    pub citations: Vec<String>,
    /// Token accounting for this call.
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

impl ChatResponse {
    /// The main text content, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }

    /// Source citations (empty if none were requested or returned).
    pub fn citations(&self) -> &[String] {
        &self.citations
    }
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The generated message.
    pub message: ChatMessage,
}

/// Token usage block returned by the API.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ResponseUsage {
    /// Prompt tokens consumed.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion tokens generated.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens billed.
    #[serde(default)]
    pub total_tokens: u64,
}

/// Accumulated token usage across a client's successful calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    /// Prompt tokens consumed.
    pub prompt_tokens: u64,
    /// Completion tokens generated.
    pub completion_tokens: u64,
    /// Total tokens billed.
    pub total_tokens: u64,
}

// ============================================================================
// Client
// ============================================================================

/// Rate-limited Perplexity client with lead-enrichment helpers.
pub struct PerplexityClient {
    engine: RateLimitedClient,
    model: Mutex<PerplexityModel>,
    max_tokens: u32,
    temperature: f32,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    total_tokens: AtomicU64,
}

impl PerplexityClient {
    /// Creates a client from a full config.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the engine cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        Ok(Self {
            engine: RateLimitedClient::new(config)?,
            model: Mutex::new(PerplexityModel::SonarSmall),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            prompt_tokens: AtomicU64::new(0),
            completion_tokens: AtomicU64::new(0),
            total_tokens: AtomicU64::new(0),
        })
    }

    /// Creates a client for the default RapidAPI host with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if `api_key` is empty.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(ClientConfig::builder(api_key, DEFAULT_PERPLEXITY_HOST).build()?)
    }

    /// Sets the default model for subsequent requests.
    pub fn set_model(&self, model: PerplexityModel) {
        *self.model.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = model;
    }

    /// Sets the default model at construction time.
    #[must_use]
    pub fn with_model(self, model: PerplexityModel) -> Self {
        self.set_model(model);
        self
    }

    /// The current default model.
    pub fn model(&self) -> PerplexityModel {
        *self.model.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Sends a chat completion request.
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] (wrapped) if `params.messages` is empty;
    /// otherwise the engine's error taxonomy.
    pub async fn chat(&self, params: ChatParams) -> Result<ChatResponse, ClientError> {
        if params.messages.is_empty() {
            return Err(CoreError::Validation(
                "Messages parameter is required".to_string(),
            )
            .into());
        }

        let body = ChatRequestBody {
            model: params.model.unwrap_or_else(|| self.model()).wire_name(),
            messages: &params.messages,
            max_tokens: params.max_tokens.unwrap_or(self.max_tokens),
            temperature: params.temperature.unwrap_or(self.temperature),
            top_p: params.top_p.unwrap_or(0.9),
            return_citations: params.return_citations,
            return_images: params.return_images,
            return_related_questions: params.return_related_questions,
            search_domain_filter: params.search_domain_filter.as_deref().map(|d| [d]),
            search_recency_filter: params.search_recency_filter,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let response: ChatResponse = self.engine.post_json("/", body).await?;

        if let Some(usage) = response.usage {
            self.prompt_tokens
                .fetch_add(usage.prompt_tokens, Ordering::Relaxed);
            self.completion_tokens
                .fetch_add(usage.completion_tokens, Ordering::Relaxed);
            self.total_tokens
                .fetch_add(usage.total_tokens, Ordering::Relaxed);
            debug!(total_tokens = usage.total_tokens, "Chat completion finished");
        }

        Ok(response)
    }

    /// Researches a company: overview, size, executives, recent news.
    ///
    /// # Errors
    ///
    /// See [`chat`](Self::chat).
    pub async fn enrich_company(&self, company_name: &str) -> Result<ChatResponse, ClientError> {
        self.chat(ChatParams::from_prompt(templates::company_info(company_name)).with_citations())
            .await
    }

    /// Researches a person's professional background.
    ///
    /// # Errors
    ///
    /// See [`chat`](Self::chat).
    pub async fn enrich_person(
        &self,
        person_name: &str,
        company: Option<&str>,
    ) -> Result<ChatResponse, ClientError> {
        self.chat(
            ChatParams::from_prompt(templates::person_info(person_name, company))
                .with_citations(),
        )
        .await
    }

    /// Enriches a contact from an email address.
    ///
    /// # Errors
    ///
    /// See [`chat`](Self::chat).
    pub async fn enrich_contact(&self, email: &str) -> Result<ChatResponse, ClientError> {
        self.chat(ChatParams::from_prompt(templates::contact_enrichment(email)).with_citations())
            .await
    }

    /// Summarizes recent company news within a timeframe.
    ///
    /// # Errors
    ///
    /// See [`chat`](Self::chat).
    pub async fn company_news(
        &self,
        company_name: &str,
        timeframe: &str,
    ) -> Result<ChatResponse, ClientError> {
        self.chat(
            ChatParams::from_prompt(templates::news_summary(company_name, timeframe))
                .with_citations()
                .with_recency(RecencyFilter::from_timeframe(timeframe)),
        )
        .await
    }

    /// Analyzes a company's main competitors.
    ///
    /// # Errors
    ///
    /// See [`chat`](Self::chat).
    pub async fn analyze_competitors(
        &self,
        company_name: &str,
    ) -> Result<ChatResponse, ClientError> {
        self.chat(
            ChatParams::from_prompt(templates::competitor_analysis(company_name))
                .with_citations(),
        )
        .await
    }

    /// Scores a company as a lead against caller-supplied criteria.
    ///
    /// # Errors
    ///
    /// See [`chat`](Self::chat).
    pub async fn qualify_lead(
        &self,
        company_name: &str,
        criteria: &str,
    ) -> Result<ChatResponse, ClientError> {
        self.chat(
            ChatParams::from_prompt(templates::lead_qualification(company_name, criteria))
                .with_citations(),
        )
        .await
    }

    /// Researches a topic within an industry.
    ///
    /// # Errors
    ///
    /// See [`chat`](Self::chat).
    pub async fn research_industry(
        &self,
        industry: &str,
        topic: &str,
    ) -> Result<ChatResponse, ClientError> {
        self.chat(
            ChatParams::from_prompt(templates::industry_research(industry, topic))
                .with_citations(),
        )
        .await
    }

    /// Tokens accumulated over this client's successful calls.
    pub fn token_usage(&self) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
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
    fn test_model_parsing() {
        let model: PerplexityModel = "llama-3.1-sonar-large-128k-online".parse().unwrap();
        assert_eq!(model, PerplexityModel::SonarLarge);

        let err = "gpt-5".parse::<PerplexityModel>().unwrap_err();
        assert!(err.to_string().contains("Invalid model: gpt-5"));
    }

    #[test]
    fn test_recency_from_timeframe() {
        assert_eq!(RecencyFilter::from_timeframe("last week"), RecencyFilter::Week);
        assert_eq!(RecencyFilter::from_timeframe("last 3 months"), RecencyFilter::Month);
        assert_eq!(RecencyFilter::from_timeframe("2024"), RecencyFilter::Year);
    }

    #[test]
    fn test_chat_body_omits_unset_filters() {
        let params = ChatParams::from_prompt("hello").with_citations();
        let body = ChatRequestBody {
            model: PerplexityModel::SonarSmall.wire_name(),
            messages: &params.messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: 0.9,
            return_citations: params.return_citations,
            return_images: false,
            return_related_questions: false,
            search_domain_filter: None,
            search_recency_filter: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("search_domain_filter").is_none());
        assert!(json.get("search_recency_filter").is_none());
        assert_eq!(json["return_citations"], true);
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_empty_messages_rejected() {
        let client = PerplexityClient::from_api_key("key").unwrap();
        let err = client.chat(ChatParams::default()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_response_accessors() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Tesla builds cars."}}],
            "citations": ["https://tesla.com"],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content(), Some("Tesla builds cars."));
        assert_eq!(response.citations(), ["https://tesla.com".to_string()]);
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_set_model_is_live() {
        let client = PerplexityClient::from_api_key("key").unwrap();
        assert_eq!(client.model(), PerplexityModel::SonarSmall);
        client.set_model(PerplexityModel::SonarHuge);
        assert_eq!(client.model(), PerplexityModel::SonarHuge);
    }
}
