//! Facade call-through against a local mock server: both facades must
//! route their calls through the shared engine and parse real wire shapes.

use std::time::Duration;

use leadlens_core::ClientConfig;
use leadlens_providers::{
    ChatParams, PerplexityClient, SearchParams, SocialLinksClient, SocialNetwork,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder("test-key", server.uri())
        .requests_per_second(100)
        .max_retries(1)
        .retry_delay(Duration::from_millis(10))
        .build()
        .unwrap()
}

#[tokio::test]
async fn perplexity_chat_sends_body_and_accumulates_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-rapidapi-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama-3.1-sonar-small-128k-online",
            "return_citations": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Acme makes anvils."}}],
            "citations": ["https://acme.example"],
            "usage": {"prompt_tokens": 20, "completion_tokens": 12, "total_tokens": 32}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = PerplexityClient::new(config_for(&server)).unwrap();

    let response = client.enrich_company("Acme Corp").await.unwrap();
    assert_eq!(response.content(), Some("Acme makes anvils."));
    assert_eq!(response.citations(), ["https://acme.example".to_string()]);

    client
        .chat(ChatParams::from_prompt("follow-up").with_citations())
        .await
        .unwrap();

    let usage = client.token_usage();
    assert_eq!(usage.total_tokens, 64);
    assert_eq!(usage.prompt_tokens, 40);

    let stats = client.stats();
    assert_eq!(stats.successful_requests, 2);
    assert_eq!(stats.failed_requests, 0);
}

#[tokio::test]
async fn social_search_builds_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search-social-links"))
        .and(query_param("query", "jane@acme.example"))
        .and(query_param("social_networks", "linkedin,github"))
        .and(header("x-rapidapi-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "data": {
                "linkedin": ["https://linkedin.com/in/jane"],
                "github": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SocialLinksClient::new(config_for(&server)).unwrap();
    let response = client
        .search(
            SearchParams::new("jane@acme.example")
                .with_networks(&[SocialNetwork::LinkedIn, SocialNetwork::GitHub]),
        )
        .await
        .unwrap();

    assert_eq!(response.links_for(SocialNetwork::LinkedIn).len(), 1);
    assert!(response.links_for(SocialNetwork::GitHub).is_empty());
    assert_eq!(client.stats().successful_requests, 1);
}

#[tokio::test]
async fn facade_surfaces_terminal_rate_limit_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search-social-links"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let client = SocialLinksClient::new(config_for(&server)).unwrap();
    let err = client
        .search(SearchParams::new("jane@acme.example"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        leadlens_client::ClientError::RateLimitExceeded { attempts: 2 }
    ));

    let stats = client.stats();
    assert_eq!(stats.rate_limit_hits, 2);
    assert_eq!(stats.failed_requests, 1);
}
