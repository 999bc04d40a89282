//! Enrichment orchestration with provider fallback.
//!
//! Composes one or more AI provider facades behind a single interface.
//! Providers are tried in configured order; a provider-fault terminal error
//! (rate limit exhausted, HTTP error, network failure) moves on to the next
//! provider, while caller faults surface immediately.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use leadlens_client::ClientError;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::perplexity::PerplexityClient;
use crate::social_links::{SearchResponse, SocialLinksClient};

// ============================================================================
// Subjects & Reports
// ============================================================================

/// What to enrich.
#[derive(Debug, Clone)]
pub enum EnrichmentSubject {
    /// A company by name.
    Company(String),
    /// A person, optionally scoped to a company.
    Person {
        /// Person's name.
        name: String,
        /// Company for context.
        company: Option<String>,
    },
    /// A contact by email address.
    Contact(String),
}

impl fmt::Display for EnrichmentSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company(name) => write!(f, "company {name}"),
            Self::Person { name, .. } => write!(f, "person {name}"),
            Self::Contact(email) => write!(f, "contact {email}"),
        }
    }
}

/// Result of one enrichment call.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    /// Name of the provider that produced the report.
    pub provider: String,
    /// Generated research text.
    pub content: String,
    /// Source citations, when the provider returned them.
    pub citations: Vec<String>,
}

/// Combined AI and social-profile enrichment for a contact.
#[derive(Debug, Clone)]
pub struct ContactEnrichment {
    /// The AI research report.
    pub report: EnrichmentReport,
    /// Social profile links, when a social client is configured and the
    /// lookup succeeded. A failed social lookup never fails the whole
    /// enrichment.
    pub social: Option<SearchResponse>,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// An AI provider capable of producing enrichment reports.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Provider name used in reports and fallback logs.
    fn name(&self) -> &str;

    /// Enriches a subject.
    async fn enrich(&self, subject: &EnrichmentSubject) -> Result<EnrichmentReport, ClientError>;
}

#[async_trait]
impl EnrichmentProvider for PerplexityClient {
    fn name(&self) -> &str {
        "perplexity"
    }

    async fn enrich(&self, subject: &EnrichmentSubject) -> Result<EnrichmentReport, ClientError> {
        let response = match subject {
            EnrichmentSubject::Company(name) => self.enrich_company(name).await?,
            EnrichmentSubject::Person { name, company } => {
                self.enrich_person(name, company.as_deref()).await?
            }
            EnrichmentSubject::Contact(email) => self.enrich_contact(email).await?,
        };

        Ok(EnrichmentReport {
            provider: self.name().to_string(),
            content: response.content().unwrap_or_default().to_string(),
            citations: response.citations().to_vec(),
        })
    }
}

// ============================================================================
// Service
// ============================================================================

/// Enrichment counters, independent of the per-client request stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentStats {
    /// Enrichment calls made.
    pub total_enrichments: u64,
    /// Calls that produced a report.
    pub successful_enrichments: u64,
    /// Calls where every provider failed.
    pub failed_enrichments: u64,
}

/// Orchestrates enrichment across a primary provider and ordered fallbacks.
pub struct EnrichmentService {
    providers: Vec<Arc<dyn EnrichmentProvider>>,
    social: Option<SocialLinksClient>,
    stats: Mutex<EnrichmentStats>,
}

impl EnrichmentService {
    /// Creates a service with a single provider and no social lookup.
    pub fn new(primary: Arc<dyn EnrichmentProvider>) -> Self {
        Self {
            providers: vec![primary],
            social: None,
            stats: Mutex::new(EnrichmentStats::default()),
        }
    }

    /// Appends a fallback provider, tried after all earlier ones.
    #[must_use]
    pub fn with_fallback(mut self, provider: Arc<dyn EnrichmentProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Attaches a social-links client for combined contact enrichment.
    #[must_use]
    pub fn with_social_client(mut self, client: SocialLinksClient) -> Self {
        self.social = Some(client);
        self
    }

    /// Enriches a company.
    ///
    /// # Errors
    ///
    /// See [`enrich`](Self::enrich).
    pub async fn enrich_company(&self, name: &str) -> Result<EnrichmentReport, ClientError> {
        self.enrich(&EnrichmentSubject::Company(name.to_string()))
            .await
    }

    /// Enriches a person.
    ///
    /// # Errors
    ///
    /// See [`enrich`](Self::enrich).
    pub async fn enrich_person(
        &self,
        name: &str,
        company: Option<&str>,
    ) -> Result<EnrichmentReport, ClientError> {
        self.enrich(&EnrichmentSubject::Person {
            name: name.to_string(),
            company: company.map(ToString::to_string),
        })
        .await
    }

    /// Enriches a contact by email.
    ///
    /// # Errors
    ///
    /// See [`enrich`](Self::enrich).
    pub async fn enrich_contact(&self, email: &str) -> Result<EnrichmentReport, ClientError> {
        self.enrich(&EnrichmentSubject::Contact(email.to_string()))
            .await
    }

    /// Enriches a subject, falling back through the provider chain.
    ///
    /// # Errors
    ///
    /// The first caller-fault error encountered, or
    /// [`ClientError::AllProvidersFailed`] wrapping the last provider
    /// fault once the chain is exhausted.
    #[instrument(skip(self), fields(subject = %subject))]
    pub async fn enrich(
        &self,
        subject: &EnrichmentSubject,
    ) -> Result<EnrichmentReport, ClientError> {
        self.lock().total_enrichments += 1;

        let mut last_error: Option<ClientError> = None;
        for provider in &self.providers {
            match provider.enrich(subject).await {
                Ok(report) => {
                    info!(provider = provider.name(), "Enrichment succeeded");
                    self.lock().successful_enrichments += 1;
                    return Ok(report);
                }
                Err(err) if err.is_provider_fault() => {
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        "Provider failed, trying next"
                    );
                    last_error = Some(err);
                }
                Err(err) => {
                    // Caller fault: no other provider would do better.
                    self.lock().failed_enrichments += 1;
                    return Err(err);
                }
            }
        }

        self.lock().failed_enrichments += 1;
        let chain = self
            .providers
            .iter()
            .map(|p| p.name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match last_error {
            Some(source) => Err(ClientError::AllProvidersFailed {
                message: format!("tried {chain}"),
                source: Box::new(source),
            }),
            // Unreachable with a non-empty chain; constructed with one.
            None => Err(ClientError::InvalidResponse(
                "no providers configured".to_string(),
            )),
        }
    }

    /// Combined AI and social enrichment for a contact.
    ///
    /// # Errors
    ///
    /// See [`enrich`](Self::enrich); the social lookup is best-effort.
    pub async fn enrich_contact_full(
        &self,
        email: &str,
    ) -> Result<ContactEnrichment, ClientError> {
        let report = self.enrich_contact(email).await?;

        let social = match &self.social {
            Some(client) => match client.search_networks(email, &[]).await {
                Ok(response) => Some(response),
                Err(err) => {
                    warn!(error = %err, "Social lookup failed, returning AI report only");
                    None
                }
            },
            None => None,
        };

        Ok(ContactEnrichment { report, social })
    }

    /// Snapshot of the service-level counters.
    pub fn stats(&self) -> EnrichmentStats {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EnrichmentStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        name: &'static str,
        outcome: fn() -> Result<EnrichmentReport, ClientError>,
    }

    #[async_trait]
    impl EnrichmentProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn enrich(
            &self,
            _subject: &EnrichmentSubject,
        ) -> Result<EnrichmentReport, ClientError> {
            (self.outcome)()
        }
    }

    fn ok_report() -> Result<EnrichmentReport, ClientError> {
        Ok(EnrichmentReport {
            provider: "fallback".to_string(),
            content: "report".to_string(),
            citations: vec![],
        })
    }

    fn rate_limited() -> Result<EnrichmentReport, ClientError> {
        Err(ClientError::RateLimitExceeded { attempts: 4 })
    }

    fn caller_fault() -> Result<EnrichmentReport, ClientError> {
        Err(leadlens_core::CoreError::Validation("bad subject".to_string()).into())
    }

    #[tokio::test]
    async fn test_fallback_on_provider_fault() {
        let service = EnrichmentService::new(Arc::new(FixedProvider {
            name: "primary",
            outcome: rate_limited,
        }))
        .with_fallback(Arc::new(FixedProvider {
            name: "fallback",
            outcome: ok_report,
        }));

        let report = service.enrich_company("Acme").await.unwrap();
        assert_eq!(report.provider, "fallback");

        let stats = service.stats();
        assert_eq!(stats.total_enrichments, 1);
        assert_eq!(stats.successful_enrichments, 1);
        assert_eq!(stats.failed_enrichments, 0);
    }

    #[tokio::test]
    async fn test_all_providers_failing_combines_the_error() {
        let service = EnrichmentService::new(Arc::new(FixedProvider {
            name: "primary",
            outcome: rate_limited,
        }))
        .with_fallback(Arc::new(FixedProvider {
            name: "fallback",
            outcome: rate_limited,
        }));

        let err = service.enrich_company("Acme").await.unwrap_err();
        match err {
            ClientError::AllProvidersFailed { message, source } => {
                assert!(message.contains("primary, fallback"));
                assert!(matches!(*source, ClientError::RateLimitExceeded { .. }));
            }
            other => panic!("expected AllProvidersFailed, got {other:?}"),
        }
        assert_eq!(service.stats().failed_enrichments, 1);
    }

    #[tokio::test]
    async fn test_caller_fault_skips_fallback() {
        let service = EnrichmentService::new(Arc::new(FixedProvider {
            name: "primary",
            outcome: caller_fault,
        }))
        .with_fallback(Arc::new(FixedProvider {
            name: "fallback",
            outcome: ok_report,
        }));

        let err = service.enrich_company("Acme").await.unwrap_err();
        assert!(matches!(err, ClientError::Core(_)));
        assert_eq!(service.stats().failed_enrichments, 1);
    }
}
