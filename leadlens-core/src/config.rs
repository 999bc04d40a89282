//! Client configuration.

use std::time::Duration;

use crate::error::CoreError;

/// Default maximum requests admitted per sliding one-second window.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 1;

/// Default maximum number of retry attempts after the initial one.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay before the first retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for a rate-limited API client.
///
/// Built via [`ClientConfig::builder`]; validation happens in
/// [`ClientConfigBuilder::build`], so a constructed config is always valid.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// RapidAPI key sent with every request.
    pub api_key: String,
    /// API host, e.g. `social-links-search.p.rapidapi.com`.
    pub api_host: String,
    /// Maximum task-starts per trailing one-second window.
    pub requests_per_second: u32,
    /// Retry attempts after the initial one (0 disables retries).
    pub max_retries: u32,
    /// Base retry delay; doubled for each subsequent attempt.
    pub retry_delay: Duration,
    /// When false, requests bypass the queue entirely.
    pub enable_rate_limiting: bool,
}

impl ClientConfig {
    /// Starts building a config for the given API key and host.
    pub fn builder(api_key: impl Into<String>, api_host: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_key: api_key.into(),
            api_host: api_host.into(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            enable_rate_limiting: true,
        }
    }

    /// The base URL for this host.
    ///
    /// Hosts are plain RapidAPI hostnames and get an `https://` prefix; a
    /// host carrying an explicit scheme is used verbatim (self-hosted
    /// gateways, local test servers).
    pub fn base_url(&self) -> String {
        if self.api_host.starts_with("http://") || self.api_host.starts_with("https://") {
            self.api_host.clone()
        } else {
            format!("https://{}", self.api_host)
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    api_key: String,
    api_host: String,
    requests_per_second: u32,
    max_retries: u32,
    retry_delay: Duration,
    enable_rate_limiting: bool,
}

impl ClientConfigBuilder {
    /// Sets the rate limit in requests per second.
    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps;
        self
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the base retry delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Enables or disables rate limiting.
    pub fn enable_rate_limiting(mut self, enabled: bool) -> Self {
        self.enable_rate_limiting = enabled;
        self
    }

    /// Validates and builds the config.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the API key is empty, the
    /// rate limit is zero, or the retry delay is zero.
    pub fn build(self) -> Result<ClientConfig, CoreError> {
        if self.api_key.trim().is_empty() {
            return Err(CoreError::Configuration(
                "API key is required. Get your key from https://rapidapi.com/".to_string(),
            ));
        }
        if self.api_host.trim().is_empty() {
            return Err(CoreError::Configuration(
                "API host must not be empty".to_string(),
            ));
        }
        if self.requests_per_second == 0 {
            return Err(CoreError::Configuration(
                "Rate limit must be greater than 0".to_string(),
            ));
        }
        if self.retry_delay.is_zero() {
            return Err(CoreError::Configuration(
                "Retry delay must be greater than 0".to_string(),
            ));
        }

        Ok(ClientConfig {
            api_key: self.api_key,
            api_host: self.api_host,
            requests_per_second: self.requests_per_second,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            enable_rate_limiting: self.enable_rate_limiting,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::builder("key", "api.example.com")
            .build()
            .unwrap();

        assert_eq!(config.requests_per_second, 1);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(1000));
        assert!(config.enable_rate_limiting);
        assert_eq!(config.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        let config = ClientConfig::builder("key", "http://127.0.0.1:8080")
            .build()
            .unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = ClientConfig::builder("", "api.example.com").build();
        assert!(matches!(result, Err(CoreError::Configuration(_))));

        let result = ClientConfig::builder("   ", "api.example.com").build();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let result = ClientConfig::builder("key", "api.example.com")
            .requests_per_second(0)
            .build();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_zero_retry_delay_rejected() {
        let result = ClientConfig::builder("key", "api.example.com")
            .retry_delay(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::builder("key", "api.example.com")
            .requests_per_second(5)
            .max_retries(0)
            .retry_delay(Duration::from_millis(250))
            .enable_rate_limiting(false)
            .build()
            .unwrap();

        assert_eq!(config.requests_per_second, 5);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert!(!config.enable_rate_limiting);
    }
}
