//! HTTP client configuration for tools that call external APIs

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the search API key
pub const SEARCH_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Configuration for the web search client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchClientConfig {
    /// Base URL of the search API
    pub endpoint: String,

    /// API key; read from `TAVILY_API_KEY` when not configured
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Search depth passed to the API (`basic` or `advanced`)
    pub search_depth: String,

    /// Timeout for requests in seconds
    pub timeout_secs: u64,
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com".to_string(),
            api_key: None,
            search_depth: "advanced".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SearchClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Configuration for the news crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base URL of the Hacker News search API
    pub hackernews_endpoint: String,

    /// Default search query
    pub query: String,

    /// Timeout for requests in seconds
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            hackernews_endpoint: "https://hn.algolia.com".to_string(),
            query: "AI".to_string(),
            timeout_secs: 30,
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.hackernews_endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Build an HTTP client with the given timeout
pub fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("agent-recipes/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_config_builder() {
        let config = SearchClientConfig::new()
            .with_endpoint("http://localhost:8080")
            .with_api_key("key")
            .with_timeout(5);

        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.search_depth, "advanced");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = SearchClientConfig::new().with_api_key("secret");
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    fn test_crawler_config_partial_yaml() {
        let config: CrawlerConfig = serde_yaml::from_str("query: LLM\n").unwrap();
        assert_eq!(config.query, "LLM");
        assert_eq!(config.hackernews_endpoint, "https://hn.algolia.com");
    }
}
