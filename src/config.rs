//! Aggregator configuration: upstream credentials, endpoints and timeout

use crate::error::{SearchError, SearchResult};
use std::env;
use std::time::Duration;

/// Per-call upstream timeout unless overridden
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_SEARCH_API_KEY";
pub const ENV_GOOGLE_ENGINE_ID: &str = "GOOGLE_SEARCH_ENGINE_ID";
pub const ENV_UNSPLASH_KEY: &str = "UNSPLASH_ACCESS_KEY";
pub const ENV_TIMEOUT_MS: &str = "SEARCH_TIMEOUT_MS";

/// Base URLs for every upstream; override to point at a proxy or a mock
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub newsapi: String,
    pub google: String,
    pub duckduckgo: String,
    pub duckduckgo_assets: String,
    pub unsplash: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            newsapi: "https://newsapi.org/v2".to_string(),
            google: "https://www.googleapis.com/customsearch/v1".to_string(),
            duckduckgo: "https://api.duckduckgo.com/".to_string(),
            duckduckgo_assets: "https://duckduckgo.com".to_string(),
            unsplash: "https://api.unsplash.com".to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Route every upstream to one base URL, each under its own path
    ///
    /// Used by tests that stand up a single mock server.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            newsapi: format!("{base}/newsapi/v2"),
            google: format!("{base}/customsearch/v1"),
            duckduckgo: format!("{base}/ddg/"),
            duckduckgo_assets: base.to_string(),
            unsplash: format!("{base}/unsplash"),
        }
    }
}

/// Everything needed to build an [`Aggregator`](crate::aggregator::Aggregator)
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub newsapi_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub unsplash_access_key: Option<String>,
    pub timeout: Duration,
    pub endpoints: ProviderEndpoints,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            newsapi_key: None,
            google_api_key: None,
            google_search_engine_id: None,
            unsplash_access_key: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

/// Whether one integration has what it needs, for operator display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationStatus {
    pub name: &'static str,
    pub configured: bool,
    pub requirement: &'static str,
}

impl AggregatorConfig {
    /// Load from process environment variables
    pub fn from_env() -> SearchResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> SearchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout = match get(ENV_TIMEOUT_MS) {
            Some(raw) => {
                let ms: u64 = raw.parse().map_err(|_| {
                    SearchError::ConfigError(format!(
                        "{ENV_TIMEOUT_MS} must be a whole number of milliseconds, got {raw:?}"
                    ))
                })?;
                if ms == 0 {
                    return Err(SearchError::ConfigError(format!(
                        "{ENV_TIMEOUT_MS} must be greater than zero"
                    )));
                }
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        Ok(Self {
            newsapi_key: get(ENV_NEWSAPI_KEY),
            google_api_key: get(ENV_GOOGLE_API_KEY),
            google_search_engine_id: get(ENV_GOOGLE_ENGINE_ID),
            unsplash_access_key: get(ENV_UNSPLASH_KEY),
            timeout,
            endpoints: ProviderEndpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configuration state of each upstream integration
    pub fn integrations(&self) -> Vec<IntegrationStatus> {
        vec![
            IntegrationStatus {
                name: "NewsAPI",
                configured: self.newsapi_key.is_some(),
                requirement: "Requires NEWSAPI_KEY (news, trending, web fallback)",
            },
            IntegrationStatus {
                name: "Google Custom Search",
                configured: self.google_api_key.is_some()
                    && self.google_search_engine_id.is_some(),
                requirement: "Requires GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID (web)",
            },
            IntegrationStatus {
                name: "DuckDuckGo Instant Answer",
                configured: true,
                requirement: "No API key required (web fallback)",
            },
            IntegrationStatus {
                name: "Unsplash",
                configured: self.unsplash_access_key.is_some(),
                requirement: "Requires UNSPLASH_ACCESS_KEY (images)",
            },
        ]
    }
}
