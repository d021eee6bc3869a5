//! NewsAPI provider (headline and full-text news search)

use crate::{
    error::{SearchError, SearchResult},
    normalize::{RequestStamp, ResultDraft},
    providers::decode_batch,
    types::{ProviderConfig, SearchProvider, SearchResult as SearchResultType},
    utils::http::{self, HttpClient},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const PAGE_SIZE: &str = "20";
const LANGUAGE: &str = "en";
const HEADLINE_COUNTRY: &str = "us";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default)]
    source: Option<NewsSource>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsSource {
    #[serde(default)]
    name: Option<String>,
}

/// Which NewsAPI endpoint a provider instance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsApiEndpoint {
    /// `top-headlines`, restricted to one country
    Headlines,
    /// `everything`, sorted by relevancy
    Everything,
}

impl NewsApiEndpoint {
    fn path(&self) -> &'static str {
        match self {
            NewsApiEndpoint::Headlines => "top-headlines",
            NewsApiEndpoint::Everything => "everything",
        }
    }
}

/// NewsAPI configuration
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    /// NewsAPI key; empty means unconfigured
    pub api_key: String,
    /// Base URL for the API, without the endpoint segment
    pub base_url: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://newsapi.org/v2".to_string(),
        }
    }
}

impl ProviderConfig for NewsApiConfig {
    fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::ConfigError(
                "NewsAPI key is not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Option<&str> {
        Some(&self.api_key)
    }
}

/// NewsAPI provider bound to one endpoint and one id prefix
#[derive(Debug)]
pub struct NewsApiProvider {
    config: NewsApiConfig,
    endpoint: NewsApiEndpoint,
    id_prefix: String,
    http_client: HttpClient,
}

impl NewsApiProvider {
    /// Provider for the `top-headlines` endpoint (trending mode)
    pub fn headlines(config: NewsApiConfig, http_client: HttpClient) -> Self {
        Self::new(config, NewsApiEndpoint::Headlines, "trending", http_client)
    }

    /// Provider for the `everything` endpoint (news mode)
    pub fn everything(config: NewsApiConfig, http_client: HttpClient) -> Self {
        Self::new(config, NewsApiEndpoint::Everything, "news", http_client)
    }

    pub fn new(
        config: NewsApiConfig,
        endpoint: NewsApiEndpoint,
        id_prefix: &str,
        http_client: HttpClient,
    ) -> Self {
        Self {
            config,
            endpoint,
            id_prefix: id_prefix.to_string(),
            http_client,
        }
    }

    /// Override the id prefix, e.g. when used as a last-resort web fallback
    pub fn with_id_prefix(mut self, id_prefix: &str) -> Self {
        self.id_prefix = id_prefix.to_string();
        self
    }

    pub fn endpoint(&self) -> NewsApiEndpoint {
        self.endpoint
    }

    fn build_search_url(&self, query: &str) -> SearchResult<String> {
        let base = http::join_path(&self.config.base_url, self.endpoint.path());
        let mut params = vec![
            ("q", query),
            ("apiKey", self.config.api_key.as_str()),
            ("pageSize", PAGE_SIZE),
            ("language", LANGUAGE),
        ];
        match self.endpoint {
            NewsApiEndpoint::Headlines => params.push(("country", HEADLINE_COUNTRY)),
            NewsApiEndpoint::Everything => params.push(("sortBy", "relevancy")),
        }

        http::build_url(&base, &params)
    }

    fn normalize(&self, payload: &Value, stamp: &RequestStamp) -> Vec<SearchResultType> {
        decode_batch::<NewsArticle>(payload, "articles", self.name())
            .into_iter()
            .enumerate()
            .map(|(index, article)| {
                let source = article
                    .source
                    .and_then(|s| s.name)
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string());

                ResultDraft {
                    title: article.title,
                    description: article.description,
                    url: article.url.unwrap_or_default(),
                    image_url: article.url_to_image,
                    video_url: None,
                    source,
                    published_at: article.published_at,
                }
                .finish(stamp.id(&self.id_prefix, index), stamp)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SearchProvider for NewsApiProvider {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn is_configured(&self) -> bool {
        self.config.validate().is_ok()
    }

    async fn fetch(
        &self,
        query: &str,
        stamp: &RequestStamp,
    ) -> SearchResult<Vec<SearchResultType>> {
        self.config.validate()?;

        log::debug!(
            "NewsAPI {} request: query={query:?}",
            self.endpoint.path()
        );

        let url = self.build_search_url(query)?;
        let payload: Value = self.http_client.get_json(&url, "NewsAPI").await?;
        let results = self.normalize(&payload, stamp);

        log::debug!("NewsAPI returned {} articles", results.len());
        Ok(results)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("api_key".to_string(), "***".to_string()); // Hide API key
        config.insert("endpoint".to_string(), self.endpoint.path().to_string());
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config
    }
}
