//! Google Custom Search API provider (licensed web search)

use crate::{
    error::{SearchError, SearchResult},
    normalize::{hostname_or_unknown, RequestStamp, ResultDraft},
    providers::decode_batch,
    types::{ProviderConfig, SearchProvider, SearchResult as SearchResultType},
    utils::http::{self, HttpClient},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Google Custom Search response item
#[derive(Debug, Deserialize)]
struct GoogleSearchItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    pagemap: Option<GooglePageMap>,
}

#[derive(Debug, Default, Deserialize)]
struct GooglePageMap {
    #[serde(default)]
    cse_image: Vec<CseImage>,
    #[serde(default)]
    videoobject: Vec<VideoObject>,
}

#[derive(Debug, Deserialize)]
struct CseImage {
    #[serde(default)]
    src: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoObject {
    #[serde(default)]
    embedurl: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl GooglePageMap {
    fn image(&self) -> Option<String> {
        self.cse_image.first().and_then(|img| img.src.clone())
    }

    // embedurl wins over url when both are present
    fn video(&self) -> Option<String> {
        self.videoobject.first().and_then(|video| {
            video
                .embedurl
                .clone()
                .filter(|u| !u.is_empty())
                .or_else(|| video.url.clone())
        })
    }
}

/// Google Custom Search configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Google API key
    pub api_key: String,
    /// Custom Search Engine ID
    pub cx: String,
    /// Base URL for the API
    pub base_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cx: String::new(),
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
        }
    }
}

impl ProviderConfig for GoogleConfig {
    fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::ConfigError(
                "Google Search API key is not configured".to_string(),
            ));
        }
        if self.cx.is_empty() {
            return Err(SearchError::ConfigError(
                "Google Search Engine ID (cx) is not configured".to_string(),
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

/// Google Custom Search provider
#[derive(Debug)]
pub struct GoogleProvider {
    config: GoogleConfig,
    http_client: HttpClient,
}

impl GoogleProvider {
    pub fn new(config: GoogleConfig, http_client: HttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build the search URL with parameters
    fn build_search_url(&self, query: &str) -> SearchResult<String> {
        http::build_url(
            &self.config.base_url,
            &[
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.cx.as_str()),
                ("q", query),
                ("num", "10"),
            ],
        )
    }

    fn normalize(&self, payload: &Value, stamp: &RequestStamp) -> Vec<SearchResultType> {
        decode_batch::<GoogleSearchItem>(payload, "items", self.name())
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let pagemap = item.pagemap.unwrap_or_default();
                let link = item.link.unwrap_or_default();

                ResultDraft {
                    title: item.title,
                    description: item.snippet,
                    source: hostname_or_unknown(&link),
                    url: link,
                    image_url: pagemap.image(),
                    video_url: pagemap.video(),
                    published_at: None,
                }
                .finish(stamp.id("web", index), stamp)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SearchProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
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

        log::debug!("Google Search request: query={query:?}");

        let url = self.build_search_url(query)?;
        let payload: Value = self
            .http_client
            .get_json(&url, "Google Search API")
            .await?;
        let results = self.normalize(&payload, stamp);

        log::debug!("Google Search returned {} results", results.len());
        Ok(results)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("api_key".to_string(), "***".to_string()); // Hide API key
        config.insert("cx".to_string(), self.config.cx.clone());
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config
    }
}
