//! Unsplash photo search provider

use crate::{
    error::{SearchError, SearchResult},
    normalize::{non_empty, RequestStamp, ResultDraft},
    providers::decode_batch,
    types::{ProviderConfig, SearchProvider, SearchResult as SearchResultType},
    utils::http::{self, HttpClient},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const PER_PAGE: &str = "20";
const ORIENTATION: &str = "landscape";
const PROVIDER_LABEL: &str = "Unsplash";

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    urls: Option<PhotoUrls>,
    #[serde(default)]
    links: Option<PhotoLinks>,
    #[serde(default)]
    user: Option<Photographer>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    regular: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoLinks {
    #[serde(default)]
    html: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Photographer {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Unsplash configuration
#[derive(Debug, Clone)]
pub struct UnsplashConfig {
    /// Unsplash access key; empty means unconfigured
    pub access_key: String,
    /// Base URL for the API
    pub base_url: String,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            base_url: "https://api.unsplash.com".to_string(),
        }
    }
}

impl ProviderConfig for UnsplashConfig {
    fn validate(&self) -> Result<(), SearchError> {
        if self.access_key.is_empty() {
            return Err(SearchError::ConfigError(
                "Unsplash access key is not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Option<&str> {
        Some(&self.access_key)
    }
}

/// Unsplash stock-photo provider
#[derive(Debug)]
pub struct UnsplashProvider {
    config: UnsplashConfig,
    http_client: HttpClient,
}

impl UnsplashProvider {
    pub fn new(config: UnsplashConfig, http_client: HttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn build_search_url(&self, query: &str) -> SearchResult<String> {
        let base = http::join_path(&self.config.base_url, "search/photos");
        http::build_url(
            &base,
            &[
                ("query", query),
                ("per_page", PER_PAGE),
                ("orientation", ORIENTATION),
            ],
        )
    }

    fn normalize(&self, payload: &Value, stamp: &RequestStamp) -> Vec<SearchResultType> {
        decode_batch::<Photo>(payload, "results", self.name())
            .into_iter()
            .enumerate()
            .map(|(index, photo)| {
                let user = photo.user.unwrap_or_default();
                let handle = non_empty(user.username).unwrap_or_else(|| "unknown".to_string());
                let author = non_empty(user.name).unwrap_or_else(|| handle.clone());
                let title = non_empty(photo.description)
                    .or_else(|| non_empty(photo.alt_description))
                    .unwrap_or_else(|| "Untitled".to_string());

                ResultDraft {
                    title: Some(title),
                    description: Some(format!("Photo by {author} on {PROVIDER_LABEL}")),
                    url: photo.links.and_then(|l| l.html).unwrap_or_default(),
                    image_url: photo.urls.and_then(|u| u.regular),
                    video_url: None,
                    source: format!("{PROVIDER_LABEL}/@{handle}"),
                    published_at: photo.created_at,
                }
                .finish(stamp.id("img", index), stamp)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SearchProvider for UnsplashProvider {
    fn name(&self) -> &str {
        "unsplash"
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

        log::debug!("Unsplash photo search request: query={query:?}");

        let url = self.build_search_url(query)?;
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Client-ID {}", self.config.access_key),
        );
        headers.insert("Accept-Version".to_string(), "v1".to_string());

        let payload: Value = self
            .http_client
            .get_json_with_headers(&url, headers, "Unsplash API")
            .await?;
        let results = self.normalize(&payload, stamp);

        log::debug!("Unsplash returned {} photos", results.len());
        Ok(results)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("access_key".to_string(), "***".to_string()); // Hide API key
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn provider() -> UnsplashProvider {
        UnsplashProvider::new(
            UnsplashConfig {
                access_key: "abc".to_string(),
                ..Default::default()
            },
            HttpClient::new(),
        )
    }

    fn stamp() -> RequestStamp {
        RequestStamp::at(Utc.with_ymd_and_hms(2024, 2, 2, 2, 2, 2).unwrap())
    }

    #[test]
    fn test_search_url() {
        let url = provider().build_search_url("mountain lake").unwrap();
        assert_eq!(
            url,
            "https://api.unsplash.com/search/photos?query=mountain+lake&per_page=20&orientation=landscape"
        );
    }

    #[test]
    fn test_normalize_photo() {
        let payload = json!({
            "total": 1,
            "results": [{
                "id": "abc123",
                "created_at": "2016-05-03T11:00:28-04:00",
                "description": null,
                "alt_description": "a lake below mountains",
                "urls": {"small": "https://images/s", "regular": "https://images/r"},
                "links": {"html": "https://unsplash.com/photos/abc123"},
                "user": {"name": "Jane Doe", "username": "janed"}
            }]
        });

        let results = provider().normalize(&payload, &stamp());
        assert_eq!(results.len(), 1);
        let photo = &results[0];
        assert_eq!(photo.id, format!("img-0-{}", stamp().token()));
        assert_eq!(photo.title, "a lake below mountains");
        assert_eq!(photo.description, "Photo by Jane Doe on Unsplash");
        assert_eq!(photo.url, "https://unsplash.com/photos/abc123");
        assert_eq!(photo.image_url.as_deref(), Some("https://images/r"));
        assert_eq!(photo.source, "Unsplash/@janed");
        assert_eq!(photo.published_at, "2016-05-03T11:00:28-04:00");
    }

    #[test]
    fn test_untitled_fallback() {
        let payload = json!({
            "results": [{
                "urls": {"regular": "https://images/r"},
                "links": {"html": "https://unsplash.com/photos/x"},
                "user": {"username": "anon"},
                "created_at": "2020-01-01T00:00:00Z"
            }]
        });
        let results = provider().normalize(&payload, &stamp());
        assert_eq!(results[0].title, "Untitled");
        assert_eq!(results[0].description, "Photo by anon on Unsplash");
    }

    #[test]
    fn test_unconfigured() {
        let provider = UnsplashProvider::new(UnsplashConfig::default(), HttpClient::new());
        assert!(!provider.is_configured());
    }
}
