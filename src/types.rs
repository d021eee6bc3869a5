//! Core types and traits for the search aggregator

use crate::error::SearchError;
use crate::normalize::RequestStamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Longest query accepted from a caller, in characters
pub const MAX_QUERY_LENGTH: usize = 1000;

/// A normalized search result, identical in shape whichever provider produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Unique within one response
    pub id: String,
    /// Title of the item; never empty
    pub title: String,
    /// Summary text; never empty
    pub description: String,
    /// Canonical link to the source item
    pub url: String,
    /// Representative image, if the provider supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Embeddable video, if the provider supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Provenance: hostname, publisher name or "Unsplash/@handle"
    pub source: String,
    /// ISO-8601 timestamp
    pub published_at: String,
}

/// Caller-selected search category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Web,
    News,
    Trending,
    Images,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Web,
        SearchMode::News,
        SearchMode::Trending,
        SearchMode::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Web => "web",
            SearchMode::News => "news",
            SearchMode::Trending => "trending",
            SearchMode::Images => "images",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                SearchError::InvalidInput(format!(
                    "Invalid mode \"{s}\". Use \"web\", \"news\", \"trending\", or \"images\""
                ))
            })
    }
}

/// A validated aggregation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub mode: SearchMode,
}

impl SearchRequest {
    /// Build a request, rejecting empty or oversized queries
    pub fn new(query: &str, mode: SearchMode) -> Result<Self, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidInput(
                "Query parameter is required".to_string(),
            ));
        }
        if query.chars().count() > MAX_QUERY_LENGTH {
            return Err(SearchError::InvalidInput(format!(
                "Search query must be less than {MAX_QUERY_LENGTH} characters"
            )));
        }

        Ok(Self {
            query: query.to_string(),
            mode,
        })
    }

    /// Build a request from raw caller strings; a missing mode means `web`
    pub fn parse(query: Option<&str>, mode: Option<&str>) -> Result<Self, SearchError> {
        let query = query.unwrap_or_default();
        if query.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "Query parameter is required".to_string(),
            ));
        }
        let mode = match mode {
            Some(raw) => raw.parse()?,
            None => SearchMode::default(),
        };
        Self::new(query, mode)
    }
}

/// Trait that every upstream provider strategy implements
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync + std::fmt::Debug {
    /// Name of the provider, used in logs and configuration errors
    fn name(&self) -> &str;

    /// Whether the credentials this provider needs are present
    fn is_configured(&self) -> bool;

    /// Query the upstream once and normalize its batch
    async fn fetch(
        &self,
        query: &str,
        stamp: &RequestStamp,
    ) -> Result<Vec<SearchResult>, SearchError>;

    /// Get provider configuration (for debugging/logging)
    fn config(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Provider configuration trait for consistent configuration patterns
pub trait ProviderConfig {
    /// Validate the configuration
    fn validate(&self) -> Result<(), SearchError>;

    /// Get the base URL for API requests
    fn base_url(&self) -> &str;

    /// Get API key if required
    fn api_key(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in SearchMode::ALL {
            assert_eq!(mode.as_str().parse::<SearchMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_is_client_error() {
        let err = "videos".parse::<SearchMode>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInput);
        assert!(err.to_string().contains("videos"));

        assert!("WEB".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_request_trims_query() {
        let request = SearchRequest::new("  rust  ", SearchMode::News).unwrap();
        assert_eq!(request.query, "rust");
    }

    #[test]
    fn test_request_rejects_blank_query() {
        for query in ["", "   ", "\t\n"] {
            let err = SearchRequest::new(query, SearchMode::Web).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ClientInput);
        }
    }

    #[test]
    fn test_request_rejects_long_query() {
        let long = "a".repeat(MAX_QUERY_LENGTH + 1);
        let err = SearchRequest::new(&long, SearchMode::Web).unwrap_err();
        assert!(err.to_string().contains("less than"));

        let exact = "a".repeat(MAX_QUERY_LENGTH);
        assert!(SearchRequest::new(&exact, SearchMode::Web).is_ok());
    }

    #[test]
    fn test_parse_defaults_to_web() {
        let request = SearchRequest::parse(Some("rust"), None).unwrap();
        assert_eq!(request.mode, SearchMode::Web);
    }

    #[test]
    fn test_parse_reports_missing_query_before_bad_mode() {
        let err = SearchRequest::parse(None, Some("bogus")).unwrap_err();
        assert!(err.to_string().contains("Query parameter is required"));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = SearchResult {
            id: "news-0-1".to_string(),
            title: "Title".to_string(),
            description: "Description".to_string(),
            url: "https://example.com".to_string(),
            image_url: Some("https://example.com/a.png".to_string()),
            video_url: None,
            source: "Example".to_string(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["imageUrl"], "https://example.com/a.png");
        assert_eq!(json["publishedAt"], "2024-01-01T00:00:00Z");
        assert!(json.get("videoUrl").is_none());
    }
}
