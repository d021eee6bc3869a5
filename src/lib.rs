//! # Gyaan Search
//!
//! Multi-source search aggregation: one `(query, mode)` request is answered by
//! whichever upstream provider for that mode responds first with usable data,
//! and every answer comes back in the same [`SearchResult`] shape.
//!
//! | mode       | providers, in order                                      |
//! |------------|----------------------------------------------------------|
//! | `web`      | Google Custom Search, DuckDuckGo Instant Answer, NewsAPI |
//! | `news`     | NewsAPI `everything`                                     |
//! | `trending` | NewsAPI `top-headlines`                                  |
//! | `images`   | Unsplash                                                 |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gyaan_search::{search, Aggregator, AggregatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AggregatorConfig::from_env()?;
//!     let aggregator = Aggregator::from_config(&config);
//!
//!     let results = search(&aggregator, "rust programming language", "news").await?;
//!     for result in results {
//!         println!("{}: {}", result.title, result.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod normalize;
pub mod providers;
pub mod server;
pub mod types;
pub mod utils;

// Re-export common types
pub use aggregator::Aggregator;
pub use config::AggregatorConfig;
pub use error::{ErrorKind, SearchError, SearchResult as Result};
pub use types::{SearchMode, SearchProvider, SearchRequest, SearchResult};

/// Validate raw caller input and run it through `aggregator`
///
/// Input is rejected before any upstream call is made.
///
/// # Examples
///
/// ```rust,no_run
/// use gyaan_search::{search, Aggregator, AggregatorConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let aggregator = Aggregator::from_config(&AggregatorConfig::default());
/// let results = search(&aggregator, "ferris the crab", "web").await?;
/// # Ok(())
/// # }
/// ```
pub async fn search(aggregator: &Aggregator, query: &str, mode: &str) -> Result<Vec<SearchResult>> {
    let request = SearchRequest::parse(Some(query), Some(mode))?;

    match aggregator.search(&request).await {
        Ok(results) => {
            log::debug!("Received {} results", results.len());
            Ok(results)
        }
        Err(error) => {
            log::debug!("Search in mode '{}' failed: {error}", request.mode);
            Err(error)
        }
    }
}

/// Operator-facing suggestion for a failed search, when one applies
pub fn troubleshooting_hint(error: &SearchError) -> Option<&'static str> {
    match error {
        SearchError::HttpError {
            status_code: Some(401 | 403),
            ..
        } => Some("This is likely an authentication issue. Check that the API key is valid and has the correct permissions."),
        SearchError::HttpError {
            status_code: Some(400),
            ..
        } => Some("The upstream rejected the request parameters. Check the query for unsupported characters."),
        SearchError::HttpError {
            status_code: Some(426 | 429),
            ..
        } => Some("The upstream rate limit or plan quota was exceeded. Try again later or upgrade the plan."),
        SearchError::HttpError {
            status_code: Some(500..=599),
            ..
        } => Some("The search provider is experiencing server issues. Try again later."),
        SearchError::Timeout { .. } => Some("The provider did not answer in time. Raise SEARCH_TIMEOUT_MS if this keeps happening."),
        SearchError::ConfigError(_) => Some("Set the environment variables listed by `gyaan-search providers`."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::RequestStamp;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    // Mock provider for testing
    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn fetch(&self, query: &str, stamp: &RequestStamp) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SearchResult {
                id: stamp.id("count", 0),
                title: query.to_string(),
                description: "d".to_string(),
                url: "https://example.com".to_string(),
                image_url: None,
                video_url: None,
                source: "example.com".to_string(),
                published_at: stamp.iso(),
            }])
        }
    }

    fn aggregator(provider: &Arc<CountingProvider>) -> Aggregator {
        let mut aggregator = Aggregator::new(Duration::from_secs(1));
        for mode in SearchMode::ALL {
            aggregator = aggregator.with_chain(mode, vec![provider.clone() as Arc<dyn SearchProvider>]);
        }
        aggregator
    }

    #[tokio::test]
    async fn test_search_success() {
        let provider = Arc::new(CountingProvider::default());
        let results = search(&aggregator(&provider), "rust", "trending").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "rust");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_upstream_call() {
        let provider = Arc::new(CountingProvider::default());
        let aggregator = aggregator(&provider);

        for (query, mode) in [("", "web"), ("   ", "news"), ("rust", "videos")] {
            let err = search(&aggregator, query, mode).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ClientInput);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_troubleshooting_hints() {
        let cases = vec![
            (401, "authentication issue"),
            (403, "authentication issue"),
            (400, "request parameters"),
            (429, "rate limit"),
            (503, "server issues"),
        ];

        for (status, expected_text) in cases {
            let error = SearchError::HttpError {
                message: format!("status {status}"),
                status_code: Some(status),
                response_body: None,
            };
            let hint = troubleshooting_hint(&error).unwrap();
            assert!(
                hint.contains(expected_text),
                "Expected '{hint}' to contain '{expected_text}'"
            );
        }

        assert!(troubleshooting_hint(&SearchError::Timeout { timeout_ms: 1 }).is_some());
        assert!(troubleshooting_hint(&SearchError::Other("x".to_string())).is_none());
    }
}
