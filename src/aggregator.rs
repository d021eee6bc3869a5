//! Mode-based provider chains with sequential failover

use crate::{
    config::AggregatorConfig,
    error::{SearchError, SearchResult as Result},
    normalize::RequestStamp,
    providers::{
        duckduckgo::DuckDuckGoConfig, google::GoogleConfig, newsapi::NewsApiConfig,
        unsplash::UnsplashConfig, DuckDuckGoProvider, GoogleProvider, NewsApiProvider,
        UnsplashProvider,
    },
    types::{SearchMode, SearchProvider, SearchRequest, SearchResult},
    utils::http::HttpClient,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

/// Dispatches a request to the ordered provider chain for its mode
///
/// Providers in a chain are tried one at a time. The first configured provider
/// returning a non-empty batch wins; unconfigured providers are skipped without
/// a network call, and failures or empty batches move on to the next one.
/// The aggregator keeps no state between requests, so one instance can serve
/// any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct Aggregator {
    chains: HashMap<SearchMode, Vec<Arc<dyn SearchProvider>>>,
    timeout_per_provider: Duration,
}

impl Aggregator {
    /// An aggregator with no chains registered
    pub fn new(timeout_per_provider: Duration) -> Self {
        Self {
            chains: HashMap::new(),
            timeout_per_provider,
        }
    }

    /// Standard wiring: NewsAPI, Google, DuckDuckGo and Unsplash
    pub fn from_config(config: &AggregatorConfig) -> Self {
        let http_client = HttpClient::with_timeout(config.timeout);
        let endpoints = &config.endpoints;

        let newsapi = NewsApiConfig {
            api_key: config.newsapi_key.clone().unwrap_or_default(),
            base_url: endpoints.newsapi.clone(),
        };
        let google = GoogleConfig {
            api_key: config.google_api_key.clone().unwrap_or_default(),
            cx: config.google_search_engine_id.clone().unwrap_or_default(),
            base_url: endpoints.google.clone(),
        };
        let duckduckgo = DuckDuckGoConfig {
            base_url: endpoints.duckduckgo.clone(),
            asset_origin: endpoints.duckduckgo_assets.clone(),
        };
        let unsplash = UnsplashConfig {
            access_key: config.unsplash_access_key.clone().unwrap_or_default(),
            base_url: endpoints.unsplash.clone(),
        };

        let headlines: Arc<dyn SearchProvider> = Arc::new(NewsApiProvider::headlines(
            newsapi.clone(),
            http_client.clone(),
        ));
        let everything: Arc<dyn SearchProvider> = Arc::new(NewsApiProvider::everything(
            newsapi.clone(),
            http_client.clone(),
        ));
        let web_fallback: Arc<dyn SearchProvider> = Arc::new(
            NewsApiProvider::everything(newsapi, http_client.clone())
                .with_id_prefix("web-fallback"),
        );
        let google: Arc<dyn SearchProvider> =
            Arc::new(GoogleProvider::new(google, http_client.clone()));
        let duckduckgo: Arc<dyn SearchProvider> =
            Arc::new(DuckDuckGoProvider::new(duckduckgo, http_client.clone()));
        let unsplash: Arc<dyn SearchProvider> =
            Arc::new(UnsplashProvider::new(unsplash, http_client));

        Self::new(config.timeout)
            .with_chain(SearchMode::Trending, vec![headlines])
            .with_chain(SearchMode::News, vec![everything])
            .with_chain(SearchMode::Web, vec![google, duckduckgo, web_fallback])
            .with_chain(SearchMode::Images, vec![unsplash])
    }

    /// Register (or replace) the ordered chain for `mode`
    pub fn with_chain(mut self, mode: SearchMode, providers: Vec<Arc<dyn SearchProvider>>) -> Self {
        self.chains.insert(mode, providers);
        self
    }

    pub fn chain(&self, mode: SearchMode) -> &[Arc<dyn SearchProvider>] {
        self.chains.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn timeout_per_provider(&self) -> Duration {
        self.timeout_per_provider
    }

    /// Run `request` against its chain, stamping results with the current time
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        self.search_at(request, &RequestStamp::now()).await
    }

    /// Run `request` against its chain with an explicit request stamp
    pub async fn search_at(
        &self,
        request: &SearchRequest,
        stamp: &RequestStamp,
    ) -> Result<Vec<SearchResult>> {
        let chain = self.chain(request.mode);
        log::info!(
            "Search request: mode={} query={:?} providers={}",
            request.mode,
            request.query,
            chain.len()
        );

        let mut attempted_ok = false;
        let mut last_error: Option<SearchError> = None;
        let mut unconfigured = Vec::new();

        for provider in chain {
            let provider_name = provider.name();

            if !provider.is_configured() {
                log::debug!("Skipping unconfigured provider {provider_name}");
                unconfigured.push(provider_name.to_string());
                continue;
            }

            log::debug!("Trying provider {provider_name}");
            match self.fetch_with_timeout(provider.as_ref(), request, stamp).await {
                Ok(results) if !results.is_empty() => {
                    log::info!(
                        "Provider {provider_name} answered with {} results",
                        results.len()
                    );
                    return Ok(results);
                }
                Ok(_) => {
                    log::debug!("Provider {provider_name} returned no usable results");
                    attempted_ok = true;
                }
                Err(err) => {
                    log::warn!("Provider {provider_name} failed: {err}");
                    if let SearchError::HttpError {
                        response_body: Some(body),
                        ..
                    } = &err
                    {
                        log::debug!("Provider {provider_name} error body: {body}");
                    }
                    last_error = Some(err);
                }
            }
        }

        if attempted_ok {
            return Ok(Vec::new());
        }
        if let Some(err) = last_error {
            return Err(err);
        }

        let missing = if unconfigured.is_empty() {
            "no providers registered".to_string()
        } else {
            format!("missing credentials for {}", unconfigured.join(", "))
        };
        Err(SearchError::ConfigError(format!(
            "No search provider is configured for mode \"{}\" ({missing})",
            request.mode
        )))
    }

    /// Call one provider, bounded by the per-call timeout
    async fn fetch_with_timeout(
        &self,
        provider: &dyn SearchProvider,
        request: &SearchRequest,
        stamp: &RequestStamp,
    ) -> Result<Vec<SearchResult>> {
        let start_time = std::time::Instant::now();
        let result = timeout(
            self.timeout_per_provider,
            provider.fetch(&request.query, stamp),
        )
        .await;

        log::debug!(
            "Provider {} finished in {}ms",
            provider.name(),
            start_time.elapsed().as_millis()
        );

        match result {
            Ok(search_result) => search_result,
            Err(_) => Err(SearchError::Timeout {
                timeout_ms: self.timeout_per_provider.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    enum Behavior {
        Results(usize),
        Fail(SearchError),
        Sleep(u64),
    }

    // Mock provider that records the order providers were called in
    #[derive(Debug, Clone)]
    struct MockProvider {
        name: String,
        configured: bool,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl MockProvider {
        fn new(name: &str, behavior: Behavior, journal: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                configured: true,
                behavior,
                calls: Arc::new(AtomicUsize::new(0)),
                journal: Arc::clone(journal),
            }
        }

        fn unconfigured(mut self) -> Self {
            self.configured = false;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn fetch(&self, query: &str, stamp: &RequestStamp) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.journal.lock().unwrap().push(format!("{}:start", self.name));

            let outcome = match &self.behavior {
                Behavior::Results(n) => Ok((0..*n)
                    .map(|i| SearchResult {
                        id: stamp.id(&self.name, i),
                        title: format!("{query} {i}"),
                        description: "d".to_string(),
                        url: format!("https://{}.test/{i}", self.name),
                        image_url: None,
                        video_url: None,
                        source: self.name.clone(),
                        published_at: stamp.iso(),
                    })
                    .collect()),
                Behavior::Fail(err) => Err(err.clone()),
                Behavior::Sleep(ms) => {
                    tokio::time::sleep(Duration::from_millis(*ms)).await;
                    Ok(Vec::new())
                }
            };

            self.journal.lock().unwrap().push(format!("{}:end", self.name));
            outcome
        }
    }

    fn arc(provider: &MockProvider) -> Arc<dyn SearchProvider> {
        Arc::new(provider.clone())
    }

    fn upstream_error() -> SearchError {
        SearchError::HttpError {
            message: "Upstream error: 503 Service Unavailable".to_string(),
            status_code: Some(503),
            response_body: None,
        }
    }

    fn web(query: &str) -> SearchRequest {
        SearchRequest::new(query, SearchMode::Web).unwrap()
    }

    #[tokio::test]
    async fn test_first_configured_success_short_circuits() {
        let journal = Arc::default();
        let google = MockProvider::new("google", Behavior::Results(2), &journal);
        let ddg = MockProvider::new("ddg", Behavior::Results(5), &journal);
        let news = MockProvider::new("news", Behavior::Results(5), &journal);

        let aggregator = Aggregator::new(Duration::from_secs(1)).with_chain(
            SearchMode::Web,
            vec![arc(&google), arc(&ddg), arc(&news)],
        );

        let results = aggregator.search(&web("rust")).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "google");
        assert_eq!(google.calls(), 1);
        assert_eq!(ddg.calls(), 0);
        assert_eq!(news.calls(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_skipped_and_empty_falls_through() {
        let journal = Arc::default();
        let google = MockProvider::new("google", Behavior::Results(3), &journal).unconfigured();
        let ddg = MockProvider::new("ddg", Behavior::Results(0), &journal);
        let news = MockProvider::new("news", Behavior::Results(4), &journal);

        let aggregator = Aggregator::new(Duration::from_secs(1)).with_chain(
            SearchMode::Web,
            vec![arc(&google), arc(&ddg), arc(&news)],
        );

        let results = aggregator.search(&web("rust")).await.unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.source == "news"));
        assert_eq!(google.calls(), 0);
        assert_eq!(ddg.calls(), 1);
    }

    #[tokio::test]
    async fn test_error_falls_through() {
        let journal = Arc::default();
        let ddg = MockProvider::new("ddg", Behavior::Fail(upstream_error()), &journal);
        let news = MockProvider::new("news", Behavior::Results(1), &journal);

        let aggregator = Aggregator::new(Duration::from_secs(1))
            .with_chain(SearchMode::Web, vec![arc(&ddg), arc(&news)]);

        let results = aggregator.search(&web("rust")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(news.calls(), 1);
    }

    #[tokio::test]
    async fn test_providers_run_strictly_in_sequence() {
        let journal: Arc<Mutex<Vec<String>>> = Arc::default();
        let slow = MockProvider::new("slow", Behavior::Sleep(20), &journal);
        let failing = MockProvider::new("failing", Behavior::Fail(upstream_error()), &journal);
        let last = MockProvider::new("last", Behavior::Results(1), &journal);

        let aggregator = Aggregator::new(Duration::from_secs(1)).with_chain(
            SearchMode::Web,
            vec![arc(&slow), arc(&failing), arc(&last)],
        );
        aggregator.search(&web("rust")).await.unwrap();

        let journal = journal.lock().unwrap().clone();
        assert_eq!(
            journal,
            vec![
                "slow:start",
                "slow:end",
                "failing:start",
                "failing:end",
                "last:start",
                "last:end"
            ]
        );
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let journal = Arc::default();
        let slow = MockProvider::new("slow", Behavior::Sleep(500), &journal);
        let news = MockProvider::new("news", Behavior::Results(2), &journal);

        let aggregator = Aggregator::new(Duration::from_millis(20))
            .with_chain(SearchMode::Web, vec![arc(&slow), arc(&news)]);
        let results = aggregator.search(&web("rust")).await.unwrap();
        assert_eq!(results.len(), 2);

        let only_slow = Aggregator::new(Duration::from_millis(20))
            .with_chain(SearchMode::News, vec![arc(&slow)]);
        let err = only_slow
            .search(&SearchRequest::new("rust", SearchMode::News).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn test_single_provider_unconfigured_is_configuration_error() {
        let journal = Arc::default();
        let news = MockProvider::new("newsapi", Behavior::Results(3), &journal).unconfigured();
        let aggregator = Aggregator::new(Duration::from_secs(1))
            .with_chain(SearchMode::News, vec![arc(&news)]);

        let err = aggregator
            .search(&SearchRequest::new("rust", SearchMode::News).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("newsapi"));
        assert_eq!(news.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_provider_error_surfaces() {
        let journal = Arc::default();
        let news = MockProvider::new("newsapi", Behavior::Fail(upstream_error()), &journal);
        let aggregator = Aggregator::new(Duration::from_secs(1))
            .with_chain(SearchMode::Trending, vec![arc(&news)]);

        let err = aggregator
            .search(&SearchRequest::new("rust", SearchMode::Trending).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("503 Service Unavailable"));
    }

    #[tokio::test]
    async fn test_exhausted_chain_with_empty_batches_is_empty_success() {
        let journal = Arc::default();
        let ddg = MockProvider::new("ddg", Behavior::Results(0), &journal);
        let news = MockProvider::new("news", Behavior::Results(0), &journal).unconfigured();
        let aggregator = Aggregator::new(Duration::from_secs(1))
            .with_chain(SearchMode::Web, vec![arc(&ddg), arc(&news)]);

        let results = aggregator.search(&web("zzzz")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_mode_is_configuration_error() {
        let aggregator = Aggregator::new(Duration::from_secs(1));
        let err = aggregator
            .search(&SearchRequest::new("cats", SearchMode::Images).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_config_wiring() {
        let config = AggregatorConfig {
            newsapi_key: Some("n".to_string()),
            ..Default::default()
        };
        let aggregator = Aggregator::from_config(&config);

        let names = |mode| {
            aggregator
                .chain(mode)
                .iter()
                .map(|p| p.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(SearchMode::Web), ["google", "duckduckgo", "newsapi"]);
        assert_eq!(names(SearchMode::News), ["newsapi"]);
        assert_eq!(names(SearchMode::Trending), ["newsapi"]);
        assert_eq!(names(SearchMode::Images), ["unsplash"]);

        let web = aggregator.chain(SearchMode::Web);
        assert!(!web[0].is_configured());
        assert!(web[1].is_configured());
        assert!(web[2].is_configured());
        assert!(!aggregator.chain(SearchMode::Images)[0].is_configured());
        assert_eq!(aggregator.timeout_per_provider(), Duration::from_secs(10));
    }
}
