//! HTTP utilities for making requests to upstream search APIs

use crate::error::{SearchError, SearchResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("gyaan-search/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper shared by every provider
///
/// Cloning is cheap: the underlying connection pool is reference counted.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with the default per-call timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS))
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            default_timeout: timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Make a GET request and deserialize the JSON response
    ///
    /// `label` names the upstream in the error message, e.g. `"NewsAPI"`.
    pub async fn get_json<T>(&self, url: &str, label: &str) -> SearchResult<T>
    where
        T: DeserializeOwned,
    {
        self.get_json_with_headers(url, HashMap::new(), label).await
    }

    /// Make a GET request with headers and deserialize the JSON response
    pub async fn get_json_with_headers<T>(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        label: &str,
    ) -> SearchResult<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.client.get(url).timeout(self.default_timeout);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        self.handle_response_json(response, label).await
    }

    fn map_send_error(&self, error: reqwest::Error) -> SearchError {
        if error.is_timeout() {
            SearchError::Timeout {
                timeout_ms: self.default_timeout.as_millis() as u64,
            }
        } else {
            error.into()
        }
    }

    /// Handle HTTP response and deserialize as JSON
    async fn handle_response_json<T>(&self, response: Response, label: &str) -> SearchResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            let json = response.json::<T>().await.map_err(|e| self.map_send_error(e))?;
            Ok(json)
        } else {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();

            Err(SearchError::HttpError {
                message: format!("{label} error: {status}"),
                status_code: Some(status_code),
                response_body,
            })
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a URL with query parameters, appended in the given order
pub fn build_url(base_url: &str, params: &[(&str, &str)]) -> SearchResult<String> {
    let mut url = Url::parse(base_url)?;

    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url.to_string())
}

/// Join `path` onto `base_url`, tolerating a trailing slash on either side
pub fn join_path(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Resolve a possibly relative or scheme-less link against `origin`
pub fn absolutize(link: &str, origin: &str) -> String {
    if link.starts_with("//") {
        format!("https:{link}")
    } else if link.starts_with('/') {
        join_path(origin, link)
    } else if !link.starts_with("http://") && !link.starts_with("https://") {
        format!("https://{link}")
    } else {
        link.to_string()
    }
}
