//! Error types for the search aggregator

use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Comprehensive error types for search operations
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Upstream responded with a non-success status, or the request never completed
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required credentials or settings are missing
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Upstream payload could not be decoded at all
    #[error("Parsing error: {0}")]
    ParseError(String),

    /// Timeout error
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Generic error for unhandled cases
    #[error("Search error: {0}")]
    Other(String),
}

/// Caller-facing classification of a [`SearchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid query/mode; safe to show verbatim
    ClientInput,
    /// An integration the request depends on has no credentials
    Configuration,
    /// The last provider available for the request failed or timed out
    Upstream,
    /// Anything else; only a generic message reaches the caller
    Unexpected,
}

impl SearchError {
    /// Classify this error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidInput(_) => ErrorKind::ClientInput,
            SearchError::ConfigError(_) => ErrorKind::Configuration,
            SearchError::HttpError { .. } | SearchError::Timeout { .. } => ErrorKind::Upstream,
            SearchError::ParseError(_) | SearchError::Other(_) => ErrorKind::Unexpected,
        }
    }

    /// Whether this error came from a call that ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, SearchError::Timeout { .. })
    }
}

/// Timeouts are not mapped here: only the caller knows the limit it applied,
/// see `HttpClient::map_send_error`.
impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            SearchError::ParseError(format!("Response body could not be decoded: {error}"))
        } else {
            // Strip the URL: it carries API keys in its query string
            let status_code = error.status().map(|s| s.as_u16());
            SearchError::HttpError {
                message: error.without_url().to_string(),
                status_code,
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::ParseError(format!("JSON parsing failed: {error}"))
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::ConfigError(format!("Invalid provider URL: {error}"))
    }
}
