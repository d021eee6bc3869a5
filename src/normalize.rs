//! Shared construction of [`SearchResult`] records from provider output
//!
//! Every provider decodes its own payload into a [`ResultDraft`] and hands it to
//! [`ResultDraft::finish`], which applies the placeholder rules and stamps the id.

use crate::types::SearchResult;
use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

/// Title used when the upstream item has none
pub const TITLE_PLACEHOLDER: &str = "No title";
/// Description used when the upstream item has none
pub const DESCRIPTION_PLACEHOLDER: &str = "No description available";
/// Source used when a link cannot be parsed for its hostname
pub const UNKNOWN_HOST: &str = "unknown";

/// Time a request was issued, plus the token embedded in every result id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestStamp {
    issued_at: DateTime<Utc>,
}

impl RequestStamp {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(issued_at: DateTime<Utc>) -> Self {
        Self { issued_at }
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Millisecond token; unique enough to tell two requests' ids apart
    pub fn token(&self) -> i64 {
        self.issued_at.timestamp_millis()
    }

    /// Request time formatted like `2024-05-01T12:00:00.000Z`
    pub fn iso(&self) -> String {
        self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// `{prefix}-{index}-{token}`
    pub fn id(&self, prefix: &str, index: usize) -> String {
        format!("{prefix}-{index}-{}", self.token())
    }
}

/// A provider item after field mapping, before defaults are applied
#[derive(Debug, Clone, Default)]
pub struct ResultDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub source: String,
    pub published_at: Option<String>,
}

impl ResultDraft {
    /// Apply placeholders and produce the canonical record
    pub fn finish(self, id: String, stamp: &RequestStamp) -> SearchResult {
        let published_at = match non_empty(self.published_at) {
            Some(ts) if DateTime::parse_from_rfc3339(&ts).is_ok() => ts,
            Some(ts) => {
                log::debug!("Replacing unparseable timestamp {ts:?} with request time");
                stamp.iso()
            }
            None => stamp.iso(),
        };

        SearchResult {
            id,
            title: non_empty(self.title).unwrap_or_else(|| TITLE_PLACEHOLDER.to_string()),
            description: non_empty(self.description)
                .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
            url: self.url,
            image_url: non_empty(self.image_url),
            video_url: non_empty(self.video_url),
            source: self.source,
            published_at,
        }
    }
}

/// Treat empty and whitespace-only strings as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Hostname of `link`, or `"unknown"` when it does not parse
pub fn hostname_or_unknown(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}
