//! DuckDuckGo Instant Answer provider (keyless)
//!
//! The instant-answer API returns at most one abstract plus a list of related
//! topics, some of which are named groups holding further topics. Both shapes
//! are folded into one batch: the abstract first, then every topic entry with
//! groups flattened one level.

use crate::{
    error::{SearchError, SearchResult},
    normalize::{hostname_or_unknown, non_empty, RequestStamp, ResultDraft},
    types::{ProviderConfig, SearchProvider, SearchResult as SearchResultType},
    utils::http::{self, HttpClient},
};
use serde::Deserialize;
use std::collections::HashMap;

/// Separator between a topic's title and the rest of its text
const TITLE_SEPARATOR: &str = " - ";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    abstract_text: Option<String>,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: Option<String>,
    #[serde(default)]
    abstract_source: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, deserialize_with = "lenient_topics")]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Group {
        #[serde(rename = "Name", default)]
        name: Option<String>,
        #[serde(rename = "Topics")]
        topics: Vec<serde_json::Value>,
    },
    Entry(TopicEntry),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TopicEntry {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(default)]
    icon: Option<TopicIcon>,
}

#[derive(Debug, Default, Deserialize)]
struct TopicIcon {
    #[serde(default, rename = "URL")]
    url: Option<String>,
}

/// Accept anything for `RelatedTopics`; entries that fit neither shape are dropped
fn lenient_topics<'de, D>(deserializer: D) -> Result<Vec<RelatedTopic>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let topics = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(topics)
}

/// DuckDuckGo configuration
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    /// Base URL for the instant-answer API
    pub base_url: String,
    /// Origin that relative icon and image paths resolve against
    pub asset_origin: String,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.duckduckgo.com/".to_string(),
            asset_origin: "https://duckduckgo.com".to_string(),
        }
    }
}

impl ProviderConfig for DuckDuckGoConfig {
    fn validate(&self) -> Result<(), SearchError> {
        // No API key needed
        if self.base_url.is_empty() {
            return Err(SearchError::ConfigError(
                "DuckDuckGo base URL is required".to_string(),
            ));
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// DuckDuckGo instant-answer provider
#[derive(Debug)]
pub struct DuckDuckGoProvider {
    config: DuckDuckGoConfig,
    http_client: HttpClient,
}

impl DuckDuckGoProvider {
    pub fn new(config: DuckDuckGoConfig, http_client: HttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn build_search_url(&self, query: &str) -> SearchResult<String> {
        http::build_url(
            &self.config.base_url,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
    }

    fn asset(&self, link: Option<String>) -> Option<String> {
        non_empty(link).map(|l| http::absolutize(&l, &self.config.asset_origin))
    }

    fn normalize(&self, answer: InstantAnswer, stamp: &RequestStamp) -> Vec<SearchResultType> {
        let mut results = Vec::new();

        if let (Some(text), Some(url)) = (
            non_empty(answer.abstract_text),
            non_empty(answer.abstract_url),
        ) {
            let source = non_empty(answer.abstract_source)
                .unwrap_or_else(|| hostname_or_unknown(&url));
            results.push(
                ResultDraft {
                    title: answer.heading,
                    description: Some(text),
                    url,
                    image_url: self.asset(answer.image),
                    video_url: None,
                    source,
                    published_at: None,
                }
                .finish(stamp.id("ddg-abstract", 0), stamp),
            );
        }

        let entries = answer
            .related_topics
            .into_iter()
            .flat_map(|topic| match topic {
                RelatedTopic::Entry(entry) => vec![entry],
                RelatedTopic::Group { name, topics } => {
                    log::trace!("Flattening topic group {name:?} ({} topics)", topics.len());
                    topics
                        .into_iter()
                        .filter_map(|t| serde_json::from_value::<TopicEntry>(t).ok())
                        .collect()
                }
            });

        let mut index = 0;
        for entry in entries {
            let (Some(text), Some(url)) = (non_empty(entry.text), non_empty(entry.first_url))
            else {
                continue;
            };

            let title = text
                .split(TITLE_SEPARATOR)
                .next()
                .map(str::to_string);

            results.push(
                ResultDraft {
                    title,
                    description: Some(text),
                    url,
                    image_url: self.asset(entry.icon.and_then(|icon| icon.url)),
                    video_url: None,
                    source: "DuckDuckGo".to_string(),
                    published_at: None,
                }
                .finish(stamp.id("ddg", index), stamp),
            );
            index += 1;
        }

        results
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new(DuckDuckGoConfig::default(), HttpClient::new())
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn is_configured(&self) -> bool {
        self.config.validate().is_ok()
    }

    async fn fetch(
        &self,
        query: &str,
        stamp: &RequestStamp,
    ) -> SearchResult<Vec<SearchResultType>> {
        log::debug!("DuckDuckGo instant answer request: query={query:?}");

        let url = self.build_search_url(query)?;
        let answer: InstantAnswer = self
            .http_client
            .get_json(&url, "DuckDuckGo Instant Answer API")
            .await?;
        let results = self.normalize(answer, stamp);

        log::debug!("DuckDuckGo returned {} usable entries", results.len());
        Ok(results)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config
    }
}
