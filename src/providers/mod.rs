//! Upstream provider strategies

pub mod duckduckgo;
pub mod google;
pub mod newsapi;
pub mod unsplash;

// Re-export providers for convenience
pub use duckduckgo::DuckDuckGoProvider;
pub use google::GoogleProvider;
pub use newsapi::{NewsApiEndpoint, NewsApiProvider};
pub use unsplash::UnsplashProvider;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode the array under `field`, skipping entries that do not fit `T`
///
/// A missing or non-array field yields an empty batch.
pub(crate) fn decode_batch<T>(payload: &Value, field: &str, provider: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    let Some(items) = payload.get(field).and_then(Value::as_array) else {
        log::debug!("{provider}: payload has no \"{field}\" array, treating as empty");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::debug!("{provider}: skipping malformed item: {e}");
                None
            }
        })
        .collect()
}
