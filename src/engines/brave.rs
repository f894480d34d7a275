//! Brave Search API engine (keyed)

use super::traits::*;
use crate::network::accept_json;
use crate::results::ResultSet;
use crate::search::SearchError;
use serde_json::Value;

/// Default API endpoint
pub const BRAVE_API_URL: &str = "https://api.search.brave.com";

/// Brave web search through the official JSON API
pub struct Brave {
    base_url: String,
    api_key: String,
}

impl Brave {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(BRAVE_API_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

impl Engine for Brave {
    fn name(&self) -> &str {
        "Brave Search"
    }

    fn request(&self, params: &RequestParams) -> EngineRequest {
        EngineRequest::get(format!(
            "{}/res/v1/web/search?q={}&count={}",
            self.base_url, params.encoded_query, params.count
        ))
        .header("Accept", accept_json())
        .header("X-Subscription-Token", self.api_key.as_str())
    }

    fn response(&self, response: EngineResponse<'_>) -> Result<ResultSet, SearchError> {
        if !response.is_success() {
            return Err(SearchError::UpstreamStatus {
                provider: self.name().to_string(),
                status: response.status,
            });
        }

        let json: Value = serde_json::from_str(&response.text)
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(extract_results(&json))
    }
}

/// Read `web.results[*].{title,url,description}` in order.
///
/// A missing, empty or non-array `web.results` yields an empty set. Fields
/// that are absent or not strings become empty.
pub fn extract_results(root: &Value) -> ResultSet {
    let mut results = ResultSet::new();

    let Some(items) = root
        .get("web")
        .and_then(|web| web.get("results"))
        .and_then(Value::as_array)
    else {
        return results;
    };

    for item in items {
        let pushed = results.push(
            string_field(item, "title"),
            string_field(item, "url"),
            string_field(item, "description"),
        );
        if !pushed {
            break;
        }
    }

    results
}

fn string_field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or_default()
}
