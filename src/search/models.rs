//! Search query and backend configuration models

use super::error::SearchError;
use crate::secrets::{SecretStore, API_KEY, SEARCH_NAMESPACE};
use crate::text::encode;
use serde_json::Value;
use tracing::info;

/// Longest encoded query sent to a provider
pub const ENCODED_QUERY_MAX: usize = 255;

/// Validated, non-blank query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Result<Self, SearchError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SearchError::MissingQuery);
        }
        Ok(Self { text })
    }

    /// Parse the tool input `{"query": "<text>"}`
    pub fn from_json(input: &str) -> Result<Self, SearchError> {
        let input: Value = serde_json::from_str(input).map_err(|_| SearchError::InvalidInput)?;
        let text = input
            .get("query")
            .and_then(Value::as_str)
            .ok_or(SearchError::MissingQuery)?;
        Self::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Form-encoded query, at most [`ENCODED_QUERY_MAX`] bytes
    pub fn encoded(&self) -> String {
        encode(&self.text, ENCODED_QUERY_MAX)
    }
}

/// Provider key in effect
#[derive(Clone, Default)]
pub struct BackendConfig {
    api_key: Option<String>,
}

impl BackendConfig {
    /// Start from `default_key`, then let a persisted key override it
    pub fn load(default_key: Option<&str>, store: &dyn SecretStore) -> Self {
        let mut api_key = default_key
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        if let Some(stored) = store
            .get(SEARCH_NAMESPACE, API_KEY)
            .filter(|key| !key.is_empty())
        {
            api_key = Some(stored);
        }

        let config = Self { api_key };
        if config.has_key() {
            info!("Web search initialized (key configured)");
        } else {
            info!("No search API key configured. DuckDuckGo fallback active.");
        }
        config
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn replace_key(&mut self, key: &str) {
        self.api_key = Some(key.to_string()).filter(|key| !key.is_empty());
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_query_validation() {
        assert!(SearchQuery::new("rust").is_ok());
        assert!(matches!(SearchQuery::new(""), Err(SearchError::MissingQuery)));
        assert!(matches!(SearchQuery::new(" \t\n"), Err(SearchError::MissingQuery)));
    }

    #[test]
    fn test_from_json() {
        let query = SearchQuery::from_json(r#"{"query": "rust async"}"#).unwrap();
        assert_eq!(query.text(), "rust async");
        assert_eq!(query.encoded(), "rust+async");

        assert!(matches!(SearchQuery::from_json("not json"), Err(SearchError::InvalidInput)));
        assert!(matches!(SearchQuery::from_json("{}"), Err(SearchError::MissingQuery)));
        assert!(matches!(
            SearchQuery::from_json(r#"{"query": 7}"#),
            Err(SearchError::MissingQuery)
        ));
        assert!(matches!(
            SearchQuery::from_json(r#"{"query": ""}"#),
            Err(SearchError::MissingQuery)
        ));
    }

    #[test]
    fn test_encoded_is_bounded() {
        let query = SearchQuery::new("&".repeat(1000)).unwrap();
        assert!(query.encoded().len() <= ENCODED_QUERY_MAX);
    }

    #[test]
    fn test_key_precedence() {
        let empty = MemorySecretStore::new();
        assert!(!BackendConfig::load(None, &empty).has_key());
        assert!(!BackendConfig::load(Some(""), &empty).has_key());
        assert_eq!(BackendConfig::load(Some("built-in"), &empty).api_key(), Some("built-in"));

        let stored = MemorySecretStore::with_value(SEARCH_NAMESPACE, API_KEY, "persisted");
        assert_eq!(BackendConfig::load(Some("built-in"), &stored).api_key(), Some("persisted"));
        assert_eq!(BackendConfig::load(None, &stored).api_key(), Some("persisted"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let store = MemorySecretStore::with_value(SEARCH_NAMESPACE, API_KEY, "sk-secret");
        let config = BackendConfig::load(None, &store);
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
