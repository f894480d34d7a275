//! Result type definitions

use crate::RESULT_COUNT;
use serde::{Deserialize, Serialize};

/// Title shown when a result has none
pub const NO_TITLE: &str = "(no title)";

/// A single search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based position in provider relevance order
    pub rank: usize,
    /// Display title, never empty
    pub title: String,
    /// Destination URL; empty when none could be extracted
    pub url: String,
    /// Description text, possibly empty
    pub snippet: String,
}

/// Ordered results, never more than [`RESULT_COUNT`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<SearchResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self {
            results: Vec::with_capacity(RESULT_COUNT),
        }
    }

    /// Append a result in relevance order.
    ///
    /// Returns `false` once the set is full; the result is dropped.
    pub fn push(
        &mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> bool {
        if self.is_full() {
            return false;
        }

        let title = title.into();
        self.results.push(SearchResult {
            rank: self.results.len() + 1,
            title: if title.is_empty() {
                NO_TITLE.to_string()
            } else {
                title
            },
            url: url.into(),
            snippet: snippet.into(),
        });
        true
    }

    pub fn is_full(&self) -> bool {
        self.results.len() >= RESULT_COUNT
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
