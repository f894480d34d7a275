//! webdigest: a bounded web search tool
//!
//! Takes a free-text query, asks one of two providers (the Brave Search
//! JSON API when a key is configured, the DuckDuckGo HTML endpoint when not)
//! and renders at most five results as a compact text report. Responses are
//! held in a fixed-size buffer, so memory stays bounded no matter how large
//! the upstream page is.

pub mod config;
pub mod engines;
pub mod network;
pub mod results;
pub mod search;
pub mod secrets;
pub mod text;

pub use config::Settings;
pub use engines::Engine;
pub use results::{ResultSet, SearchResult};
pub use search::{ErrorKind, SearchError, SearchQuery, ToolOutput, WebSearch};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Results kept per search
pub const RESULT_COUNT: usize = 5;

/// Default connect and read timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 15;
