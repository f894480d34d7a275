//! Search failures and their codes

use crate::network::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that can end a search early
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid input JSON")]
    InvalidInput,

    #[error("Missing 'query' field")]
    MissingQuery,

    #[error("Out of memory")]
    OutOfMemory,

    #[error("{provider} search request failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: TransportError,
    },

    #[error("{provider} returned HTTP {status}")]
    UpstreamStatus { provider: String, status: u16 },

    #[error("Failed to parse search results: {0}")]
    Parse(String),

    #[error("Failed to save search key: {0}")]
    SecretStore(String),
}

impl SearchError {
    /// Stable code for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput | Self::MissingQuery => ErrorKind::InvalidArgument,
            Self::OutOfMemory => ErrorKind::OutOfMemory,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::UpstreamStatus { .. } => ErrorKind::UpstreamStatus,
            Self::Parse(_) => ErrorKind::Parse,
            Self::SecretStore(_) => ErrorKind::SecretStore,
        }
    }

    /// One-line report written in place of results
    pub fn report(&self) -> String {
        format!("Error: {}", self)
    }
}

/// Error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    OutOfMemory,
    Transport,
    UpstreamStatus,
    Parse,
    SecretStore,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::OutOfMemory => "out_of_memory",
            Self::Transport => "transport",
            Self::UpstreamStatus => "upstream_status",
            Self::Parse => "parse",
            Self::SecretStore => "secret_store",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
