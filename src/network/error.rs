//! Transport failures

use thiserror::Error;

/// Failure while moving bytes to or from a provider
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connect to {host}:{port} failed: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl TransportError {
    /// Whether the failure was a deadline expiring rather than a refusal
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout(),
            Self::Read(e) | Self::Write(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}
