//! Direct HTTPS transport

use super::accumulator::ResponseBuffer;
use super::error::TransportError;
use super::user_agent::default_user_agent;
use crate::config::OutgoingSettings;
use crate::engines::{EngineRequest, HttpMethod};
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// HTTP client wrapper that streams bodies into a [`ResponseBuffer`]
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    read_timeout: Duration,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self, TransportError> {
        let read_timeout = settings.timeout();
        let client = Client::builder()
            .timeout(read_timeout)
            .connect_timeout(read_timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            read_timeout,
            user_agent: settings
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        })
    }

    /// Send `request` and feed every body chunk into `buffer`.
    ///
    /// Returns the response status. A non-success body is not read.
    pub async fn fetch(
        &self,
        request: &EngineRequest,
        buffer: &mut ResponseBuffer,
    ) -> Result<u16, TransportError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder.header("User-Agent", &self.user_agent);
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            req_builder = req_builder.body(body.clone());
        }

        let mut response = req_builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(status.as_u16());
        }

        let mut chunks = 0usize;
        loop {
            match timeout(self.read_timeout, response.chunk()).await {
                Ok(Ok(Some(chunk))) => {
                    chunks += 1;
                    buffer.feed(&chunk);
                }
                Ok(Ok(None)) => break,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(TransportError::Timeout(self.read_timeout)),
            }
        }

        debug!(
            "Read {} chunks from {}, kept {} bytes",
            chunks,
            request.url,
            buffer.len()
        );
        Ok(status.as_u16())
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
