//! Search execution and orchestration

use super::error::{ErrorKind, SearchError};
use super::models::{BackendConfig, SearchQuery};
use crate::config::{EngineSettings, Settings};
use crate::engines::{Backend, EngineResponse, RequestParams, Route};
use crate::network::{
    fetch_via_proxy, Connector, DisabledProxy, HttpClient, ResponseBuffer, TransportError,
    TunnelConnector,
};
use crate::results::{bounded, render, ResultSet};
use crate::secrets::{FileSecretStore, SecretStore, SessionSecretStore, API_KEY, SEARCH_NAMESPACE};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one tool invocation: a report, plus an error code on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl ToolOutput {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Web search tool.
///
/// One search runs start to finish per call. Changing the key takes
/// `&mut self`, so it can never overlap a search in flight.
pub struct WebSearch {
    /// Direct transport
    client: HttpClient,
    /// Proxied transport for the keyed provider
    proxy: Box<dyn Connector>,
    /// Where a changed key is persisted
    secrets: Box<dyn SecretStore>,
    config: BackendConfig,
    endpoints: EngineSettings,
    buffer_size: usize,
    output_limit: usize,
    timeout: Duration,
}

impl WebSearch {
    /// Create a search tool from settings and explicit collaborators
    pub fn new(
        settings: &Settings,
        secrets: Box<dyn SecretStore>,
        proxy: Box<dyn Connector>,
    ) -> Result<Self, TransportError> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        let config = BackendConfig::load(settings.search.api_key.as_deref(), secrets.as_ref());

        if proxy.is_enabled() {
            debug!("Proxy transport enabled for keyed searches");
        }

        Ok(Self {
            client,
            proxy,
            secrets,
            config,
            endpoints: settings.engines.clone(),
            buffer_size: settings.search.memory_class.buffer_size(),
            output_limit: settings.search.output_limit,
            timeout: settings.outgoing.timeout(),
        })
    }

    /// Create a search tool with the file secret store and the configured proxy
    pub fn from_settings(settings: &Settings) -> Result<Self, TransportError> {
        let secrets = FileSecretStore::new(settings.secrets.resolved_path());
        Self::with_secrets(settings, Box::new(secrets))
    }

    /// Like [`WebSearch::from_settings`], but a key set later is kept in
    /// memory only. A key already saved on disk is still used.
    pub fn session_only(settings: &Settings) -> Result<Self, TransportError> {
        let persisted = FileSecretStore::new(settings.secrets.resolved_path());
        Self::with_secrets(settings, Box::new(SessionSecretStore::new(Box::new(persisted))))
    }

    /// Create a search tool with the configured proxy and the given secret store
    pub fn with_secrets(
        settings: &Settings,
        secrets: Box<dyn SecretStore>,
    ) -> Result<Self, TransportError> {
        let proxy = &settings.outgoing.proxy;
        let connector: Box<dyn Connector> = match proxy.host.as_deref() {
            Some(host) if proxy.is_active() => Box::new(TunnelConnector::new(host, proxy.port)),
            _ => Box::new(DisabledProxy),
        };
        Self::new(settings, secrets, connector)
    }

    /// Whether a provider key is configured
    pub fn has_api_key(&self) -> bool {
        self.config.has_key()
    }

    /// Persist a new provider key and use it from the next search on.
    ///
    /// An empty key switches back to the anonymous provider.
    pub fn set_api_key(&mut self, key: &str) -> Result<(), SearchError> {
        self.secrets
            .set(SEARCH_NAMESPACE, API_KEY, key)
            .map_err(|e| SearchError::SecretStore(e.to_string()))?;
        self.config.replace_key(key);
        info!("Search API key saved");
        Ok(())
    }

    /// Run `query` against the selected provider and extract its results
    pub async fn results(&self, query: &SearchQuery) -> Result<ResultSet, SearchError> {
        let backend = Backend::select(
            self.config.api_key(),
            self.proxy.is_enabled(),
            &self.endpoints,
        );
        let engine = backend.engine();
        info!("Searching {}: {}", engine.name(), query.text());

        let mut buffer = ResponseBuffer::with_capacity(self.buffer_size, engine.fill_mode())?;
        let request = engine.request(&RequestParams::new(query.encoded()));

        let fetched = match backend.route() {
            Route::Direct => self.client.fetch(&request, &mut buffer).await,
            Route::Proxy => {
                let request = request.header("User-Agent", self.client.user_agent());
                fetch_via_proxy(self.proxy.as_ref(), &request, &mut buffer, self.timeout).await
            }
        };

        let status = fetched.map_err(|source| {
            warn!("{} request failed: {}", engine.name(), source);
            SearchError::Transport {
                provider: engine.name().to_string(),
                source,
            }
        })?;
        debug!("{} answered {} with {} bytes kept", engine.name(), status, buffer.len());

        let results = engine.response(EngineResponse {
            status,
            text: buffer.as_text(),
        });
        match results {
            Ok(ref found) => debug!("{} yielded {} results", engine.name(), found.len()),
            Err(ref e) => warn!("{}: {}", engine.name(), e),
        }
        results
    }

    /// Search for `query` and render the text report
    pub async fn search(&self, query: &str) -> Result<String, SearchError> {
        let query = SearchQuery::new(query)?;
        let results = self.results(&query).await?;
        Ok(render(&results, self.output_limit))
    }

    /// Run the tool on its JSON input `{"query": "..."}`.
    ///
    /// Failures come back as an `Error: ...` report with an error code.
    pub async fn execute(&self, input: &str) -> ToolOutput {
        let outcome = match SearchQuery::from_json(input) {
            Ok(query) => self
                .results(&query)
                .await
                .map(|results| render(&results, self.output_limit)),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(text) => {
                info!("Search complete, {} bytes result", text.len());
                ToolOutput { text, error: None }
            }
            Err(e) => ToolOutput {
                text: bounded(&e.report(), self.output_limit),
                error: Some(e.kind()),
            },
        }
    }
}
