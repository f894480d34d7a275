//! Per-call backend choice

use super::brave::Brave;
use super::duckduckgo::DuckDuckGo;
use super::traits::Engine;
use crate::config::EngineSettings;

/// How the keyed provider is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    Proxy,
}

/// Provider and transport for one search
pub enum Backend {
    /// Keyed JSON API, direct or through the proxy
    Keyed { engine: Brave, route: Route },
    /// Anonymous HTML fallback, always direct
    Anonymous(DuckDuckGo),
}

impl Backend {
    /// Pick a backend from the current key and proxy state.
    ///
    /// An empty key counts as no key.
    pub fn select(api_key: Option<&str>, proxy_enabled: bool, endpoints: &EngineSettings) -> Self {
        match api_key.filter(|key| !key.is_empty()) {
            Some(key) => Backend::Keyed {
                engine: Brave::with_base_url(&endpoints.brave_url, key),
                route: if proxy_enabled {
                    Route::Proxy
                } else {
                    Route::Direct
                },
            },
            None => Backend::Anonymous(DuckDuckGo::with_url(&endpoints.duckduckgo_url)),
        }
    }

    pub fn engine(&self) -> &dyn Engine {
        match self {
            Backend::Keyed { engine, .. } => engine,
            Backend::Anonymous(engine) => engine,
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Backend::Keyed { route, .. } => *route,
            Backend::Anonymous(_) => Route::Direct,
        }
    }
}
