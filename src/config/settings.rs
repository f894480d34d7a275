//! Settings structures

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Provider key baked in at build time, if any
pub fn compiled_api_key() -> Option<&'static str> {
    option_env!("WEBDIGEST_SEARCH_KEY").filter(|key| !key.is_empty())
}

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub engines: EngineSettings,
    pub outgoing: OutgoingSettings,
    pub secrets: SecretsSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    }

    /// Merge with environment variables (WEBDIGEST_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("WEBDIGEST_API_KEY") {
            self.search.api_key = Some(val).filter(|key| !key.is_empty());
        }
        if let Some(val) = lookup("WEBDIGEST_MEMORY_CLASS") {
            match val.to_ascii_lowercase().as_str() {
                "constrained" => self.search.memory_class = MemoryClass::Constrained,
                "extended" => self.search.memory_class = MemoryClass::Extended,
                _ => {}
            }
        }
        if let Some(val) = lookup("WEBDIGEST_OUTPUT_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.search.output_limit = limit;
            }
        }
        if let Some(val) = lookup("WEBDIGEST_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.outgoing.request_timeout = secs;
            }
        }
        if let Some(val) = lookup("WEBDIGEST_PROXY") {
            if let Some((host, port)) = parse_host_port(&val) {
                self.outgoing.proxy = ProxySettings {
                    enabled: true,
                    host: Some(host),
                    port,
                };
            }
        }
    }
}

fn parse_host_port(value: &str) -> Option<(String, u16)> {
    let url = url::Url::parse(&format!("http://{}", value.trim())).ok()?;
    let host = url.host_str()?.to_string();
    Some((host, url.port()?))
}

/// Size class of the response buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryClass {
    /// Small devices: 8 KiB
    Constrained,
    /// 16 KiB
    #[default]
    Extended,
}

impl MemoryClass {
    pub fn buffer_size(&self) -> usize {
        match self {
            Self::Constrained => 8 * 1024,
            Self::Extended => 16 * 1024,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default provider key; a persisted key takes precedence
    pub api_key: Option<String>,
    /// Response buffer size class
    pub memory_class: MemoryClass,
    /// Maximum report size in bytes
    pub output_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: compiled_api_key().map(str::to_string),
            memory_class: MemoryClass::default(),
            output_limit: 4096,
        }
    }
}

/// Provider endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub brave_url: String,
    pub duckduckgo_url: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            brave_url: crate::engines::brave::BRAVE_API_URL.to_string(),
            duckduckgo_url: crate::engines::duckduckgo::DUCKDUCKGO_HTML_URL.to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Timeout in seconds for connecting and for each read; on the direct
    /// route it also bounds the whole request
    pub request_timeout: f64,
    /// User agent string (none = built-in)
    pub user_agent: Option<String>,
    /// Proxy settings
    pub proxy: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            user_agent: None,
            proxy: ProxySettings::default(),
        }
    }
}

impl OutgoingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout.max(0.001))
    }
}

/// HTTP CONNECT proxy used for the keyed provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: u16,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
            port: 8080,
        }
    }
}

impl ProxySettings {
    /// Enabled and pointing somewhere
    pub fn is_active(&self) -> bool {
        self.enabled && self.host.as_deref().map_or(false, |h| !h.is_empty())
    }
}

/// Secret store location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsSettings {
    pub path: Option<PathBuf>,
}

impl SecretsSettings {
    /// Configured path, else `<config_dir>/webdigest/secrets.yml`
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("webdigest/secrets.yml")
        })
    }
}
