//! Configuration module
//!
//! Settings come from a YAML file and `WEBDIGEST_*` environment variables.
//! They are loaded once and passed into the orchestrator explicitly.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "WEBDIGEST_SETTINGS_PATH";

/// Load settings from the first file found, or defaults, then apply env overrides
pub fn load() -> Result<Settings> {
    let mut candidates = Vec::new();
    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(PathBuf::from("webdigest.yml"));
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("webdigest/settings.yml"));
    }

    let mut settings = match candidates.iter().find(|path| path.exists()) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    Ok(settings)
}
