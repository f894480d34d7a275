//! YAML-file secret store

use super::SecretStore;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

/// Secret store persisted as `namespace -> key -> value` YAML
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Namespaces> {
        if !self.path.exists() {
            return Ok(Namespaces::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Namespaces::new());
        }
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", self.path.display()))
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut all) => all.get_mut(namespace)?.remove(key),
            Err(e) => {
                warn!("Secret store unreadable: {:#}", e);
                None
            }
        }
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let mut all = self.read_all()?;
        all.entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(&all)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
