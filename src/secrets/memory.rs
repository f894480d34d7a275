//! In-process secret store

use super::SecretStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Secret store that forgets everything on exit
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    values: Mutex<HashMap<(String, String), String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value
    pub fn with_value(namespace: &str, key: &str, value: &str) -> Self {
        let store = Self::new();
        store.insert(namespace, key, value);
        store
    }

    fn insert(&self, namespace: &str, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert((namespace.to_string(), key.to_string()), value.to_string());
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        self.insert(namespace, key, value);
        Ok(())
    }
}
