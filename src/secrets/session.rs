//! Session overlay over a persistent store

use super::{MemorySecretStore, SecretStore};
use anyhow::Result;

/// Reads through to a persistent store, writes to memory only.
///
/// A value set during the session shadows the persisted one and is gone
/// when the process exits.
pub struct SessionSecretStore {
    persisted: Box<dyn SecretStore>,
    session: MemorySecretStore,
}

impl SessionSecretStore {
    pub fn new(persisted: Box<dyn SecretStore>) -> Self {
        Self {
            persisted,
            session: MemorySecretStore::new(),
        }
    }
}

impl SecretStore for SessionSecretStore {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.session
            .get(namespace, key)
            .or_else(|| self.persisted.get(namespace, key))
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        self.session.set(namespace, key, value)
    }
}
