//! Secret storage
//!
//! The provider key outlives the process. Stores are addressed by
//! `(namespace, key)` pairs.

mod file;
mod memory;
mod session;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;
pub use session::SessionSecretStore;

use anyhow::Result;

/// Namespace holding search settings
pub const SEARCH_NAMESPACE: &str = "search";
/// Key under [`SEARCH_NAMESPACE`] holding the provider key
pub const API_KEY: &str = "api_key";

/// Persistent key-value store for secrets
pub trait SecretStore: Send + Sync {
    /// Read a value, `None` if absent or unreadable
    fn get(&self, namespace: &str, key: &str) -> Option<String>;

    /// Persist a value, replacing any previous one
    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()>;
}
