/// Storage Port layer
///
/// The store never talks to a database directly. Everything goes through the
/// `StoragePort` capability below, which exposes single-key operations over JSON values.
/// No ordering or atomicity is promised beyond one key at a time.

// Key naming and platform namespacing
pub mod keys;

// In-process backend (tests, ephemeral deployments)
pub mod memory;

// SQLite backend using a single key/value table
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use keys::Platform;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Capability contract every key-value backend implements
///
/// Backends report failures in their own vocabulary (`anyhow::Error`); the repositories
/// wrap them into `StoreError::Storage` together with the key involved.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Read a value, `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write (insert or overwrite) a value
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;

    async fn has(&self, key: &str) -> Result<bool>;

    /// List keys starting with `prefix`. Backends that cannot enumerate return an empty list.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remove every key starting with `prefix`. May be a no-op.
    async fn clear(&self, prefix: &str) -> Result<()>;
}
