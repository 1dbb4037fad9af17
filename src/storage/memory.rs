/// In-memory storage backend
///
/// Keeps every key in an ordered map behind a tokio RwLock, so `keys()` comes back sorted.
/// Nothing survives the process.

use crate::storage::StoragePort;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StoragePort for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn clear(&self, prefix: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
