//! Shared fixtures for the integration suites

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use flowstash::{MemoryStorage, Platform, StoreContext, StoragePort};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Memory backend that fails every call touching a poisoned key prefix
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    poisoned: Mutex<Vec<String>>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poison(&self, prefix: &str) {
        self.poisoned.lock().unwrap().push(prefix.to_string());
    }

    fn check(&self, key: &str) -> Result<()> {
        let poisoned = self.poisoned.lock().unwrap();
        match poisoned.iter().find(|prefix| key.starts_with(prefix.as_str())) {
            Some(prefix) => Err(anyhow!("backend unavailable for '{}' ({})", key, prefix)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StoragePort for FlakyStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.check(key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check(key)?;
        self.inner.remove(key).await
    }

    async fn has(&self, key: &str) -> Result<bool> {
        self.check(key)?;
        self.inner.has(key).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.check(prefix)?;
        self.inner.keys(prefix).await
    }

    async fn clear(&self, prefix: &str) -> Result<()> {
        self.check(prefix)?;
        self.inner.clear(prefix).await
    }
}

/// Counts writes going through to a memory backend
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    writes: Mutex<Vec<String>>,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn reset(&self) {
        self.writes.lock().unwrap().clear();
    }
}

#[async_trait]
impl StoragePort for CountingStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.writes.lock().unwrap().push(format!("set {}", key));
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.writes.lock().unwrap().push(format!("remove {}", key));
        self.inner.remove(key).await
    }

    async fn has(&self, key: &str) -> Result<bool> {
        self.inner.has(key).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.keys(prefix).await
    }

    async fn clear(&self, prefix: &str) -> Result<()> {
        self.writes.lock().unwrap().push(format!("clear {}", prefix));
        self.inner.clear(prefix).await
    }
}

/// Context over a fresh memory backend, namespaced to linux
pub fn memory_context() -> (Arc<MemoryStorage>, StoreContext) {
    let storage = Arc::new(MemoryStorage::new());
    let context = StoreContext::new(storage.clone(), Platform::Linux).unwrap();
    (storage, context)
}
