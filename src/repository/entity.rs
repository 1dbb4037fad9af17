/// Generic entity repository
///
/// Each record lives under `<kind>/<id>`. A per-platform index `<kind>_index_<platform>`
/// holds `{"ids": [...]}` in insertion order and is the only way records are enumerated.
/// A dangling id in the index is tolerated and skipped on read, never repaired.

use crate::error::{StoreError, StoreResult};
use crate::model::Entity;
use crate::repository::Outcome;
use crate::storage::{keys, Platform, StoragePort};
use chrono::Utc;
use serde_json::{json, Value};
use std::marker::PhantomData;
use std::sync::Arc;

pub struct EntityRepository<T> {
    storage: Arc<dyn StoragePort>,
    platform: Platform,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            platform: self.platform,
            _kind: PhantomData,
        }
    }
}

impl<T: Entity> EntityRepository<T> {
    pub fn new(storage: Arc<dyn StoragePort>, platform: Platform) -> Self {
        Self {
            storage,
            platform,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> &'static str {
        T::KIND
    }

    fn index_key(&self) -> String {
        keys::index_key(T::KIND, self.platform)
    }

    /// Load one record, `NotFound` when the key is absent
    pub async fn find_by_id(&self, id: &str) -> StoreResult<T> {
        let key = keys::record_key(T::KIND, id);
        let value = self
            .storage
            .get(&key)
            .await
            .map_err(|e| StoreError::storage("get", &key, e))?
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;

        serde_json::from_value(value).map_err(|e| StoreError::storage("decode", key, e))
    }

    /// Load every indexed record, skipping members that fail to load
    pub async fn find_all(&self) -> StoreResult<Outcome<Vec<T>>> {
        let ids = self.ids().await?;
        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = 0;

        for id in &ids {
            match self.find_by_id(id).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping {} '{}' while listing: {}", T::KIND, id, e);
                    skipped += 1;
                }
            }
        }

        Ok(Outcome {
            value: records,
            skipped,
        })
    }

    /// Write a record and make sure its id is indexed
    ///
    /// Refreshes `updatedAt`. Re-saving an indexed id leaves the index untouched.
    pub async fn save(&self, mut entity: T) -> StoreResult<T> {
        if entity.id().trim().is_empty() {
            return Err(StoreError::Validation(format!(
                "{} requires a non-empty id",
                T::KIND
            )));
        }

        entity.stamp(Utc::now());
        let key = keys::record_key(T::KIND, entity.id());
        let value = serde_json::to_value(&entity).map_err(|e| StoreError::storage("encode", &key, e))?;

        self.storage
            .set(&key, value)
            .await
            .map_err(|e| StoreError::storage("set", &key, e))?;

        let mut ids = self.ids().await?;
        if !ids.iter().any(|existing| existing == entity.id()) {
            ids.push(entity.id().to_string());
            self.write_index(ids).await?;
        }

        tracing::debug!("💾 Saved {} '{}'", T::KIND, entity.id());
        Ok(entity)
    }

    /// Remove a record and its index entry
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let key = keys::record_key(T::KIND, id);
        let present = self
            .storage
            .has(&key)
            .await
            .map_err(|e| StoreError::storage("has", &key, e))?;
        if !present {
            return Err(StoreError::not_found(T::KIND, id));
        }

        self.storage
            .remove(&key)
            .await
            .map_err(|e| StoreError::storage("remove", &key, e))?;

        let mut ids = self.ids().await?;
        if let Some(position) = ids.iter().position(|existing| existing == id) {
            ids.remove(position);
            self.write_index(ids).await?;
        }

        tracing::debug!("🗑️ Deleted {} '{}'", T::KIND, id);
        Ok(())
    }

    /// Presence check; backend failures read as "absent"
    pub async fn exists(&self, id: &str) -> bool {
        let key = keys::record_key(T::KIND, id);
        match self.storage.has(&key).await {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!("⚠️ Presence check failed for '{}': {}", key, e);
                false
            }
        }
    }

    /// Number of indexed ids
    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.ids().await?.len())
    }

    /// Raw index contents, in insertion order
    ///
    /// A missing index, or one whose `ids` is not an array, reads as empty.
    /// Non-string entries are ignored.
    pub async fn ids(&self) -> StoreResult<Vec<String>> {
        let key = self.index_key();
        let index = self
            .storage
            .get(&key)
            .await
            .map_err(|e| StoreError::storage("get", &key, e))?;

        let Some(index) = index else {
            return Ok(Vec::new());
        };

        match index.get("ids").and_then(Value::as_array) {
            Some(ids) => Ok(ids
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()),
            None => {
                tracing::warn!("⚠️ Index '{}' is malformed, treating it as empty", key);
                Ok(Vec::new())
            }
        }
    }

    async fn write_index(&self, ids: Vec<String>) -> StoreResult<()> {
        let key = self.index_key();
        self.storage
            .set(&key, json!({ "ids": ids }))
            .await
            .map_err(|e| StoreError::storage("set", &key, e))
    }
}
