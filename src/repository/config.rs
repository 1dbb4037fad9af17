/// Config repository
///
/// One config record per platform at `config_<platform>`. On disk each tab lists item
/// ids; in memory each tab lists resolved folders and workflows. Saving flattens the
/// tree back to ids, writing any inline items to their own repositories first.

use crate::error::{StoreError, StoreResult};
use crate::migration::CURRENT_SCHEMA_VERSION;
use crate::model::{Config, ConfigRecord, ItemRef, Tab, TabRecord, Workflow};
use crate::repository::folder::validate_inline;
use crate::repository::{EntityRepository, FolderRepository, Outcome};
use crate::storage::{keys, Platform, StoragePort};
use serde_json::Map;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct ConfigRepository {
    storage: Arc<dyn StoragePort>,
    platform: Platform,
    folders: FolderRepository,
    workflows: EntityRepository<Workflow>,
}

impl ConfigRepository {
    pub fn new(storage: Arc<dyn StoragePort>, platform: Platform) -> Self {
        Self {
            folders: FolderRepository::new(Arc::clone(&storage), platform),
            workflows: EntityRepository::new(Arc::clone(&storage), platform),
            storage,
            platform,
        }
    }

    fn key(&self) -> String {
        keys::config_key(self.platform)
    }

    /// Load and materialize the platform's config
    ///
    /// Absent config yields an empty one at the current schema version. Items that
    /// resolve to neither a folder nor a workflow are dropped and counted.
    pub async fn load(&self) -> StoreResult<Outcome<Config>> {
        let key = self.key();
        let raw = self
            .storage
            .get(&key)
            .await
            .map_err(|e| StoreError::storage("get", &key, e))?;

        let Some(raw) = raw else {
            tracing::debug!("No config stored for {}, using defaults", self.platform);
            return Ok(Outcome::complete(Config::empty(
                CURRENT_SCHEMA_VERSION,
                self.platform,
            )));
        };

        let record: ConfigRecord =
            serde_json::from_value(raw).map_err(|e| StoreError::storage("decode", &key, e))?;

        let mut skipped = 0;
        let mut tabs = Vec::with_capacity(record.tabs.len());
        for tab in record.tabs {
            let mut items = Vec::with_capacity(tab.items.len());
            for item in &tab.items {
                let Some(id) = item.reference() else {
                    tracing::warn!("⚠️ Tab '{}' has an unusable item, skipping: {:?}", tab.id, item);
                    skipped += 1;
                    continue;
                };

                let mut ancestors = HashSet::new();
                match self.folders.resolve(id, &mut ancestors, &mut skipped).await {
                    Some(resolved) => items.push(resolved),
                    None => {
                        tracing::warn!("⚠️ Tab '{}' references unknown item '{}'", tab.id, id);
                        skipped += 1;
                    }
                }
            }

            tabs.push(Tab {
                id: tab.id,
                name: tab.name,
                items,
                extra: tab.extra,
            });
        }

        let version = if record.version.is_empty() {
            CURRENT_SCHEMA_VERSION.to_string()
        } else {
            record.version
        };

        Ok(Outcome {
            value: Config {
                version,
                platform: self.platform,
                tabs,
            },
            skipped,
        })
    }

    /// Persist a config, flattening tab items to ids
    ///
    /// Inline folders and workflows are saved through their repositories before their
    /// id is recorded. The stored platform is always this repository's platform. Tabs are
    /// stored as `{id, name, items}` only; other tab fields are not persisted. A tagged
    /// inline item that does not decode fails the save before anything is written.
    pub async fn save(&self, config: ConfigRecord) -> StoreResult<ConfigRecord> {
        if let Some(tab) = config.tabs.iter().find(|tab| tab.id.trim().is_empty()) {
            return Err(StoreError::Validation(format!(
                "tab '{}' requires a non-empty id",
                tab.name
            )));
        }
        for tab in &config.tabs {
            validate_inline(&tab.id, &tab.items)?;
        }

        let mut tabs = Vec::with_capacity(config.tabs.len());
        for tab in config.tabs {
            let mut ids = Vec::with_capacity(tab.items.len());
            for item in tab.items {
                match item {
                    ItemRef::Id(id) => ids.push(ItemRef::Id(id)),
                    ItemRef::Folder(folder) => {
                        let saved = self.folders.save_with_children(*folder).await?;
                        ids.push(ItemRef::Id(saved.id));
                    }
                    ItemRef::Workflow(workflow) => {
                        let saved = self.workflows.save(*workflow).await?;
                        ids.push(ItemRef::Id(saved.id));
                    }
                    unrecognized @ ItemRef::Unrecognized(_) => match unrecognized.reference() {
                        Some(id) => ids.push(ItemRef::id(id)),
                        None => tracing::warn!(
                            "⚠️ Dropping unrecognized item from tab '{}': {:?}",
                            tab.id,
                            unrecognized
                        ),
                    },
                }
            }

            tabs.push(TabRecord {
                id: tab.id,
                name: tab.name,
                items: ids,
                extra: Map::new(),
            });
        }

        let record = ConfigRecord {
            version: if config.version.is_empty() {
                CURRENT_SCHEMA_VERSION.to_string()
            } else {
                config.version
            },
            platform: Some(self.platform),
            tabs,
        };

        let key = self.key();
        let value = serde_json::to_value(&record).map_err(|e| StoreError::storage("encode", &key, e))?;
        self.storage
            .set(&key, value)
            .await
            .map_err(|e| StoreError::storage("set", &key, e))?;

        tracing::info!("💾 Saved config for {} ({} tabs)", self.platform, record.tabs.len());
        Ok(record)
    }

    /// Remove the platform's config record. Referenced folders and workflows stay.
    pub async fn delete(&self) -> StoreResult<()> {
        let key = self.key();
        self.storage
            .remove(&key)
            .await
            .map_err(|e| StoreError::storage("remove", &key, e))
    }
}
