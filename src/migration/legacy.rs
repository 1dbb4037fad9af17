/// Schema 1.0 -> 2.0
///
/// Version 1.0 kept everything for a platform in one blob: tabs holding inline workflow
/// and folder objects, plus `envVars` and `globalVars` arrays. Version 2.0 stores each
/// record under its own key with per-platform indexes, and the config lists only ids.
///
/// The blob is read from `workflows_<platform>`, or from `config_<platform>` when the
/// legacy key is gone. It only counts as 1.0 data when the first item of the first tab
/// is an inline object; otherwise the step does nothing. The legacy key is left in place.

use crate::migration::runner::{MigrationContext, MigrationStep};
use crate::storage::keys;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};

/// Layout written by this step
const WORKFLOW_KIND: &str = "workflow";
const FOLDER_KIND: &str = "folder";
const ENV_VAR_KIND: &str = "env_var";
const GLOBAL_VAR_KIND: &str = "global_var";
const TARGET_VERSION: &str = "2.0";

pub struct LegacyLayoutMigration;

#[async_trait]
impl MigrationStep for LegacyLayoutMigration {
    async fn apply(&self, ctx: &MigrationContext) -> Result<()> {
        let Some((source_key, blob)) = load_blob(ctx).await? else {
            tracing::info!("No legacy data for {}, nothing to convert", ctx.platform);
            return Ok(());
        };

        if !is_monolithic(&blob) {
            tracing::info!("'{}' is already in the per-record layout", source_key);
            return Ok(());
        }

        tracing::info!("📦 Converting legacy blob '{}' to per-record keys", source_key);
        let layout = Layout::explode(blob);

        for (key, record) in &layout.records {
            ctx.storage
                .set(key, record.clone())
                .await
                .with_context(|| format!("Failed to write '{}'", key))?;
        }

        for (kind, ids) in &layout.indexes {
            let key = keys::index_key(kind, ctx.platform);
            ctx.storage
                .set(&key, json!({ "ids": ids }))
                .await
                .with_context(|| format!("Failed to write index '{}'", key))?;
        }

        let config_key = keys::config_key(ctx.platform);
        let config = json!({
            "version": TARGET_VERSION,
            "platform": ctx.platform,
            "tabs": layout.tabs,
        });
        ctx.storage
            .set(&config_key, config)
            .await
            .with_context(|| format!("Failed to write '{}'", config_key))?;

        tracing::info!(
            "✅ Converted {} records and {} tabs",
            layout.records.len(),
            layout.tabs.len()
        );
        Ok(())
    }
}

async fn load_blob(ctx: &MigrationContext) -> Result<Option<(String, Value)>> {
    for key in [keys::legacy_key(ctx.platform), keys::config_key(ctx.platform)] {
        let blob = ctx
            .storage
            .get(&key)
            .await
            .with_context(|| format!("Failed to read '{}'", key))?;
        if let Some(blob) = blob {
            return Ok(Some((key, blob)));
        }
    }
    Ok(None)
}

/// First item of the first tab is an object rather than an id
fn is_monolithic(blob: &Value) -> bool {
    blob.pointer("/tabs/0/items/0")
        .map(Value::is_object)
        .unwrap_or(false)
}

/// Everything the 2.0 layout needs, built in memory before any write
#[derive(Default)]
struct Layout {
    records: Vec<(String, Value)>,
    indexes: Vec<(&'static str, Vec<String>)>,
    tabs: Vec<Value>,
}

impl Layout {
    fn explode(blob: Value) -> Self {
        let mut layout = Layout::default();
        let Value::Object(mut blob) = blob else {
            return layout;
        };

        for kind in [WORKFLOW_KIND, FOLDER_KIND, ENV_VAR_KIND, GLOBAL_VAR_KIND] {
            layout.indexes.push((kind, Vec::new()));
        }

        for (field, kind) in [("envVars", ENV_VAR_KIND), ("globalVars", GLOBAL_VAR_KIND)] {
            if let Some(Value::Array(vars)) = blob.remove(field) {
                for var in vars {
                    match var {
                        Value::Object(var) => {
                            layout.add_record(kind, var);
                        }
                        other => tracing::warn!("⚠️ Skipping malformed {} entry: {}", kind, other),
                    }
                }
            }
        }

        let tabs = match blob.remove("tabs") {
            Some(Value::Array(tabs)) => tabs,
            _ => Vec::new(),
        };
        for tab in tabs {
            let mut tab = match tab {
                Value::Object(tab) => tab,
                other => {
                    tracing::warn!("⚠️ Skipping malformed tab: {}", other);
                    continue;
                }
            };
            let items = match tab.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let ids: Vec<String> = items
                .into_iter()
                .filter_map(|item| layout.flatten_item(item))
                .collect();

            layout.tabs.push(json!({
                "id": ensure_id(&mut tab),
                "name": tab.get("name").cloned().unwrap_or_else(|| json!("")),
                "items": ids,
            }));
        }

        layout
    }

    /// Write out one tree item (recursively for folders) and return its id
    fn flatten_item(&mut self, item: Value) -> Option<String> {
        let mut object = match item {
            Value::String(id) => return Some(id),
            Value::Object(object) => object,
            other => {
                tracing::warn!("⚠️ Skipping malformed item: {}", other);
                return None;
            }
        };

        let is_folder = match object.get("type").and_then(Value::as_str) {
            Some(tag) => tag == FOLDER_KIND,
            None => object.get("items").map(Value::is_array).unwrap_or(false),
        };

        if is_folder {
            let children = match object.remove("items") {
                Some(Value::Array(children)) => children,
                _ => Vec::new(),
            };
            let child_ids: Vec<Value> = children
                .into_iter()
                .filter_map(|child| self.flatten_item(child))
                .map(Value::String)
                .collect();

            object.insert("type".into(), json!(FOLDER_KIND));
            object.insert("items".into(), Value::Array(child_ids));
            object.entry("name").or_insert_with(|| json!(""));
            Some(self.add_record(FOLDER_KIND, object))
        } else {
            object.insert("type".into(), json!(WORKFLOW_KIND));
            object.entry("name").or_insert_with(|| json!(""));
            if !object.contains_key("mode") {
                let mode = default_mode(&object);
                object.insert("mode".into(), json!(mode));
            }
            Some(self.add_record(WORKFLOW_KIND, object))
        }
    }

    fn add_record(&mut self, kind: &'static str, mut record: Map<String, Value>) -> String {
        let id = ensure_id(&mut record);
        let now = json!(Utc::now());
        record.entry("createdAt").or_insert_with(|| now.clone());
        record.insert("updatedAt".into(), now);

        self.records
            .push((keys::record_key(kind, &id), Value::Object(record)));
        if let Some((_, ids)) = self.indexes.iter_mut().find(|(k, _)| *k == kind) {
            if !ids.contains(&id) {
                ids.push(id.clone());
            }
        }
        id
    }
}

/// Mode for a legacy workflow that never recorded one
fn default_mode(workflow: &Map<String, Value>) -> &'static str {
    let has_entries = |field: &str| {
        workflow
            .get(field)
            .and_then(Value::as_array)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    };
    if has_entries("executors") || has_entries("actions") {
        "composed"
    } else {
        "command"
    }
}

/// Id of a legacy object, minting a UUID when it has none
fn ensure_id(object: &mut Map<String, Value>) -> String {
    match object.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            let id = uuid::Uuid::new_v4().to_string();
            object.insert("id".into(), Value::String(id.clone()));
            id
        }
    }
}
