/// Folder records and tree items
///
/// `FolderRecord` is what sits on disk (items are id references, possibly with inline
/// objects waiting to be saved). `Folder` is the materialized tree handed to callers.
/// Item shapes are decided once, when JSON is decoded into `ItemRef` or `TreeItem`.

use crate::model::{stamp_times, Entity, Workflow};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Marker for the `"type": "folder"` tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderType {
    #[default]
    #[serde(rename = "folder")]
    Folder,
}

/// Persisted folder: children are referenced by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: FolderType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FolderRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, items: Vec<ItemRef>) -> Self {
        Self {
            id: id.into(),
            kind: FolderType::Folder,
            name: name.into(),
            icon: None,
            items,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }
}

impl Entity for FolderRecord {
    const KIND: &'static str = "folder";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        stamp_times(&mut self.created_at, &mut self.updated_at, now);
    }
}

/// Materialized folder: children are resolved objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: FolderType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub items: Vec<TreeItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    /// Attach resolved children to a persisted record
    pub(crate) fn from_record(record: FolderRecord, items: Vec<TreeItem>) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            name: record.name,
            icon: record.icon,
            items,
            created_at: record.created_at,
            updated_at: record.updated_at,
            extra: record.extra,
        }
    }
}

impl From<Folder> for FolderRecord {
    /// Turn a loaded tree back into a saveable draft (children become inline items)
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            kind: folder.kind,
            name: folder.name,
            icon: folder.icon,
            items: folder.items.into_iter().map(ItemRef::from).collect(),
            created_at: folder.created_at,
            updated_at: folder.updated_at,
            extra: folder.extra,
        }
    }
}

/// An entry of a persisted or draft item list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemRef {
    /// Bare id of a folder or workflow
    Id(String),
    /// Inline folder that still has to be saved
    Folder(Box<FolderRecord>),
    /// Inline workflow that still has to be saved
    Workflow(Box<Workflow>),
    /// Anything else; kept so it can be reported and skipped
    Unrecognized(Value),
}

impl ItemRef {
    pub fn id(id: impl Into<String>) -> Self {
        ItemRef::Id(id.into())
    }

    /// Classify a raw JSON item. Never fails: unknown shapes become `Unrecognized`.
    pub fn from_value(value: Value) -> Self {
        let tag = value.get("type").and_then(Value::as_str).map(str::to_owned);
        match (value, tag.as_deref()) {
            (Value::String(id), _) => ItemRef::Id(id),
            (value @ Value::Object(_), Some("folder")) => {
                match serde_json::from_value::<FolderRecord>(value.clone()) {
                    Ok(folder) => ItemRef::Folder(Box::new(folder)),
                    Err(_) => ItemRef::Unrecognized(value),
                }
            }
            (value @ Value::Object(_), Some("workflow")) => {
                match serde_json::from_value::<Workflow>(value.clone()) {
                    Ok(workflow) => ItemRef::Workflow(Box::new(workflow)),
                    Err(_) => ItemRef::Unrecognized(value),
                }
            }
            (value, _) => ItemRef::Unrecognized(value),
        }
    }

    /// The id this entry points at, if it has one
    ///
    /// Untyped objects still count as references when they carry a string `id`;
    /// numbers, nulls, arrays and id-less objects do not.
    pub fn reference(&self) -> Option<&str> {
        let id = match self {
            ItemRef::Id(id) => id.as_str(),
            ItemRef::Folder(folder) => folder.id.as_str(),
            ItemRef::Workflow(workflow) => workflow.id.as_str(),
            ItemRef::Unrecognized(Value::Object(map)) => map.get("id")?.as_str()?,
            ItemRef::Unrecognized(_) => return None,
        };
        (!id.is_empty()).then_some(id)
    }

    /// Decode error of an object tagged `folder` or `workflow` that did not parse
    ///
    /// `None` for every other entry, including well-formed inline items.
    pub fn malformed_inline(&self) -> Option<String> {
        let ItemRef::Unrecognized(value @ Value::Object(_)) = self else {
            return None;
        };
        let error = match value.get("type").and_then(Value::as_str)? {
            "folder" => serde_json::from_value::<FolderRecord>(value.clone()).err()?,
            "workflow" => serde_json::from_value::<Workflow>(value.clone()).err()?,
            _ => return None,
        };
        Some(error.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ItemRef::from_value)
    }
}

impl From<TreeItem> for ItemRef {
    fn from(item: TreeItem) -> Self {
        match item {
            TreeItem::Folder(folder) => ItemRef::Folder(Box::new(folder.into())),
            TreeItem::Workflow(workflow) => ItemRef::Workflow(Box::new(workflow)),
        }
    }
}

/// A resolved child inside a materialized folder or tab
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TreeItem {
    Folder(Folder),
    Workflow(Workflow),
}

impl TreeItem {
    pub fn id(&self) -> &str {
        match self {
            TreeItem::Folder(folder) => &folder.id,
            TreeItem::Workflow(workflow) => &workflow.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TreeItem::Folder(_) => FolderRecord::KIND,
            TreeItem::Workflow(_) => Workflow::KIND,
        }
    }
}

impl<'de> Deserialize<'de> for TreeItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let tag = value.get("type").and_then(Value::as_str).map(str::to_owned);
        match tag.as_deref() {
            Some("folder") => serde_json::from_value(value)
                .map(TreeItem::Folder)
                .map_err(de::Error::custom),
            Some("workflow") => serde_json::from_value(value)
                .map(TreeItem::Workflow)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "tree item must be tagged folder or workflow, got {:?}",
                other
            ))),
        }
    }
}
