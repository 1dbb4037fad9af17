/// Top-level configuration: an ordered list of tabs
///
/// `ConfigRecord` is the disk (and draft) shape with item references; `Config` is what
/// `ConfigRepository::load` returns, with every reference resolved.

use crate::model::{ItemRef, TreeItem};
use crate::storage::Platform;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, items: Vec<ItemRef>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items,
            extra: Map::new(),
        }
    }
}

/// Materialized configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub platform: Platform,
    pub tabs: Vec<Tab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub name: String,
    pub items: Vec<TreeItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// Fresh configuration with no tabs
    pub fn empty(version: impl Into<String>, platform: Platform) -> Self {
        Self {
            version: version.into(),
            platform,
            tabs: Vec::new(),
        }
    }
}

impl From<Config> for ConfigRecord {
    fn from(config: Config) -> Self {
        Self {
            version: config.version,
            platform: Some(config.platform),
            tabs: config
                .tabs
                .into_iter()
                .map(|tab| TabRecord {
                    id: tab.id,
                    name: tab.name,
                    items: tab.items.into_iter().map(ItemRef::from).collect(),
                    extra: tab.extra,
                })
                .collect(),
        }
    }
}
