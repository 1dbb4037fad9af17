/// Environment and global variable records

use crate::model::{stamp_times, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Variable exported into the environment of workflow commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Placeholder value substituted into workflow definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVar {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvVar {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: value.into(),
            description: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }
}

impl GlobalVar {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: value.into(),
            description: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }
}

impl Entity for EnvVar {
    const KIND: &'static str = "env_var";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        stamp_times(&mut self.created_at, &mut self.updated_at, now);
    }
}

impl Entity for GlobalVar {
    const KIND: &'static str = "global_var";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        stamp_times(&mut self.created_at, &mut self.updated_at, now);
    }
}
