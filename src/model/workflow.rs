/// Workflow record definition
///
/// A workflow is either a plain list of shell commands (`command` mode) or a composition
/// of executors and actions (`composed` mode). Fields the store does not interpret are
/// kept as raw JSON so nothing is lost across a load/save cycle.

use crate::model::{stamp_times, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker for the `"type": "workflow"` tag carried by every workflow object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowType {
    #[default]
    #[serde(rename = "workflow")]
    Workflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowMode {
    /// Executors wired to actions
    Composed,
    /// Sequential shell commands
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Unique workflow identifier
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: WorkflowType,
    pub name: String,
    pub mode: WorkflowMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Commands to run, used when `mode == command`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cmds: Vec<Value>,
    /// Executor definitions, used when `mode == composed`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executors: Vec<Value>,
    /// Action definitions, used when `mode == composed`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields this version of the store does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    /// New command-mode workflow
    pub fn command(id: impl Into<String>, name: impl Into<String>, cmds: Vec<String>) -> Self {
        Self {
            id: id.into(),
            kind: WorkflowType::Workflow,
            name: name.into(),
            mode: WorkflowMode::Command,
            icon: None,
            cmds: cmds.into_iter().map(Value::String).collect(),
            executors: Vec::new(),
            actions: Vec::new(),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// New composed-mode workflow
    pub fn composed(
        id: impl Into<String>,
        name: impl Into<String>,
        executors: Vec<Value>,
        actions: Vec<Value>,
    ) -> Self {
        Self {
            mode: WorkflowMode::Composed,
            cmds: Vec::new(),
            executors,
            actions,
            ..Self::command(id, name, Vec::new())
        }
    }
}

impl Entity for Workflow {
    const KIND: &'static str = "workflow";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        stamp_times(&mut self.created_at, &mut self.updated_at, now);
    }
}
