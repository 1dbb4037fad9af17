/// Record types stored by the repositories
///
/// Every record is a JSON object with a string `id` unique within its kind. Folders and
/// config tabs exist in two shapes: a persisted shape whose items are id references, and a
/// materialized shape whose items are resolved child objects. They are separate types.

pub mod config;
pub mod folder;
pub mod variables;
pub mod workflow;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

pub use config::{Config, ConfigRecord, Tab, TabRecord};
pub use folder::{Folder, FolderRecord, ItemRef, TreeItem};
pub use variables::{EnvVar, GlobalVar};
pub use workflow::{Workflow, WorkflowMode};

/// A record kind that an `EntityRepository` can persist
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind name, used in record keys (`<KIND>/<id>`) and index keys
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Refresh `updatedAt`, and fill `createdAt` the first time a record is saved
    fn stamp(&mut self, now: DateTime<Utc>);
}

/// Shared timestamp bookkeeping for `Entity::stamp`
pub(crate) fn stamp_times(
    created_at: &mut Option<DateTime<Utc>>,
    updated_at: &mut Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) {
    if created_at.is_none() {
        *created_at = Some(now);
    }
    *updated_at = Some(now);
}
