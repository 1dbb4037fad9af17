/// Migration runner
///
/// Holds the registered `(from, to, step)` triples and applies the ones that lie between
/// the stored version and the target, in ascending `from` order, one after another.
/// The first failing step aborts the run; steps already applied stay applied.

use crate::error::{StoreError, StoreResult};
use crate::migration::version::same_version;
use crate::migration::{SchemaVersion, VersionManager};
use crate::storage::{Platform, StoragePort};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// What a migration step gets to work with: the raw Storage Port and the namespace
#[derive(Clone)]
pub struct MigrationContext {
    pub storage: Arc<dyn StoragePort>,
    pub platform: Platform,
}

/// One data transformation between two schema versions
#[async_trait]
pub trait MigrationStep: Send + Sync {
    async fn apply(&self, ctx: &MigrationContext) -> anyhow::Result<()>;
}

pub struct Migration {
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    pub description: String,
    step: Box<dyn MigrationStep>,
}

/// Summary of a `run_migrations` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Version found in storage before the run
    pub from: String,
    /// Version stored after the run
    pub to: String,
    /// Number of steps executed
    pub applied: usize,
}

pub struct MigrationRunner {
    context: MigrationContext,
    versions: VersionManager,
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    pub fn new(storage: Arc<dyn StoragePort>, platform: Platform, versions: VersionManager) -> Self {
        Self {
            context: MigrationContext { storage, platform },
            versions,
            migrations: Vec::new(),
        }
    }

    /// Add a step to the registry
    ///
    /// Rejects steps that do not move forward and steps whose range overlaps one already
    /// registered. Gaps between steps are accepted.
    pub fn register(
        &mut self,
        from: &str,
        to: &str,
        description: impl Into<String>,
        step: impl MigrationStep + 'static,
    ) -> StoreResult<()> {
        let from: SchemaVersion = from.parse()?;
        let to: SchemaVersion = to.parse()?;

        if from >= to {
            return Err(StoreError::Validation(format!(
                "migration must move forward, got {} -> {}",
                from, to
            )));
        }
        if let Some(existing) = self
            .migrations
            .iter()
            .find(|m| from < m.to && m.from < to)
        {
            return Err(StoreError::Validation(format!(
                "migration {} -> {} overlaps registered {} -> {}",
                from, to, existing.from, existing.to
            )));
        }

        self.migrations.push(Migration {
            from,
            to,
            description: description.into(),
            step: Box::new(step),
        });
        Ok(())
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn versions(&self) -> &VersionManager {
        &self.versions
    }

    /// Steps lying within `[current, target]`, ordered by `from`
    fn select(&self, current: &str, target: &str) -> Vec<&Migration> {
        let (Ok(current), Ok(target)) = (
            current.parse::<SchemaVersion>(),
            target.parse::<SchemaVersion>(),
        ) else {
            tracing::warn!("⚠️ Unrecognized schema version '{}' or '{}'", current, target);
            return Vec::new();
        };

        let mut selected: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| m.from >= current && m.to <= target)
            .collect();
        selected.sort_by_key(|m| m.from);

        let mut cursor = current;
        for m in &selected {
            if m.from != cursor {
                tracing::warn!("⚠️ Migration chain has a gap between {} and {}", cursor, m.from);
            }
            cursor = m.to;
        }
        if !selected.is_empty() && cursor != target {
            tracing::warn!("⚠️ Migration chain stops at {}, target is {}", cursor, target);
        }

        selected
    }

    /// Bring stored data up to the target version
    ///
    /// No-op when already at target. When nothing applicable is registered, the stored
    /// version is still advanced.
    pub async fn run_migrations(&self) -> StoreResult<MigrationReport> {
        let current = self.versions.get_current_version().await;
        let target = self.versions.target_version().to_string();

        if same_version(&current, &target) {
            tracing::debug!("Schema already at {}, nothing to migrate", target);
            return Ok(MigrationReport {
                from: current,
                to: target,
                applied: 0,
            });
        }

        let selected = self.select(&current, &target);
        if selected.is_empty() {
            tracing::warn!(
                "⚠️ No migration registered from {} to {}, advancing the stored version anyway",
                current,
                target
            );
            self.versions.set_version(&target).await?;
            return Ok(MigrationReport {
                from: current,
                to: target,
                applied: 0,
            });
        }

        tracing::info!("🔄 Migrating schema {} -> {} ({} steps)", current, target, selected.len());
        let mut applied = 0;
        for migration in selected {
            tracing::info!(
                "  ● {} -> {}: {}",
                migration.from,
                migration.to,
                migration.description
            );
            migration
                .step
                .apply(&self.context)
                .await
                .map_err(|source| StoreError::Migration {
                    from: migration.from.to_string(),
                    to: migration.to.to_string(),
                    source,
                })?;
            applied += 1;
        }

        self.versions.set_version(&target).await?;
        tracing::info!("✅ Schema migrated to {} ({} steps applied)", target, applied);

        Ok(MigrationReport {
            from: current,
            to: target,
            applied,
        })
    }
}
