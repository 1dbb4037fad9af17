/// Store context
///
/// Built once at process start and handed to every consumer. Owns the Storage Port,
/// the platform namespace, every repository, the version manager and the migration
/// runner. There is no global instance.

use crate::config::{Backend, StorageConfig};
use crate::error::StoreResult;
use crate::migration::{
    LegacyLayoutMigration, MigrationReport, MigrationRunner, VersionManager, CURRENT_SCHEMA_VERSION,
    LEGACY_VERSION,
};
use crate::model::{EnvVar, GlobalVar, Workflow};
use crate::repository::{ConfigRepository, EntityRepository, FolderRepository};
use crate::storage::{MemoryStorage, Platform, SqliteStorage, StoragePort};
use anyhow::Result;
use std::sync::Arc;

pub struct StoreContext {
    storage: Arc<dyn StoragePort>,
    platform: Platform,
    pub workflows: EntityRepository<Workflow>,
    pub folders: FolderRepository,
    pub env_vars: EntityRepository<EnvVar>,
    pub global_vars: EntityRepository<GlobalVar>,
    pub config: ConfigRepository,
    pub versions: VersionManager,
    migrations: MigrationRunner,
}

impl StoreContext {
    /// Wire repositories over a storage backend and register the built-in migrations
    pub fn new(storage: Arc<dyn StoragePort>, platform: Platform) -> StoreResult<Self> {
        let versions = VersionManager::new(Arc::clone(&storage), platform);
        let mut migrations = MigrationRunner::new(Arc::clone(&storage), platform, versions.clone());
        migrations.register(
            LEGACY_VERSION,
            CURRENT_SCHEMA_VERSION,
            "Split the legacy blob into per-record keys",
            LegacyLayoutMigration,
        )?;

        Ok(Self {
            workflows: EntityRepository::new(Arc::clone(&storage), platform),
            folders: FolderRepository::new(Arc::clone(&storage), platform),
            env_vars: EntityRepository::new(Arc::clone(&storage), platform),
            global_vars: EntityRepository::new(Arc::clone(&storage), platform),
            config: ConfigRepository::new(Arc::clone(&storage), platform),
            versions,
            migrations,
            storage,
            platform,
        })
    }

    /// Build the configured backend and wire a context over it
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        let storage: Arc<dyn StoragePort> = match config.backend {
            Backend::Memory => {
                tracing::info!("🧠 Using in-memory storage");
                Arc::new(MemoryStorage::new())
            }
            Backend::Sqlite => Arc::new(SqliteStorage::open(config.database_path()).await?),
        };

        let platform = config.platform();
        tracing::info!("🖥️ Platform namespace: {}", platform);
        Ok(Self::new(storage, platform)?)
    }

    /// Bring stored data up to the current schema
    ///
    /// Startup must not continue when this fails.
    pub async fn initialize(&self) -> StoreResult<MigrationReport> {
        self.migrations.run_migrations().await
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn storage(&self) -> &Arc<dyn StoragePort> {
        &self.storage
    }

    pub fn migrations(&self) -> &MigrationRunner {
        &self.migrations
    }
}
