/// Schema version tracking
///
/// State of the store, as seen through the `version` key:
/// - Unversioned: no record and no legacy key -> initialized to the current version
/// - Legacy: no record but `workflows_<platform>` exists -> "1.0"
/// - Current: explicit record present -> its value

use crate::error::{StoreError, StoreResult};
use crate::migration::{CURRENT_SCHEMA_VERSION, LEGACY_VERSION};
use crate::storage::{keys, Platform, StoragePort};
use chrono::Utc;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// `major.minor.patch`, missing components read as 0, compared numerically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SchemaVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }
}

impl FromStr for SchemaVersion {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || StoreError::Validation(format!("invalid schema version '{}'", s));
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = [0u64; 3];
        for (position, component) in trimmed.split('.').enumerate() {
            if position >= parts.len() {
                return Err(invalid());
            }
            parts[position] = component.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Whether two version strings name the same schema
///
/// Parsed numerically when both parse (`"2.0"` matches `"2.0.0"`); otherwise compared as text.
pub fn same_version(a: &str, b: &str) -> bool {
    match (a.parse::<SchemaVersion>(), b.parse::<SchemaVersion>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[derive(Clone)]
pub struct VersionManager {
    storage: Arc<dyn StoragePort>,
    platform: Platform,
    target: String,
}

impl VersionManager {
    /// Manager targeting the compiled-in schema version
    pub fn new(storage: Arc<dyn StoragePort>, platform: Platform) -> Self {
        Self::with_target(storage, platform, CURRENT_SCHEMA_VERSION)
    }

    pub fn with_target(storage: Arc<dyn StoragePort>, platform: Platform, target: impl Into<String>) -> Self {
        Self {
            storage,
            platform,
            target: target.into(),
        }
    }

    pub fn target_version(&self) -> &str {
        &self.target
    }

    /// Version of the data currently in storage
    ///
    /// Never fails: a backend error is logged and the target version returned.
    /// A fresh store is stamped with the target.
    pub async fn get_current_version(&self) -> String {
        match self.detect().await {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!("⚠️ Could not read schema version, assuming {}: {}", self.target, e);
                self.target.clone()
            }
        }
    }

    async fn detect(&self) -> StoreResult<String> {
        let record = self
            .storage
            .get(keys::VERSION_KEY)
            .await
            .map_err(|e| StoreError::storage("get", keys::VERSION_KEY, e))?;

        if let Some(record) = record {
            match record.get("version").and_then(Value::as_str) {
                Some(version) => return Ok(version.to_string()),
                None => tracing::warn!("⚠️ Version record is malformed: {}", record),
            }
        }

        let legacy_key = keys::legacy_key(self.platform);
        let legacy = self
            .storage
            .has(&legacy_key)
            .await
            .map_err(|e| StoreError::storage("has", &legacy_key, e))?;
        if legacy {
            tracing::info!("📦 Found pre-versioning data under '{}'", legacy_key);
            return Ok(LEGACY_VERSION.to_string());
        }

        tracing::info!("🆕 Initializing schema version {}", self.target);
        self.set_version(&self.target).await?;
        Ok(self.target.clone())
    }

    /// Overwrite the version record
    pub async fn set_version(&self, version: &str) -> StoreResult<()> {
        let record = json!({
            "version": version,
            "updatedAt": Utc::now(),
        });
        self.storage
            .set(keys::VERSION_KEY, record)
            .await
            .map_err(|e| StoreError::storage("set", keys::VERSION_KEY, e))
    }

    pub async fn needs_migration(&self) -> bool {
        !same_version(&self.get_current_version().await, &self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::cmp::Ordering;

    #[test]
    fn versions_compare_numerically() {
        let v = |s: &str| s.parse::<SchemaVersion>().unwrap();
        assert!(v("1.10") > v("1.9"));
        assert_eq!(v("2"), v("2.0.0"));
        assert_eq!(v("1.0").to_string(), "1.0.0");
        assert!("1.x".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
        assert!("".parse::<SchemaVersion>().is_err());
        assert_eq!(v("2.0").cmp(&v("10.0")), Ordering::Less);
    }

    #[tokio::test]
    async fn fresh_store_is_stamped_with_target() {
        let storage = Arc::new(MemoryStorage::new());
        let versions = VersionManager::new(storage.clone(), Platform::Linux);

        assert_eq!(versions.get_current_version().await, CURRENT_SCHEMA_VERSION);
        let record = storage.get("version").await.unwrap().unwrap();
        assert_eq!(record["version"], CURRENT_SCHEMA_VERSION);
        assert!(!versions.needs_migration().await);
    }

    #[tokio::test]
    async fn legacy_key_reports_legacy_without_writing() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("workflows_linux", json!({"tabs": []})).await.unwrap();
        let versions = VersionManager::new(storage.clone(), Platform::Linux);

        assert_eq!(versions.get_current_version().await, LEGACY_VERSION);
        assert!(versions.needs_migration().await);
        assert!(!storage.has("version").await.unwrap());
    }

    #[tokio::test]
    async fn legacy_key_of_other_platform_is_ignored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("workflows_win32", json!({"tabs": []})).await.unwrap();
        let versions = VersionManager::new(storage.clone(), Platform::Linux);

        assert_eq!(versions.get_current_version().await, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn same_version_ignores_missing_components() {
        assert!(same_version("2.0", "2.0.0"));
        assert!(same_version("2", "2.0"));
        assert!(!same_version("1.0", "2.0"));
        assert!(same_version("beta", "beta"));
        assert!(!same_version("beta", "2.0"));
    }

    #[tokio::test]
    async fn padded_record_needs_no_migration() {
        let storage = Arc::new(MemoryStorage::new());
        let versions = VersionManager::new(storage.clone(), Platform::Linux);
        versions.set_version("2.0.0").await.unwrap();

        assert!(!versions.needs_migration().await);
    }

    #[tokio::test]
    async fn explicit_record_wins() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("workflows_linux", json!({})).await.unwrap();
        let versions = VersionManager::new(storage.clone(), Platform::Linux);
        versions.set_version("1.5").await.unwrap();

        assert_eq!(versions.get_current_version().await, "1.5");
    }
}
