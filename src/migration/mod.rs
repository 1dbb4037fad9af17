/// Schema versioning and migrations
///
/// - `VersionManager`: reads/writes the `version` singleton and detects legacy data
/// - `MigrationRunner`: chains registered steps from the stored version to the target
/// - `LegacyLayoutMigration`: 1.0 -> 2.0, explodes the monolithic blob into per-record keys
///
/// Migrations operate on raw JSON through the Storage Port, never through the
/// repositories, because they read layouts the repositories no longer understand.

pub mod legacy;
pub mod runner;
pub mod version;

pub use legacy::LegacyLayoutMigration;
pub use runner::{Migration, MigrationContext, MigrationReport, MigrationRunner, MigrationStep};
pub use version::{SchemaVersion, VersionManager};

/// Schema version this build reads and writes
pub const CURRENT_SCHEMA_VERSION: &str = "2.0";

/// Version assumed for data written before version tracking existed
pub const LEGACY_VERSION: &str = "1.0";
