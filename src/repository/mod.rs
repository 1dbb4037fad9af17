/// Repository layer
///
/// Maps typed records onto flat keys of the Storage Port:
/// - `EntityRepository<T>`: CRUD plus a per-platform id index for one record kind
/// - `FolderRepository`: materializes, saves and deletes folder trees
/// - `ConfigRepository`: tabs of items, resolved on load and flattened on save

pub mod config;
pub mod entity;
pub mod folder;

use serde::Serialize;

pub use config::ConfigRepository;
pub use entity::EntityRepository;
pub use folder::FolderRepository;

/// Result of a best-effort operation
///
/// Aggregate reads skip members they cannot load instead of failing; `skipped`
/// counts how many were left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub skipped: usize,
}

impl<T> Outcome<T> {
    pub fn complete(value: T) -> Self {
        Self { value, skipped: 0 }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// What a recursive folder deletion touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Records removed, the root folder included
    pub removed: usize,
    /// Children that were missing, unrecognized or failed to delete
    pub skipped: usize,
}
