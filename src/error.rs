/// Error taxonomy for the document store
///
/// Domain failures (NotFound, Validation) are raised by single-entity operations and
/// reach the caller unwrapped. Anything coming out of the storage backend is wrapped
/// as `Storage` before it crosses a repository boundary.

use thiserror::Error;

/// Result alias used by every repository and migration operation
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested id has no record of this kind
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Malformed input (missing id, bad version string, invalid registration)
    #[error("validation failed: {0}")]
    Validation(String),

    /// A backend call failed, or returned data that could not be decoded
    #[error("storage {operation} failed for key '{key}': {source}")]
    Storage {
        operation: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A registered migration step failed; earlier steps are not rolled back
    #[error("migration {from} -> {to} failed: {source}")]
    Migration {
        from: String,
        to: String,
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn storage(operation: &'static str, key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Storage {
            operation,
            key: key.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
