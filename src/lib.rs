/// flowstash: versioned document store over an opaque key-value backend
///
/// Typed repositories for workflows, folders, variables and configuration, recursive
/// folder/config resolution, and a schema version + migration pipeline.

// Service configuration
pub mod config;

// Error taxonomy shared by every layer
pub mod error;

// Storage Port and backends (memory, SQLite)
pub mod storage;

// Record types
pub mod model;

// Repositories mapping records onto keys
pub mod repository;

// Schema version tracking and migrations
pub mod migration;

// Store context wiring everything together
pub mod context;

// HTTP API layer
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use context::StoreContext;
pub use error::{StoreError, StoreResult};
pub use model::{Folder, FolderRecord, ItemRef, TreeItem, Workflow};
pub use repository::{ConfigRepository, DeleteReport, EntityRepository, FolderRepository, Outcome};
pub use server::start_server;
pub use storage::{MemoryStorage, Platform, SqliteStorage, StoragePort};
