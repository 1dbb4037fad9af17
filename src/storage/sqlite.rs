/// SQLite storage backend
///
/// Persists every key as one row of a `kv_store` table. Values are stored as JSON text,
/// so the backend stays agnostic of record shapes and schema versions.

use crate::storage::StoragePort;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::Path;

/// SQLite-backed implementation of the Storage Port
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    /// Connection pool for the key/value database
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Wrap an existing pool. Call `init_schema` before first use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a database file and make sure the table exists
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory '{}'", parent.display())
                })?;
            }
        }

        tracing::info!("🗄️ Opening SQLite store: {}", path.display());
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Private in-memory database
    ///
    /// Every SQLite connection to `:memory:` sees its own database, so the pool is pinned
    /// to a single connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create the key/value table. Safe to call multiple times.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl StoragePort for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.get("value");
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Stored value for '{}' is not valid JSON", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let raw = serde_json::to_string(&value)?;

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(&raw)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        // substr() instead of LIKE so '_' and '%' in prefixes match literally
        let rows = sqlx::query(
            "SELECT key FROM kv_store WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get::<String, _>("key")).collect())
    }

    async fn clear(&self, prefix: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE substr(key, 1, length(?1)) = ?1")
            .bind(prefix)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
