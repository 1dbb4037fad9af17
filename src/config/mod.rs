/// Configuration management for the flowstash service
///
/// Handles server binding, storage backend selection and platform namespacing.

use crate::storage::Platform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Storage configuration
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Which key-value backend sits behind the Storage Port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Directory holding `flowstash.db` (sqlite backend only)
    pub data_dir: String,
    /// Namespace override; detected from the host OS when unset
    pub platform: Option<Platform>,
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("flowstash.db")
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::detect)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let backend = match std::env::var("FLOWSTASH_BACKEND").as_deref() {
            Ok("memory") => Backend::Memory,
            _ => Backend::Sqlite,
        };
        let platform = std::env::var("FLOWSTASH_PLATFORM")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(platform) => Some(platform),
                Err(e) => {
                    tracing::warn!("⚠️ Ignoring FLOWSTASH_PLATFORM: {}", e);
                    None
                }
            });

        Self {
            backend,
            data_dir: std::env::var("FLOWSTASH_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            platform,
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("FLOWSTASH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FLOWSTASH_PORT")
                    .unwrap_or_else(|_| "3004".to_string())
                    .parse()
                    .unwrap_or(3004),
            },
            storage: StorageConfig::default(),
        }
    }
}
