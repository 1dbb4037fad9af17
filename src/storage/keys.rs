/// Physical key layout
///
/// Records:   `<kind>/<id>`
/// Indexes:   `<kind>_index_<platform>`
/// Config:    `config_<platform>`
/// Version:   `version` (global singleton)
/// Legacy:    `workflows_<platform>` (pre-versioning blob, probed during version detection)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key of the schema version singleton
pub const VERSION_KEY: &str = "version";

/// Host operating system used to namespace indexes and config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Win32,
    Darwin,
    Linux,
}

impl Platform {
    /// Resolve the namespace for the running host
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Win32,
            "macos" => Platform::Darwin,
            _ => Platform::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Win32 => "win32",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win32" | "windows" => Ok(Platform::Win32),
            "darwin" | "macos" => Ok(Platform::Darwin),
            "linux" => Ok(Platform::Linux),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

pub fn record_key(kind: &str, id: &str) -> String {
    format!("{}/{}", kind, id)
}

pub fn index_key(kind: &str, platform: Platform) -> String {
    format!("{}_index_{}", kind, platform)
}

pub fn config_key(platform: Platform) -> String {
    format!("config_{}", platform)
}

pub fn legacy_key(platform: Platform) -> String {
    format!("workflows_{}", platform)
}
