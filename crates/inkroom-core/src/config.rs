//! Engine configuration.

use crate::presence::DEFAULT_PRESENCE_TIMEOUT_MS;
use crate::storage::DEFAULT_AUTOSAVE_INTERVAL_MS;
use crate::tools::ToolSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Prefix of every persistence key.
    pub namespace: String,
    pub autosave_interval_ms: u64,
    pub presence_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            namespace: "inkroom".to_string(),
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            presence_timeout_ms: DEFAULT_PRESENCE_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Width of boxes created by the text tool.
    pub default_width: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { default_width: 200.0 }
    }
}

/// Top-level configuration. Every field has a default, so `{}` is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sync: SyncConfig,
    pub tools: ToolSettings,
    pub text: TextConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
