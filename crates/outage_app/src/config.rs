//! Config file loading for the harvest binary.
//!
//! The file is JSON with two sections: `session` describes the harvest
//! itself, `advanced` holds runtime knobs like the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use outage_core::SessionConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file is missing: {0}")]
    Missing(PathBuf),
    #[error("config file {path} is corrupted: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Runtime knobs that do not describe the harvest itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_file: PathBuf::from("harvest.log"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub advanced: AdvancedConfig,
}

impl AppConfig {
    /// Loads and parses the config file, distinguishing a missing file from
    /// a corrupt one so the fatal error names the actual problem.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            Err(err) => {
                return Err(ConfigError::Corrupt {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                });
            }
        };

        serde_json::from_str(&content).map_err(|err| ConfigError::Corrupt {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}
