//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use futurity_subjects::ApiEndpoints;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Remote service base URLs
    pub endpoints: ApiEndpoints,
    /// Per-request timeout of the subject API client
    pub request_timeout_secs: u64,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("futurity.db"),
            endpoints: ApiEndpoints::default(),
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Futurity"))
            .unwrap_or_else(|| PathBuf::from(".futurity"))
    }

    /// Point every endpoint at one root, e.g. a staging host.
    pub fn with_api_root(mut self, root: &str) -> Result<Self> {
        let root = Url::parse(root)
            .map_err(|e| CoreError::Config(format!("invalid API root {root}: {e}")))?;
        self.endpoints = ApiEndpoints::from_root(&root)
            .map_err(|e| CoreError::Config(format!("invalid API root {root}: {e}")))?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;

        if config.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
