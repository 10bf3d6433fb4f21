//! Client configuration
//!
//! Loaded from a YAML file, by default
//! `<config_dir>/nimbus-pilot/config.yaml`. Holds the service endpoint,
//! the session token, the cloud catalog, and optionally remembered
//! credentials. Credential storage beyond this file is out of scope.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A cloud provider entry from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudInfo {
    pub id: i64,
    pub name: String,
    /// The designated default provider gets the legacy-image caution at
    /// discovery time.
    #[serde(default)]
    pub default: bool,
}

/// Full client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotConfig {
    /// Base URL of the launch service
    pub endpoint: String,
    /// Session anti-forgery token, sent with every request
    #[serde(default)]
    pub token: Option<String>,
    /// Clouds offered in the provider selector
    #[serde(default)]
    pub clouds: Vec<CloudInfo>,
    /// Remembered access key, prefilled into the form
    #[serde(default)]
    pub access_key: Option<String>,
    /// Remembered secret key, prefilled into the form
    #[serde(default)]
    pub secret_key: Option<String>,
}

impl PilotConfig {
    /// Load from an explicit path, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self, ApiError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            return Err(ApiError::ConfigNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(&path)?;
        let config: PilotConfig = serde_yaml::from_str(&contents)?;
        if config.endpoint.trim().is_empty() {
            return Err(ApiError::ConfigInvalid("endpoint is empty".into()));
        }
        Ok(config)
    }

    /// Default config path under the platform config directory
    pub fn default_path() -> Result<PathBuf, ApiError> {
        let dir = dirs_next::config_dir().ok_or(ApiError::NoConfigDirectory)?;
        Ok(dir.join("nimbus-pilot").join("config.yaml"))
    }

    /// The cloud flagged as default, if any
    pub fn default_cloud(&self) -> Option<&CloudInfo> {
        self.clouds.iter().find(|c| c.default)
    }
}
