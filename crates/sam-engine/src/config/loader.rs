use super::schema::SamConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from an explicit path when one is given, otherwise fall back to
    /// the default locations.
    pub async fn load(path: Option<&Path>) -> Result<SamConfig, ConfigError> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Self::load_default().await,
        }
    }

    /// Load from default locations:
    /// 1. ./sam.yaml
    /// 2. ~/.sam/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<SamConfig, ConfigError> {
        let local_config = PathBuf::from("./sam.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".sam").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        debug!("no config file found, using defaults");
        Ok(SamConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<SamConfig, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let content = tokio::fs::read_to_string(path).await?;
        // An empty file parses as YAML null; treat it like an empty mapping.
        if content.trim().is_empty() {
            return Ok(SamConfig::default());
        }
        let config: SamConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
