//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use blockdraft::{BlockdraftError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for BlockdraftError {
    fn from(err: ConfigError) -> Self {
        BlockdraftError::Config(err.to_string())
    }
}

/// The library configuration plus the CLI's own `[store]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    app: AppConfig,

    #[serde(default)]
    store: StoreConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    data_dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn into_app(self) -> AppConfig {
        self.app
    }

    /// Resolves the data directory: `override_dir`, then the `[store]`
    /// table, then the platform data directory, then `blockdraft/data`.
    pub fn data_dir(&self, override_dir: Option<&str>) -> PathBuf {
        if let Some(dir) = override_dir {
            return PathBuf::from(dir);
        }
        if let Some(dir) = &self.store.data_dir {
            return dir.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.data_dir().join("diagrams"),
            None => PathBuf::from("blockdraft/data"),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "blockdraft", "blockdraft")
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (blockdraft/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<CliConfig, BlockdraftError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("blockdraft/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = project_dirs() {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(CliConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<CliConfig, BlockdraftError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: CliConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}
