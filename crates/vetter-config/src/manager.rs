use crate::security::{set_config_permissions, validate_config, ValidationError};
use crate::types::VetterConfig;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Config file already exists at {0}")]
    ConfigExists(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Manager for vetter configuration
///
/// Manages the configuration stored in ~/.vetter/config.toml.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: VetterConfig,
}

impl ConfigManager {
    /// Get the default config path (~/.vetter/config.toml)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".vetter").join("config.toml"))
    }

    /// Load config from default location
    pub async fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path).await
    }

    /// Load config from specific path (useful for testing)
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: VetterConfig = toml::from_str(&contents)?;
        debug!(path = %path.display(), "loaded config");

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Load config from `path` (or the default location), using defaults if the file is absent
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        match Self::load_from(&config_path).await {
            Ok(manager) => Ok(manager),
            Err(ConfigError::ConfigNotFound(_)) => {
                debug!(path = %config_path.display(), "no config file, using defaults");
                Ok(Self {
                    config_path,
                    config: VetterConfig::default(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Initialize a new config file at the default location
    pub async fn init(force: bool) -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::init_at(&config_path, force).await
    }

    /// Initialize config at specific path
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub async fn init_at(path: &Path, force: bool) -> Result<Self, ConfigError> {
        if !force && tokio::fs::try_exists(path).await? {
            return Err(ConfigError::ConfigExists(path.to_path_buf()));
        }

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let manager = Self {
            config_path: path.to_path_buf(),
            config: VetterConfig::default(),
        };
        manager.save().await?;

        Ok(manager)
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub async fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.config)?;

        // Write to temporary file first
        let temp_path = self.config_path.with_extension("toml.tmp");
        tokio::fs::write(&temp_path, toml_str).await?;

        // Set permissions on temp file (sync operation, uses std::fs)
        set_config_permissions(&temp_path)?;

        // Atomic rename
        tokio::fs::rename(&temp_path, &self.config_path).await?;
        debug!(path = %self.config_path.display(), "saved config");

        Ok(())
    }

    /// Check every configured value
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(&self.config)?;
        Ok(())
    }

    /// Path this config was loaded from or will be saved to
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get reference to config
    pub fn config(&self) -> &VetterConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut VetterConfig {
        &mut self.config
    }
}
