//! Configuration loading and management
//!
//! Handles parsing of the taskflow `config.toml`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::category::{DEFAULT_COLOR, DEFAULT_ICON};
use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::task::Priority;
use crate::upload::{UploadPolicy, DEFAULT_MAX_UPLOAD_SIZE};

/// File name looked up in the platform config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store backend configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Seed data configuration
    #[serde(default)]
    pub seed: SeedConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Category defaults
    #[serde(default)]
    pub categories: CategoriesConfig,

    /// Upload validation
    #[serde(default)]
    pub uploads: UploadsConfig,
}

/// Which `KeyedStore` implementation to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(Error::InvalidConfig(format!(
                "storage.backend: unknown backend '{other}' (expected file|memory)"
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend: file or memory
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory for the file backend (defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// How long a writer waits for the document lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StorageConfig {
    /// Data directory for the file backend
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig("could not determine a data directory; set storage.data_dir".to_string())
            })
    }

    /// Directory where accepted uploads are copied
    pub fn attachments_dir(&self) -> Result<PathBuf> {
        Ok(self.resolved_data_dir()?.join("attachments"))
    }
}

/// Seed data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Populate empty stores with the bundled sample tasks and categories
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Treat a stored empty collection like a missing one and reseed it
    #[serde(default = "default_true")]
    pub reseed_empty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reseed_empty: true,
        }
    }
}

/// Task defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Priority for tasks created without one
    #[serde(default)]
    pub default_priority: Priority,
}

/// Category defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    #[serde(default = "default_category_color")]
    pub default_color: String,

    #[serde(default = "default_category_icon")]
    pub default_icon: String,
}

fn default_category_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_category_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            default_color: default_category_color(),
            default_icon: default_category_icon(),
        }
    }
}

/// Upload validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Maximum accepted size in bytes
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Comma-separated extensions or name fragments, `*` for any
    #[serde(default = "default_accept")]
    pub accept: String,
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_UPLOAD_SIZE
}

fn default_accept() -> String {
    "*".to_string()
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            accept: default_accept(),
        }
    }
}

impl UploadsConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_size: self.max_size,
            accept: self.accept.clone(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "taskflow")
}

/// Platform default location of `config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load from an explicit path, or from the platform default path
    ///
    /// An explicit path must exist and parse. The implicit default path may
    /// be missing; if it is broken the defaults are used.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        match Self::load(&path) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Ok(Self::default())
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if let Some(dir) = &self.storage.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::InvalidConfig(
                    "storage.data_dir cannot be empty".to_string(),
                ));
            }
        }
        if self.categories.default_color.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "categories.default_color cannot be empty".to_string(),
            ));
        }
        if self.categories.default_icon.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "categories.default_icon cannot be empty".to_string(),
            ));
        }
        if self.uploads.max_size == 0 {
            return Err(Error::InvalidConfig(
                "uploads.max_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
