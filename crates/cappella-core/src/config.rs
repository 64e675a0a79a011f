//! Client configuration
//!
//! Settings are resolved in order: built-in defaults, then a TOML file
//! (`~/.cappella/config.toml` unless a path is given), then environment
//! overrides.

use crate::profile::DobFormat;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Host of the deployed profile service
pub const DEFAULT_BASE_URL: &str = "http://ec2-35-165-186-112.us-west-2.compute.amazonaws.com/";

/// Resource path of the single profile served by the deployment
pub const DEFAULT_RESOURCE_PATH: &str = "baby-profile-test/e71b3147-01f5-42bb";

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "CAPPELLA_BASE_URL";

/// Environment variable overriding `resource_path`
pub const ENV_RESOURCE_PATH: &str = "CAPPELLA_RESOURCE_PATH";

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("I/O error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// TOML parse error
    #[error("Config parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A value failed validation
    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    /// Home directory could not be determined
    #[error("Home directory not found")]
    HomeNotFound,
}

impl ConfigError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Invalid { .. } => "VALIDATION_ERROR",
            Self::HomeNotFound => "HOME_NOT_FOUND",
        }
    }
}

/// Settings for reaching the profile service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host of the service
    pub base_url: String,
    /// Path segment under `api/user/` identifying the profile resource
    pub resource_path: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Wire form for dates of birth
    pub dob_format: DobFormat,
    /// Publish the detailed transport error instead of the short message
    pub detailed_errors: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
            timeout_secs: 30,
            dob_format: DobFormat::default(),
            detailed_errors: false,
        }
    }
}

impl ClientConfig {
    /// Default config file location
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn default_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".cappella").join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// explicit path is an error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from a key lookup (the process environment in practice)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(path) = lookup(ENV_RESOURCE_PATH).filter(|v| !v.trim().is_empty()) {
            self.resource_path = path;
        }
    }

    /// Check that every value can be used to build requests
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            field: "base_url",
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "base_url",
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let resource = self.resource_path.trim_matches('/');
        if resource.is_empty() {
            return Err(ConfigError::Invalid {
                field: "resource_path",
                message: "cannot be empty".to_string(),
            });
        }
        if resource.split('/').any(|segment| segment == ".." || segment.is_empty()) {
            return Err(ConfigError::Invalid {
                field: "resource_path",
                message: format!("'{}' has an empty or '..' segment", self.resource_path),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Serialize as TOML for display
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
