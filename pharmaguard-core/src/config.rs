//! Client configuration: TOML file with an environment override.
//!
//! ```toml
//! api_url = "http://localhost:8000/api"
//! timeout_secs = 60
//! request_shape = "multi"     # or "single"
//! on_failure = "surface"      # or "synthesize"
//! max_upload_bytes = 5242880
//! log_filter = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::RequestShape;
use crate::session::FailurePolicy;
use crate::validation::MAX_UPLOAD_BYTES;

/// Environment variable that overrides `api_url`.
pub const API_URL_ENV: &str = "PHARMAGUARD_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL; `/analyze` and `/health` are appended.
    pub api_url: String,
    pub timeout_secs: u64,
    pub request_shape: RequestShape,
    pub on_failure: FailurePolicy,
    /// Upload size cap. May lower the 5 MiB limit, never raise it.
    pub max_upload_bytes: u64,
    /// `tracing_subscriber::EnvFilter` directive used when `PHARMAGUARD_LOG` is unset.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 60,
            request_shape: RequestShape::default(),
            on_failure: FailurePolicy::default(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// `{config_dir}/pharmaguard/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pharmaguard").join("config.toml"))
    }

    /// Parse TOML text and validate.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Resolve the effective config: explicit path, else the default path if
    /// present, else defaults; then apply the environment override.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_url = url;
            config.validate()?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must start with http:// or https://, got {:?}",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes must be positive".into()));
        }
        if self.max_upload_bytes > MAX_UPLOAD_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_upload_bytes must not exceed {MAX_UPLOAD_BYTES}, got {}",
                self.max_upload_bytes
            )));
        }
        Ok(())
    }
}
