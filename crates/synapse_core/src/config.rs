//! Runtime configuration.
//!
//! # Responsibility
//! - Load settings from an optional TOML file.
//! - Apply `SYNAPSE_*` environment overrides on top.
//! - Validate values before any component is constructed.
//!
//! # Invariants
//! - An absent or blank `endpoint` means demo mode.
//! - `log_dir` is absolute after validation.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "SYNAPSE_ENDPOINT";
pub const ENV_DB_PATH: &str = "SYNAPSE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SYNAPSE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SYNAPSE_LOG_DIR";

const APP_DIR_NAME: &str = "synapse";
const DB_FILE_NAME: &str = "synapse.sqlite3";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_DEMO_DELAY_MS: u64 = 800;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Effective settings for one process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynapseConfig {
    /// Remote capture endpoint; `None` runs in demo mode.
    pub endpoint: Option<String>,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub request_timeout_ms: u64,
    pub demo_delay_ms: u64,
}

impl Default for SynapseConfig {
    fn default() -> Self {
        let base = default_data_dir();
        Self {
            endpoint: None,
            db_path: base.join(DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: base.join("logs"),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            demo_delay_ms: DEFAULT_DEMO_DELAY_MS,
        }
    }
}

impl SynapseConfig {
    /// Reads `path` when given, otherwise starts from defaults, then applies
    /// process environment overrides.
    ///
    /// The result is not validated yet: callers layer their own overrides on
    /// top and call [`SynapseConfig::validate`] last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// [`SynapseConfig::load`] with an explicit environment lookup.
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        Ok(config)
    }

    /// Parses one TOML file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        if let Some(db_path) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(log_dir) = lookup(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(log_dir);
        }
    }

    /// Normalizes the endpoint and checks value ranges.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.endpoint = self
            .endpoint
            .take()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                return Err(ConfigError::Invalid(format!(
                    "endpoint must be an http(s) URL, got `{endpoint}`"
                )));
            }
        }
        if !self.log_dir.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "log_dir must be an absolute path, got `{}`",
                self.log_dir.display()
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_demo(&self) -> bool {
        self.endpoint.is_none()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn demo_delay(&self) -> Duration {
        Duration::from_millis(self.demo_delay_ms)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}
