//! Client configuration: TOML file plus environment overrides.
//!
//! Lookup order, later wins:
//! 1. Built-in defaults
//! 2. `<config_dir>/tradelog/config.toml` (or an explicit path)
//! 3. `TRADELOG_API_URL`, `TRADELOG_TOKEN`, `TRADELOG_OUTPUT_DIR`,
//!    `TRADELOG_DATA_DIR`, `TRADELOG_TIMEOUT_SECS`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, FetchError};
use crate::source::{BacktestSource, DirSource, HttpSource};

pub const ENV_API_URL: &str = "TRADELOG_API_URL";
pub const ENV_TOKEN: &str = "TRADELOG_TOKEN";
pub const ENV_OUTPUT_DIR: &str = "TRADELOG_OUTPUT_DIR";
pub const ENV_DATA_DIR: &str = "TRADELOG_DATA_DIR";
pub const ENV_TIMEOUT_SECS: &str = "TRADELOG_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backtest API, without a trailing slash.
    pub api_url: String,
    /// Bearer token attached to every request.
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Where report exports are written.
    pub output_dir: PathBuf,
    /// Read backtests from a local directory instead of the API.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".into(),
            token: None,
            timeout_secs: 30,
            output_dir: PathBuf::from("exports"),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// `<config_dir>/tradelog/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tradelog").join("config.toml"))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `path` (or the default path), then apply the environment.
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_from(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = present(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = present(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(dir) = present(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = present(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = present(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs.trim().parse().map_err(|e| ConfigError::Env {
                var: ENV_TIMEOUT_SECS,
                reason: format!("{secs:?}: {e}"),
            })?;
        }
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// The source this configuration points at: the local data directory
    /// when one is set, the HTTP API otherwise.
    pub fn source(&self) -> Result<Box<dyn BacktestSource>, FetchError> {
        match &self.data_dir {
            Some(dir) => Ok(Box::new(DirSource::new(dir))),
            None => Ok(Box::new(HttpSource::new(self)?)),
        }
    }
}
