//! Error types for configuration loading and backtest fetches.

use std::path::PathBuf;

use thiserror::Error;
use tradelog_core::DecodeError;

/// Failure of one backtest request.
///
/// The list, detail and trade-log requests each keep their own error so one
/// failure never hides another request's result.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 401. Re-authentication is the caller's concern.
    #[error("unauthorized: the API token is missing or expired")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("malformed trade log: {0}")]
    TradeLog(#[from] DecodeError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Unauthorized)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },
}
