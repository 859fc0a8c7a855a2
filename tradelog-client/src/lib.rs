//! tradelog-client: where backtests come from and what the report page holds.
//!
//! This crate builds on `tradelog-core` to provide:
//! - Client configuration from TOML and the environment
//! - The `BacktestSource` trait with HTTP and local-directory sources
//! - A report session with concurrent fetches, a stale-result guard and
//!   atomic application of results

pub mod config;
pub mod error;
pub mod session;
pub mod source;

pub use config::ClientConfig;
pub use error::{ConfigError, FetchError};
pub use session::{LoadTicket, ReportBatch, ReportSession, ReportView};
pub use source::{BacktestSource, DirSource, HttpSource};
