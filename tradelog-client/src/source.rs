//! Backtest sources: the HTTP API and a local directory of saved runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};
use tradelog_core::{BacktestDetail, BacktestListing};

use crate::config::ClientConfig;
use crate::error::FetchError;

/// Where backtest listings, details and trade logs come from.
///
/// Implementations must be thread-safe: the detail and trade-log requests
/// of one report are issued concurrently.
pub trait BacktestSource: Send + Sync {
    /// Short name for logs and the status bar.
    fn name(&self) -> &str;

    fn list(&self) -> Result<Vec<BacktestListing>, FetchError>;

    fn detail(&self, id: &str) -> Result<BacktestDetail, FetchError>;

    /// Raw trade-log CSV text.
    fn trade_log(&self, id: &str) -> Result<String, FetchError>;
}

/// Listing bodies come either bare or wrapped in an object. Each wrapper
/// key has its own slot so bodies carrying more than one still parse.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListingPayload {
    Bare(Vec<BacktestListing>),
    Wrapped(WrappedListing),
}

#[derive(Deserialize)]
struct WrappedListing {
    #[serde(default)]
    backtests: Option<Vec<BacktestListing>>,
    #[serde(default)]
    items: Option<Vec<BacktestListing>>,
    #[serde(default)]
    data: Option<Vec<BacktestListing>>,
    #[serde(default)]
    results: Option<Vec<BacktestListing>>,
}

impl ListingPayload {
    fn into_vec(self) -> Option<Vec<BacktestListing>> {
        match self {
            ListingPayload::Bare(v) => Some(v),
            ListingPayload::Wrapped(w) => w.backtests.or(w.items).or(w.data).or(w.results),
        }
    }
}

fn parse_listing(body: &str) -> Result<Vec<BacktestListing>, FetchError> {
    let payload = serde_json::from_str::<ListingPayload>(body)
        .map_err(|e| FetchError::Decode(format!("backtest listing: {e}")))?;
    payload
        .into_vec()
        .ok_or_else(|| FetchError::Decode("backtest listing: no backtests array".to_string()))
}

fn parse_detail(body: &str) -> Result<BacktestDetail, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(format!("backtest detail: {e}")))
}

// ─── HTTP ───────────────────────────────────────────────────────────

/// Blocking client for the backtest REST API.
///
/// - `GET {api}/backtests`
/// - `GET {api}/backtests/{id}`
/// - `GET {api}/backtests/{id}/trades` (CSV body)
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSource {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("tradelog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url(path);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!(%url, "GET");
        let resp = request.send()?;
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(resp.text()?)
    }
}

impl BacktestSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn list(&self) -> Result<Vec<BacktestListing>, FetchError> {
        parse_listing(&self.get_text("backtests")?)
    }

    fn detail(&self, id: &str) -> Result<BacktestDetail, FetchError> {
        parse_detail(&self.get_text(&format!("backtests/{}", path_segment(id)?))?)
    }

    fn trade_log(&self, id: &str) -> Result<String, FetchError> {
        self.get_text(&format!("backtests/{}/trades", path_segment(id)?))
    }
}

/// Ids are interpolated into paths and file names; reject anything that
/// could escape its segment.
fn path_segment(id: &str) -> Result<&str, FetchError> {
    let ok = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        && id != "."
        && id != "..";
    if ok {
        Ok(id)
    } else {
        Err(FetchError::NotFound(format!("invalid backtest id {id:?}")))
    }
}

// ─── Local directory ────────────────────────────────────────────────

/// Saved runs in a directory: `index.json` (listing), `<id>.json` (detail)
/// and `<id>.csv` (trade log).
///
/// Without `index.json` the listing is built from the `*.csv` file names.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, name: &str) -> Result<String, FetchError> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.display().to_string())
            } else {
                FetchError::Io { path, source }
            }
        })
    }

    fn scan_csv_ids(&self) -> Result<Vec<BacktestListing>, FetchError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| FetchError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        ids.sort();

        Ok(ids
            .into_iter()
            .map(|id| BacktestListing {
                id,
                ..Default::default()
            })
            .collect())
    }
}

impl BacktestSource for DirSource {
    fn name(&self) -> &str {
        "dir"
    }

    fn list(&self) -> Result<Vec<BacktestListing>, FetchError> {
        match self.read("index.json") {
            Ok(body) => parse_listing(&body),
            Err(FetchError::NotFound(_)) => self.scan_csv_ids(),
            Err(e) => Err(e),
        }
    }

    fn detail(&self, id: &str) -> Result<BacktestDetail, FetchError> {
        parse_detail(&self.read(&format!("{}.json", path_segment(id)?))?)
    }

    fn trade_log(&self, id: &str) -> Result<String, FetchError> {
        self.read(&format!("{}.csv", path_segment(id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_bare_and_wrapped() {
        let bare = parse_listing(r#"[{"id": 1, "symbol": "BTCUSDT"}]"#).unwrap();
        assert_eq!(bare[0].id, "1");
        let wrapped = parse_listing(r#"{"items": [{"id": "a"}, {"id": "b"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 2);
        assert!(matches!(parse_listing("{}"), Err(FetchError::Decode(_))));

        let both = parse_listing(r#"{"items": [{"id": "a"}], "data": [{"id": "b"}, {"id": "c"}]}"#).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, "a");
    }

    #[test]
    fn ids_cannot_escape() {
        assert!(path_segment("42").is_ok());
        assert!(path_segment("run_2024-01.v2").is_ok());
        assert!(path_segment("../etc/passwd").is_err());
        assert!(path_segment("a/b").is_err());
        assert!(path_segment("..").is_err());
        assert!(path_segment("").is_err());
    }

    #[test]
    fn http_urls() {
        let config = ClientConfig {
            api_url: "http://localhost:9/api/".into(),
            ..Default::default()
        };
        let source = HttpSource::new(&config).unwrap();
        assert_eq!(source.url("backtests/7/trades"), "http://localhost:9/api/backtests/7/trades");
        assert_eq!(source.name(), "http");
    }

    #[test]
    fn dir_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("7.json"), r#"{"initial_capital": 500}"#).unwrap();
        std::fs::write(dir.path().join("7.csv"), "exit_time,pnl_usdt\n2024-01-01,1\n").unwrap();
        std::fs::write(dir.path().join("3.csv"), "exit_time\n").unwrap();

        let source = DirSource::new(dir.path());
        let ids: Vec<String> = source.list().unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["3", "7"]);
        assert_eq!(source.detail("7").unwrap().initial_capital, Some(500.0));
        assert!(source.trade_log("7").unwrap().starts_with("exit_time"));
        assert!(matches!(source.detail("3"), Err(FetchError::NotFound(_))));
    }

    #[test]
    fn dir_source_prefers_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.json"), r#"[{"id": 9, "interval": "4h"}]"#).unwrap();
        let listing = DirSource::new(dir.path()).list().unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].interval.as_deref(), Some("4h"));
    }
}
