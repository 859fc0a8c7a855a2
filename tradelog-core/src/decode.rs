//! Trade-log CSV decoding.
//!
//! The format has no quoting: every line is split on commas, so a value
//! containing a literal comma shifts the columns after it. Existing exports
//! rely on this, so quotes are kept as ordinary characters.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::record::{Header, TradeRecord};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed trade log at line {line}: {source}")]
    Malformed {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Decode raw trade-log text into records.
///
/// The first non-blank line is the header. Extra fields are dropped and
/// short rows padded with empty strings. Empty input yields no records.
pub fn decode_csv(text: &str) -> Result<Vec<TradeRecord>, DecodeError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut header: Option<Arc<Header>> = None;
    let mut records = Vec::new();
    let mut ragged = 0usize;

    for result in reader.records() {
        let row = result.map_err(|source| DecodeError::Malformed {
            line: source.position().map_or(0, |p| p.line()),
            source,
        })?;
        if is_blank(&row) {
            continue;
        }

        match &header {
            None => {
                let columns = row.iter().map(|c| c.trim().to_string()).collect();
                header = Some(Arc::new(Header::new(columns)));
            }
            Some(h) => {
                if row.len() != h.len() {
                    ragged += 1;
                }
                let values = row.iter().take(h.len()).map(str::to_string).collect();
                records.push(TradeRecord::new(Arc::clone(h), values));
            }
        }
    }

    if ragged > 0 {
        warn!(ragged, total = records.len(), "trade log rows do not match header width");
    }
    debug!(
        records = records.len(),
        columns = header.as_ref().map_or(0, |h| h.len()),
        "decoded trade log"
    );
    Ok(records)
}

fn is_blank(row: &csv::StringRecord) -> bool {
    row.iter().all(|f| f.trim().is_empty()) && row.len() <= 1
}
