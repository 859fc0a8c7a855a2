//! CSV re-export of derived report tables.
//!
//! Output is BOM-prefixed so spreadsheet tools detect UTF-8, uses `\n`
//! line endings and performs no quoting or escaping. Values are expected to
//! be numbers from [`format_plain`] or short labels without commas.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::chart::{distribution, DailyPoint};
use crate::filter::ExitTally;
use crate::format::{format_plain, MetricKind};
use crate::summary::Summary;

pub const UTF8_BOM: &str = "\u{feff}";

pub const SUMMARY_FILE: &str = "backtest_summary.csv";
pub const DISTRIBUTION_FILE: &str = "tp_sl_distribution.csv";
pub const DAILY_FILE: &str = "daily_results.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render `header` and `rows` as BOM-prefixed CSV text.
pub fn to_csv_text<H, R, F>(header: &[H], rows: R) -> Result<String, ExportError>
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<str>,
{
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.as_bytes().to_vec());

    wtr.write_record(header.iter().map(|h| h.as_ref()))?;
    for row in rows {
        wtr.write_record(row.iter().map(|v| v.as_ref()))?;
    }

    let data = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(data)?)
}

/// A named export ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: &'static str,
    pub contents: String,
}

impl ExportFile {
    /// Write into `dir`, creating it if needed. Returns the written path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(self.name);
        std::fs::write(&path, &self.contents).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

pub fn summary_export(summary: &Summary) -> Result<ExportFile, ExportError> {
    let rows = summary
        .metrics()
        .into_iter()
        .map(|(label, value, kind)| vec![label.to_string(), format_plain(value, kind)]);
    Ok(ExportFile {
        name: SUMMARY_FILE,
        contents: to_csv_text(&["Metric", "Value"], rows)?,
    })
}

pub fn distribution_export(tally: &ExitTally) -> Result<ExportFile, ExportError> {
    let rows = distribution(tally).into_iter().map(|slice| {
        vec![
            slice.class.label().to_string(),
            format_plain(slice.count as f64, MetricKind::Count),
            format_plain(slice.percent, MetricKind::Percent),
        ]
    });
    Ok(ExportFile {
        name: DISTRIBUTION_FILE,
        contents: to_csv_text(&["Exit Type", "Count", "Percent"], rows)?,
    })
}

pub fn daily_export(points: &[DailyPoint]) -> Result<ExportFile, ExportError> {
    let rows = points.iter().map(|p| {
        vec![
            p.date.clone(),
            format_plain(p.pnl_usd, MetricKind::Currency),
            format_plain(p.pnl_percent, MetricKind::Percent),
            format_plain(p.trades as f64, MetricKind::Count),
            format_plain(p.capital, MetricKind::Currency),
            format_plain(p.cumulative_pnl, MetricKind::Currency),
        ]
    });
    Ok(ExportFile {
        name: DAILY_FILE,
        contents: to_csv_text(
            &["Date", "PnL (USDT)", "PnL (%)", "Trades", "Capital (USDT)", "Cumulative PnL (USDT)"],
            rows,
        )?,
    })
}

/// The three report files: summary, exit distribution and daily results.
pub fn report_exports(
    summary: &Summary,
    tally: &ExitTally,
    points: &[DailyPoint],
) -> Result<[ExportFile; 3], ExportError> {
    Ok([
        summary_export(summary)?,
        distribution_export(tally)?,
        daily_export(points)?,
    ])
}
