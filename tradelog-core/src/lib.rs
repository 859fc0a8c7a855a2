//! Backtest trade-log analytics.
//!
//! Pure, synchronous pipeline from a raw trade-log CSV to display data:
//! - Schema-less trade records with alias-based field resolution
//! - CSV decoding (no quoting support, by format contract)
//! - Fail-safe number/date coercion and fixed-locale formatting
//! - Trade filtering with a single-pass exit-reason tally
//! - Summary aggregation reconciling server detail with trade rows
//! - Daily chart series and exit distribution
//! - Row windowing for large trade tables
//! - BOM-prefixed CSV export of derived tables
//!
//! Nothing in this crate performs I/O except [`export::ExportFile::save`].

pub mod chart;
pub mod coerce;
pub mod decode;
pub mod detail;
pub mod export;
pub mod fields;
pub mod filter;
pub mod format;
pub mod record;
pub mod summary;
pub mod window;

pub use chart::{bind_daily, distribution, DailyPoint, DistributionSlice};
pub use coerce::{parse_number, to_date, to_number};
pub use decode::{decode_csv, DecodeError};
pub use detail::{BacktestDetail, BacktestListing, DailyResult};
pub use export::{report_exports, to_csv_text, ExportError, ExportFile};
pub use fields::{resolve, resolve_or, Field, TradeView};
pub use filter::{apply_filter, ExitClass, ExitTally, FilterCriteria, FilterOutcome, SideFilter, TradeSide};
pub use format::{format_display, format_plain, MetricKind};
pub use record::{Header, TradeRecord};
pub use summary::{summarize, RecordTotals, Summary, SummarySource};
pub use window::{compute_window, RowWindow, VirtualRows, WindowConfig};
