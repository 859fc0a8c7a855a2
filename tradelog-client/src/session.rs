//! Report session: page state for one selected backtest.
//!
//! Selecting a run bumps a generation counter and hands out a
//! [`LoadTicket`]. The detail and trade log are fetched together into a
//! [`ReportBatch`]; [`ReportSession::apply`] drops batches whose ticket is no
//! longer current and otherwise swaps in detail, records, errors, criteria
//! and scroll state in one step. In-flight requests are never aborted.
//!
//! Filtering, summary and chart data are recomputed from state on demand by
//! [`ReportSession::view`].

use tracing::{debug, info, warn};
use tradelog_core::{
    apply_filter, bind_daily, decode_csv, distribution, report_exports, summarize, BacktestDetail,
    BacktestListing, DailyPoint, DistributionSlice, ExportError, ExportFile, FilterCriteria,
    FilterOutcome, Summary, TradeRecord, VirtualRows, WindowConfig,
};

use crate::error::FetchError;
use crate::source::BacktestSource;

/// Identifies one load request. Only the ticket from the latest
/// [`ReportSession::select`] is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    id: String,
}

impl LoadTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Results of the detail and trade-log requests for one ticket. Each
/// request succeeds or fails on its own.
#[derive(Debug)]
pub struct ReportBatch {
    pub ticket: LoadTicket,
    pub detail: Result<BacktestDetail, FetchError>,
    pub records: Result<Vec<TradeRecord>, FetchError>,
}

/// Everything the report screens draw, derived from session state.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub outcome: FilterOutcome,
    pub summary: Summary,
    pub daily: Vec<DailyPoint>,
    pub distribution: [DistributionSlice; 3],
}

#[derive(Debug, Default)]
pub struct ReportSession {
    listing: Vec<BacktestListing>,
    list_error: Option<FetchError>,
    selected: Option<String>,
    generation: u64,
    loading: bool,
    detail: Option<BacktestDetail>,
    detail_error: Option<FetchError>,
    records: Vec<TradeRecord>,
    trades_error: Option<FetchError>,
    criteria: FilterCriteria,
    rows: VirtualRows,
}

impl ReportSession {
    pub fn new(window: WindowConfig) -> Self {
        Self {
            rows: VirtualRows::new(window),
            ..Self::default()
        }
    }

    // ─── Listing ────────────────────────────────────────────────────

    pub fn listing(&self) -> &[BacktestListing] {
        &self.listing
    }

    /// Last listing failure; cleared by the next successful refresh.
    pub fn list_error(&self) -> Option<&FetchError> {
        self.list_error.as_ref()
    }

    pub fn refresh_list(&mut self, source: &dyn BacktestSource) {
        self.apply_list(source.list());
    }

    /// Record a listing result. A failure keeps the previous listing.
    pub fn apply_list(&mut self, result: Result<Vec<BacktestListing>, FetchError>) {
        match result {
            Ok(listing) => {
                info!(runs = listing.len(), "backtest listing loaded");
                self.listing = listing;
                self.list_error = None;
            }
            Err(e) => {
                warn!(error = %e, "backtest listing failed");
                self.list_error = Some(e);
            }
        }
    }

    // ─── Loading ────────────────────────────────────────────────────

    /// Select a run. Any batch from an earlier selection becomes stale.
    pub fn select(&mut self, id: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        let id = id.into();
        self.selected = Some(id.clone());
        self.loading = true;
        LoadTicket {
            generation: self.generation,
            id,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Fetch detail and trade log concurrently and decode the log.
    ///
    /// Needs no session access, so it can run on a worker thread.
    pub fn fetch_report(source: &dyn BacktestSource, ticket: LoadTicket) -> ReportBatch {
        let id = ticket.id.as_str();
        let (detail, records) = rayon::join(
            || source.detail(id),
            || {
                source
                    .trade_log(id)
                    .and_then(|text| decode_csv(&text).map_err(FetchError::from))
            },
        );
        if let Err(e) = &detail {
            warn!(id, error = %e, "backtest detail failed");
        }
        if let Err(e) = &records {
            warn!(id, error = %e, "trade log failed");
        }
        ReportBatch {
            ticket,
            detail,
            records,
        }
    }

    /// Apply a batch atomically. Returns `false` if the batch was stale.
    pub fn apply(&mut self, batch: ReportBatch) -> bool {
        if !self.is_current(&batch.ticket) {
            debug!(
                id = %batch.ticket.id,
                generation = batch.ticket.generation,
                current = self.generation,
                "discarding stale report"
            );
            return false;
        }

        let (detail, detail_error) = split(batch.detail);
        let (records, trades_error) = split(batch.records);

        self.detail = detail;
        self.detail_error = detail_error;
        self.records = records.unwrap_or_default();
        self.trades_error = trades_error;
        self.criteria = self.default_criteria();
        self.loading = false;
        self.reset_rows();

        info!(
            id = %batch.ticket.id,
            records = self.records.len(),
            detail = self.detail.is_some(),
            "report loaded"
        );
        true
    }

    /// Fetch and apply in one call, for front ends without a worker.
    pub fn load(&mut self, source: &dyn BacktestSource, id: impl Into<String>) -> bool {
        let ticket = self.select(id);
        let batch = Self::fetch_report(source, ticket);
        self.apply(batch)
    }

    /// Criteria a fresh report starts with: the run's own date range.
    pub fn default_criteria(&self) -> FilterCriteria {
        match &self.detail {
            Some(d) => FilterCriteria::for_range(d.start(), d.end()),
            None => FilterCriteria::default(),
        }
    }

    // ─── State ──────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_listing(&self) -> Option<&BacktestListing> {
        let id = self.selected.as_deref()?;
        self.listing.iter().find(|l| l.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn detail(&self) -> Option<&BacktestDetail> {
        self.detail.as_ref()
    }

    pub fn detail_error(&self) -> Option<&FetchError> {
        self.detail_error.as_ref()
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn trades_error(&self) -> Option<&FetchError> {
        self.trades_error.as_ref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Replace the criteria wholesale and scroll back to the top.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.reset_rows();
    }

    pub fn rows(&self) -> &VirtualRows {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut VirtualRows {
        &mut self.rows
    }

    fn reset_rows(&mut self) {
        let visible = apply_filter(&self.records, &self.criteria).len();
        self.rows.reset(visible);
    }

    // ─── Derived ────────────────────────────────────────────────────

    pub fn view(&self) -> ReportView {
        let outcome = apply_filter(&self.records, &self.criteria);
        let summary = summarize(self.detail.as_ref(), outcome.rows(&self.records));

        let daily = match &self.detail {
            Some(d) => {
                // A zero initial capital means "not computed", as in the summary.
                let seed = d
                    .initial_capital
                    .filter(|v| *v != 0.0)
                    .unwrap_or(summary.starting_capital);
                bind_daily(seed, &d.daily_results)
            }
            None => Vec::new(),
        };
        let distribution = distribution(&outcome.tally);

        ReportView {
            outcome,
            summary,
            daily,
            distribution,
        }
    }

    /// The three report files for the current view.
    pub fn exports(&self) -> Result<[ExportFile; 3], ExportError> {
        let view = self.view();
        report_exports(&view.summary, &view.outcome.tally, &view.daily)
    }
}

fn split<T>(result: Result<T, FetchError>) -> (Option<T>, Option<FetchError>) {
    match result {
        Ok(v) => (Some(v), None),
        Err(e) => (None, Some(e)),
    }
}
