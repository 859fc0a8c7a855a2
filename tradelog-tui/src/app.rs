//! Application state, single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;
use tracing::warn;

use tradelog_client::{FetchError, ReportBatch, ReportSession, ReportView};
use tradelog_core::{to_date, FilterCriteria, WindowConfig};

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Runs,
    Summary,
    Trades,
    Charts,
    Help,
}

impl Panel {
    const COUNT: usize = 5;

    pub fn index(self) -> usize {
        match self {
            Panel::Runs => 0,
            Panel::Summary => 1,
            Panel::Trades => 2,
            Panel::Charts => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Runs),
            1 => Some(Panel::Summary),
            2 => Some(Panel::Trades),
            3 => Some(Panel::Charts),
            4 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Runs => "Runs",
            Panel::Summary => "Summary",
            Panel::Trades => "Trades",
            Panel::Charts => "Charts",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Runs)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Runs)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Auth,
    Data,
    Export,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Auth => "AUTH",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Export => "EXP",
            ErrorCategory::Other => "ERR",
        }
    }

    pub fn of(error: &FetchError) -> Self {
        match error {
            FetchError::Unauthorized => ErrorCategory::Auth,
            FetchError::Decode(_) | FetchError::TradeLog(_) => ErrorCategory::Data,
            FetchError::NotFound(_) | FetchError::Io { .. } => ErrorCategory::Other,
            FetchError::Status { .. } | FetchError::Network(_) => ErrorCategory::Network,
        }
    }
}

/// What the Charts panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    CumulativePnl,
    DailyPnl,
    DailyTrades,
    Distribution,
}

impl ChartMode {
    pub fn label(self) -> &'static str {
        match self {
            ChartMode::CumulativePnl => "Cumulative PnL",
            ChartMode::DailyPnl => "Daily PnL",
            ChartMode::DailyTrades => "Trades per Day",
            ChartMode::Distribution => "Exit Distribution",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartMode::CumulativePnl => ChartMode::DailyPnl,
            ChartMode::DailyPnl => ChartMode::DailyTrades,
            ChartMode::DailyTrades => ChartMode::Distribution,
            ChartMode::Distribution => ChartMode::CumulativePnl,
        }
    }
}

/// Row of the filter editor that has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    StartDate,
    EndDate,
    TakeProfit,
    StopLoss,
    Side,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::StartDate,
        FilterField::EndDate,
        FilterField::TakeProfit,
        FilterField::StopLoss,
        FilterField::Side,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::StartDate => "Start date",
            FilterField::EndDate => "End date",
            FilterField::TakeProfit => "Take profit",
            FilterField::StopLoss => "Stop loss",
            FilterField::Side => "Side",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn is_date(self) -> bool {
        matches!(self, FilterField::StartDate | FilterField::EndDate)
    }
}

/// Draft criteria being edited in the filter overlay. Nothing reaches the
/// session until the draft is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEditor {
    pub focus: FilterField,
    pub start_input: String,
    pub end_input: String,
    pub draft: FilterCriteria,
}

impl FilterEditor {
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let text = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        Self {
            focus: FilterField::default(),
            start_input: text(criteria.start_date),
            end_input: text(criteria.end_date),
            draft: *criteria,
        }
    }

    pub fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            FilterField::StartDate => Some(&mut self.start_input),
            FilterField::EndDate => Some(&mut self.end_input),
            _ => None,
        }
    }

    /// Toggle or cycle the focused non-date field.
    pub fn toggle(&mut self) {
        self.draft = match self.focus {
            FilterField::TakeProfit => self.draft.with_take_profit(!self.draft.include_take_profit),
            FilterField::StopLoss => self.draft.with_stop_loss(!self.draft.include_stop_loss),
            FilterField::Side => self.draft.with_side(self.draft.side.next()),
            FilterField::StartDate | FilterField::EndDate => self.draft,
        };
    }

    /// Parse the date inputs into the draft. Blank clears a bound.
    pub fn commit(&self) -> Result<FilterCriteria, String> {
        let parse = |label: &str, raw: &str| {
            let raw = raw.trim();
            if raw.is_empty() {
                Ok(None)
            } else {
                to_date(Some(raw))
                    .map(Some)
                    .ok_or_else(|| format!("{label}: {raw:?} is not a date"))
            }
        };
        let start = parse("Start date", &self.start_input)?;
        let end = parse("End date", &self.end_input)?;
        Ok(self.draft.with_start_date(start).with_end_date(end))
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    Filter(FilterEditor),
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Report
    pub session: ReportSession,
    /// Derived from the session; rebuilt whenever records or criteria change.
    pub view: ReportView,
    pub runs_cursor: usize,
    pub trades_cursor: usize,
    pub chart_mode: ChartMode,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    pub source_name: String,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,

    pub output_dir: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        source_name: impl Into<String>,
        output_dir: PathBuf,
    ) -> Self {
        let session = ReportSession::new(trade_window());
        let view = session.view();
        Self {
            active_panel: Panel::Runs,
            running: true,
            session,
            view,
            runs_cursor: 0,
            trades_cursor: 0,
            chart_mode: ChartMode::default(),
            worker_tx,
            worker_rx,
            source_name: source_name.into(),
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            output_dir,
        }
    }

    // ─── Worker ─────────────────────────────────────────────────────

    fn send(&mut self, cmd: WorkerCommand) {
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(
                ErrorCategory::Other,
                "Background worker is not running".into(),
                String::new(),
            );
        }
    }

    pub fn request_list(&mut self) {
        self.set_status(format!("Loading runs from {}...", self.source_name));
        self.send(WorkerCommand::FetchList);
    }

    /// Load the run under the runs cursor.
    pub fn request_selected_report(&mut self) {
        let Some(listing) = self.session.listing().get(self.runs_cursor) else {
            self.set_warning("No run selected");
            return;
        };
        let (id, label) = (listing.id.clone(), listing.label());
        let ticket = self.session.select(id);
        self.set_status(format!("Loading {label}..."));
        self.send(WorkerCommand::LoadReport(ticket));
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Listing(result) => {
                let failed = result.as_ref().err().map(|e| (ErrorCategory::of(e), e.to_string()));
                self.session.apply_list(result);
                match failed {
                    Some((category, message)) => {
                        self.push_error(category, message, "run listing".into())
                    }
                    None => {
                        let n = self.session.listing().len();
                        self.runs_cursor = self.runs_cursor.min(n.saturating_sub(1));
                        self.set_status(format!("{n} runs"));
                    }
                }
            }
            WorkerResponse::Report(batch) => self.apply_report(batch),
        }
    }

    fn apply_report(&mut self, batch: ReportBatch) {
        let id = batch.ticket.id().to_string();
        if !self.session.apply(batch) {
            return;
        }
        self.refresh_view();
        self.trades_cursor = 0;

        let errors: Vec<(ErrorCategory, String, &str)> = [
            (self.session.detail_error(), "detail"),
            (self.session.trades_error(), "trade log"),
        ]
        .into_iter()
        .filter_map(|(e, what)| e.map(|e| (ErrorCategory::of(e), e.to_string(), what)))
        .collect();

        if errors.is_empty() {
            self.set_status(format!(
                "Run #{id}: {} trades, {} after filter",
                self.session.records().len(),
                self.view.outcome.len()
            ));
        }
        for (category, message, what) in errors {
            self.push_error(category, message, format!("run #{id} {what}"));
        }
    }

    // ─── Filter ─────────────────────────────────────────────────────

    /// Replace the criteria; the trade table scrolls back to the top.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.session.set_criteria(criteria);
        self.refresh_view();
        self.trades_cursor = 0;
    }

    pub fn refresh_view(&mut self) {
        self.view = self.session.view();
    }

    // ─── Export ─────────────────────────────────────────────────────

    /// Write the three report files to the output directory.
    pub fn export(&mut self) {
        let files = match self.session.exports() {
            Ok(files) => files,
            Err(e) => {
                self.push_error(ErrorCategory::Export, e.to_string(), "export".into());
                return;
            }
        };
        for file in &files {
            if let Err(e) = file.save(&self.output_dir) {
                self.push_error(ErrorCategory::Export, e.to_string(), file.name.to_string());
                return;
            }
        }
        self.set_status(format!(
            "Exported {} files to {}",
            files.len(),
            self.output_dir.display()
        ));
    }

    // ─── Status ─────────────────────────────────────────────────────

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        warn!(category = category.label(), %context, "{message}");
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

/// One terminal line per trade row; the viewport is resized on draw.
fn trade_window() -> WindowConfig {
    WindowConfig {
        row_height: 1,
        viewport_height: 20,
        ..WindowConfig::default()
    }
}
