//! tradelog CLI: list backtests, print report summaries, export report CSVs.
//!
//! Commands:
//! - `list` — backtest runs from the configured source
//! - `summary` — reconciled summary and exit tally for one run or a local CSV
//! - `export` — write the summary, distribution and daily CSVs

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use tradelog_client::{BacktestSource, ClientConfig, FetchError, ReportSession};
use tradelog_core::{
    format_display, to_date, BacktestDetail, BacktestListing, DistributionSlice, ExitTally,
    FilterCriteria, MetricKind, SideFilter, Summary, WindowConfig,
};

#[derive(Parser)]
#[command(name = "tradelog", about = "Backtest trade-log analytics", version)]
struct Cli {
    /// Config file. Defaults to <config_dir>/tradelog/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List backtest runs from the configured source.
    List,
    /// Print the summary and exit tally of one run.
    Summary {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write backtest_summary.csv, tp_sl_distribution.csv and daily_results.csv.
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output directory. Defaults to `output_dir` from the config.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Backtest id on the configured source.
    #[arg(long, conflicts_with = "csv")]
    id: Option<String>,

    /// Local trade-log CSV instead of a source run.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Local detail JSON to pair with --csv.
    #[arg(long, requires = "csv")]
    detail: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// First exit day to include (YYYY-MM-DD). Defaults to the run's start.
    #[arg(long)]
    start: Option<String>,

    /// Last exit day to include (YYYY-MM-DD). Defaults to the run's end.
    #[arg(long)]
    end: Option<String>,

    /// ALL, LONG or SHORT.
    #[arg(long, value_parser = parse_side)]
    side: Option<SideFilter>,

    /// Exclude take-profit exits.
    #[arg(long, default_value_t = false)]
    no_tp: bool,

    /// Exclude stop-loss exits.
    #[arg(long, default_value_t = false)]
    no_sl: bool,
}

fn parse_side(raw: &str) -> Result<SideFilter, String> {
    SideFilter::parse(raw).ok_or_else(|| format!("expected ALL, LONG or SHORT, got {raw:?}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    debug!(?config.api_url, ?config.data_dir, "configuration loaded");

    match cli.command {
        Commands::List => run_list(&config),
        Commands::Summary { input, filter, json } => {
            let session = load_report(&config, &input, &filter)?;
            print_summary(&session, json)
        }
        Commands::Export { input, filter, out } => {
            let session = load_report(&config, &input, &filter)?;
            let out = out.unwrap_or_else(|| config.output_dir.clone());
            run_export(&session, &out)
        }
    }
}

fn run_list(config: &ClientConfig) -> Result<()> {
    let source = config.source()?;
    let listing = source
        .list()
        .with_context(|| format!("failed to list backtests from {}", source.name()))?;

    if listing.is_empty() {
        println!("No backtests.");
        return Ok(());
    }

    println!(
        "{:>8}  {:<12} {:<6} {:<12} {:<12}",
        "ID", "Symbol", "TF", "Start", "End"
    );
    println!("{}", "-".repeat(54));
    for run in &listing {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        let day = |v: &Option<String>| match to_date(v.as_deref()) {
            Some(d) => d.to_string(),
            None => text(v),
        };
        println!(
            "{:>8}  {:<12} {:<6} {:<12} {:<12}",
            run.id,
            text(&run.symbol),
            text(&run.interval),
            day(&run.start_date),
            day(&run.end_date)
        );
    }
    Ok(())
}

// ─── Loading ────────────────────────────────────────────────────────

/// A trade-log CSV and optional detail JSON on disk, served as one run.
struct LocalFiles {
    csv: PathBuf,
    detail: Option<PathBuf>,
}

impl LocalFiles {
    fn id(&self) -> String {
        self.csv
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "local".into())
    }
}

fn read(path: &Path) -> Result<String, FetchError> {
    std::fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl BacktestSource for LocalFiles {
    fn name(&self) -> &str {
        "file"
    }

    fn list(&self) -> Result<Vec<BacktestListing>, FetchError> {
        Ok(vec![BacktestListing {
            id: self.id(),
            ..Default::default()
        }])
    }

    fn detail(&self, _id: &str) -> Result<BacktestDetail, FetchError> {
        let Some(path) = &self.detail else {
            return Err(FetchError::NotFound("no detail file given".into()));
        };
        serde_json::from_str(&read(path)?)
            .map_err(|e| FetchError::Decode(format!("{}: {e}", path.display())))
    }

    fn trade_log(&self, _id: &str) -> Result<String, FetchError> {
        read(&self.csv)
    }
}

/// Load one report and apply the filter flags on top of the run's defaults.
fn load_report(config: &ClientConfig, input: &InputArgs, filter: &FilterArgs) -> Result<ReportSession> {
    let mut session = ReportSession::new(WindowConfig::default());

    let (source, id, detail_expected): (Box<dyn BacktestSource>, String, bool) =
        match (&input.id, &input.csv) {
            (Some(id), _) => (config.source()?, id.clone(), true),
            (None, Some(csv)) => {
                let files = LocalFiles {
                    csv: csv.clone(),
                    detail: input.detail.clone(),
                };
                let id = files.id();
                (Box::new(files), id, input.detail.is_some())
            }
            (None, None) => bail!("one of --id or --csv is required"),
        };

    session.load(source.as_ref(), id.as_str());

    match (session.detail_error(), session.trades_error()) {
        (Some(detail), Some(trades)) if detail_expected => {
            bail!("run {id}: detail failed ({detail}); trade log failed ({trades})")
        }
        (_, Some(trades)) if !detail_expected => bail!("run {id}: trade log failed: {trades}"),
        (_, Some(trades)) => {
            warn!(%id, error = %trades, "trade log unavailable, summarizing detail only");
        }
        (Some(detail), None) if detail_expected => {
            warn!(%id, error = %detail, "detail unavailable, summarizing trades only");
        }
        _ => {}
    }

    let criteria = filter.criteria(session.default_criteria())?;
    session.set_criteria(criteria);
    Ok(session)
}

impl FilterArgs {
    fn criteria(&self, base: FilterCriteria) -> Result<FilterCriteria> {
        let mut criteria = base
            .with_take_profit(!self.no_tp)
            .with_stop_loss(!self.no_sl);
        if let Some(start) = &self.start {
            criteria = criteria.with_start_date(parse_day("--start", start)?);
        }
        if let Some(end) = &self.end {
            criteria = criteria.with_end_date(parse_day("--end", end)?);
        }
        if let Some(side) = self.side {
            criteria = criteria.with_side(side);
        }
        Ok(criteria)
    }
}

/// An empty value clears the bound.
fn parse_day(flag: &str, raw: &str) -> Result<Option<NaiveDate>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match to_date(Some(raw)) {
        Some(d) => Ok(Some(d)),
        None => bail!("{flag}: {raw:?} is not a date (expected YYYY-MM-DD)"),
    }
}

// ─── Output ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SummaryReport<'a> {
    id: Option<&'a str>,
    criteria: &'a FilterCriteria,
    trades: usize,
    summary: &'a Summary,
    tally: &'a ExitTally,
    distribution: &'a [DistributionSlice; 3],
}

fn print_summary(session: &ReportSession, json: bool) -> Result<()> {
    let view = session.view();

    if json {
        let report = SummaryReport {
            id: session.selected(),
            criteria: session.criteria(),
            trades: view.outcome.len(),
            summary: &view.summary,
            tally: &view.outcome.tally,
            distribution: &view.distribution,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("=== Backtest {} ===", session.selected().unwrap_or("-"));
    if let Some(d) = session.detail() {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        println!("Symbol:   {} {}", text(&d.symbol), text(&d.interval));
        println!("Period:   {} to {}", text(&d.start_date), text(&d.end_date));
    }
    println!(
        "Trades:   {} of {} after filter",
        view.outcome.len(),
        session.records().len()
    );
    println!();
    for (label, value, kind) in view.summary.metrics() {
        println!("{:<26} {:>16}", label, format_display(value, kind));
    }
    println!();
    println!("--- Exits ---");
    for slice in &view.distribution {
        println!(
            "{:<12} {:>6}  {:>7}%",
            slice.class.label(),
            slice.count,
            format_display(slice.percent, MetricKind::Percent)
        );
    }
    println!();
    Ok(())
}

fn run_export(session: &ReportSession, out: &Path) -> Result<()> {
    let files = session.exports().context("failed to render export CSVs")?;
    for file in &files {
        let path = file.save(out)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
