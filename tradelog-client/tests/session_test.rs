//! Report session behaviour against an in-memory source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use proptest::prelude::*;
use tradelog_client::{BacktestSource, FetchError, LoadTicket, ReportBatch, ReportSession};
use tradelog_core::{BacktestDetail, BacktestListing, SideFilter, WindowConfig};

// ── Mock source ──────────────────────────────────────────────────────

#[derive(Default)]
struct MockSource {
    details: HashMap<String, String>,
    logs: HashMap<String, String>,
    unauthorized_logs: bool,
    calls: AtomicUsize,
}

impl MockSource {
    fn with_run(mut self, id: &str, detail: &str, log: &str) -> Self {
        self.details.insert(id.into(), detail.into());
        self.logs.insert(id.into(), log.into());
        self
    }
}

impl BacktestSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn list(&self) -> Result<Vec<BacktestListing>, FetchError> {
        let mut ids: Vec<_> = self.details.keys().cloned().collect();
        ids.sort();
        Ok(ids
            .into_iter()
            .map(|id| BacktestListing { id, ..Default::default() })
            .collect())
    }

    fn detail(&self, id: &str) -> Result<BacktestDetail, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self
            .details
            .get(id)
            .ok_or_else(|| FetchError::NotFound(id.into()))?;
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn trade_log(&self, id: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unauthorized_logs {
            return Err(FetchError::Unauthorized);
        }
        self.logs
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.into()))
    }
}

const LOG: &str = "exit_time,side,exit_reason,pnl_usdt\n2024-01-01,LONG,TP,12.5\n2024-01-02,SHORT,SL,-4.0";

fn source() -> MockSource {
    MockSource::default()
        .with_run(
            "1",
            r#"{"initial_capital": 1000, "final_capital": 1100, "start_date": "2024-01-01", "end_date": "2024-01-31"}"#,
            LOG,
        )
        .with_run("2", r#"{"initial_capital": 500}"#, "exit_time,pnl_usdt\n2024-02-01,3\n")
}

// ── Loading ──────────────────────────────────────────────────────────

#[test]
fn load_fetches_both_requests() {
    let source = source();
    let mut session = ReportSession::default();
    session.refresh_list(&source);
    assert_eq!(session.listing().len(), 2);

    assert!(session.load(&source, "1"));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(session.records().len(), 2);

    let view = session.view();
    assert_eq!(view.summary.net_pnl, 100.0);
    assert_eq!(view.summary.return_pct, 10.0);
    assert_eq!(view.outcome.tally.take_profit, 1);
    assert_eq!(view.outcome.tally.stop_loss, 1);
}

#[test]
fn trade_log_failure_keeps_detail() {
    let source = MockSource {
        unauthorized_logs: true,
        ..source()
    };
    let mut session = ReportSession::default();
    session.load(&source, "1");
    assert!(session.detail().is_some());
    assert!(session.detail_error().is_none());
    assert!(session.records().is_empty());
    assert!(matches!(session.trades_error(), Some(FetchError::Unauthorized)));
    // Summary still comes from the detail alone.
    assert_eq!(session.view().summary.net_pnl, 100.0);
}

#[test]
fn missing_detail_keeps_trades() {
    let mut source = source();
    source.details.remove("2");
    source.logs.insert("2".into(), LOG.into());
    let mut session = ReportSession::default();
    session.load(&source, "2");
    assert!(matches!(session.detail_error(), Some(FetchError::NotFound(_))));
    assert_eq!(session.records().len(), 2);
    assert_eq!(session.view().summary.total_trades, 2);
}

#[test]
fn worker_thread_results_respect_the_latest_selection() {
    let source = std::sync::Arc::new(source());
    let mut session = ReportSession::default();
    let (tx, rx) = mpsc::channel::<ReportBatch>();

    let tickets: Vec<LoadTicket> = vec![session.select("1"), session.select("2")];
    let handles: Vec<_> = tickets
        .into_iter()
        .map(|ticket| {
            let source = source.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let batch = ReportSession::fetch_report(source.as_ref(), ticket);
                tx.send(batch).unwrap();
            })
        })
        .collect();
    drop(tx);
    for h in handles {
        h.join().unwrap();
    }

    let applied: Vec<bool> = rx.iter().map(|batch| session.apply(batch)).collect();
    assert_eq!(applied.iter().filter(|a| **a).count(), 1);
    assert_eq!(session.selected(), Some("2"));
    assert_eq!(session.detail().unwrap().initial_capital, Some(500.0));
}

#[test]
fn filter_edits_reset_scroll() {
    let mut log = String::from("exit_time,side,exit_reason,pnl_usdt\n");
    for i in 0..400 {
        let side = if i % 4 == 0 { "SHORT" } else { "LONG" };
        log.push_str(&format!("2024-01-{:02},{side},TP,1\n", i % 28 + 1));
    }
    let source = MockSource::default().with_run("big", "{}", &log);
    let mut session = ReportSession::new(WindowConfig::default());
    session.load(&source, "big");
    session.rows_mut().scroll_to(36 * 300);
    assert!(session.rows().window().start > 0);

    let criteria = session.criteria().with_side(SideFilter::Short);
    session.set_criteria(criteria);
    assert_eq!(session.rows().scroll_offset(), 0);
    assert_eq!(session.rows().total(), 100);
    assert_eq!(session.rows().window().range(), 0..100);
}

#[test]
fn exports_write_three_files() {
    let source = source();
    let mut session = ReportSession::default();
    session.load(&source, "1");
    let dir = tempfile::tempdir().unwrap();
    for file in session.exports().unwrap() {
        let path = file.save(dir.path()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with('\u{feff}'));
    }
    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        ["backtest_summary.csv", "daily_results.csv", "tp_sl_distribution.csv"]
    );
}

// ── Stale guard ──────────────────────────────────────────────────────

proptest! {
    /// However many selections race, only the last ticket's batch applies.
    #[test]
    fn only_latest_ticket_applies(selections in 1usize..8, order in prop::collection::vec(any::<u8>(), 8)) {
        let mut session = ReportSession::default();
        let tickets: Vec<LoadTicket> = (0..selections).map(|i| session.select(i.to_string())).collect();

        let mut batches: Vec<(u8, LoadTicket)> = order.iter().copied().zip(tickets).collect();
        batches.sort_by_key(|(k, _)| *k);

        let mut applied = Vec::new();
        for (_, ticket) in batches {
            let id = ticket.id().to_string();
            let batch = ReportBatch { ticket, detail: Ok(BacktestDetail::default()), records: Ok(Vec::new()) };
            if session.apply(batch) {
                applied.push(id);
            }
        }
        prop_assert_eq!(applied, vec![(selections - 1).to_string()]);
    }
}
