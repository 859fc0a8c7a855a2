//! End-to-end pipeline scenarios: decode → filter → summarize → bind → export.

use chrono::NaiveDate;
use tradelog_core::{
    apply_filter, bind_daily, decode_csv, distribution, report_exports, summarize, BacktestDetail,
    DailyResult, ExitTally, FilterCriteria, SideFilter, SummarySource, VirtualRows, WindowConfig,
};

const TWO_TRADES: &str =
    "exit_time,side,exit_reason,pnl_usdt\n2024-01-01,LONG,TP,12.5\n2024-01-02,SHORT,SL,-4.0";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn long_side_filter_with_whole_window_tally() {
    let records = decode_csv(TWO_TRADES).unwrap();
    assert_eq!(records.len(), 2);

    let criteria = FilterCriteria::default().with_side(SideFilter::Long);
    let outcome = apply_filter(&records, &criteria);
    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.row(&records, 0).unwrap().get("exit_time"), Some("2024-01-01"));
    assert_eq!(
        outcome.tally,
        ExitTally { take_profit: 1, stop_loss: 1, other: 0 }
    );
}

#[test]
fn disabled_reason_still_counts_in_tally() {
    let records = decode_csv(TWO_TRADES).unwrap();
    let criteria = FilterCriteria::default().with_stop_loss(false);
    let outcome = apply_filter(&records, &criteria);
    assert_eq!(outcome.indices, vec![0]);
    assert_eq!(outcome.tally.stop_loss, 1);
}

#[test]
fn date_window_is_inclusive() {
    let records = decode_csv(TWO_TRADES).unwrap();
    let criteria = FilterCriteria::for_range(Some(day(2024, 1, 2)), Some(day(2024, 1, 2)));
    let outcome = apply_filter(&records, &criteria);
    assert_eq!(outcome.indices, vec![1]);
    assert_eq!(outcome.tally.total(), 1);
}

#[test]
fn detail_without_records() {
    let detail: BacktestDetail = serde_json::from_str(
        r#"{"initial_capital": 1000, "final_capital": 1100, "total_trades": 0}"#,
    )
    .unwrap();
    let summary = summarize(Some(&detail), std::iter::empty());
    assert_eq!(summary.source, SummarySource::Detail);
    assert_eq!(summary.total_trades, 0);
    assert_eq!(summary.net_pnl, 100.0);
    assert_eq!(summary.return_pct, 10.0);
    assert_eq!(summary.fee_to_pnl_ratio, 0.0);
}

#[test]
fn daily_series_carries_capital_forward() {
    let days: Vec<DailyResult> = serde_json::from_str(
        r#"[{"date": "d1", "capital": 1000}, {"date": "d2", "capital": 1050}, {"date": "d3"}]"#,
    )
    .unwrap();
    let points = bind_daily(1000.0, &days);
    let pnl: Vec<f64> = points.iter().map(|p| p.pnl_usd).collect();
    assert_eq!(pnl, vec![0.0, 50.0, 0.0]);
    assert!(points.iter().all(|p| !p.pnl_percent.is_nan()));
}

#[test]
fn full_report_from_text() {
    let text = "\
Exit_Time,Side,Exit_Reason,PnL_USDT,Fee,Capital_After
2024-03-01 09:30:00,LONG,TAKE_PROFIT,25,0.5,1025
2024-03-01 14:00:00,SHORT,STOP_LOSS,-10,0.5,1015
,LONG,manual,3,0.1,1018
2024-03-03T08:00:00Z,long,TP,7,0.4,1025
";
    let records = decode_csv(text).unwrap();
    assert_eq!(records.len(), 4);

    let criteria = FilterCriteria::for_range(Some(day(2024, 3, 1)), Some(day(2024, 3, 31)));
    let outcome = apply_filter(&records, &criteria);
    // The undated row is excluded by the bounded window.
    assert_eq!(outcome.indices, vec![0, 1, 3]);

    let summary = summarize(None, outcome.rows(&records));
    assert_eq!(summary.total_trades, 3);
    assert_eq!(summary.winning_trades, 2);
    assert_eq!(summary.net_pnl, 22.0);
    assert_eq!(summary.ending_capital, 1025.0);
    assert_eq!(summary.starting_capital, 1003.0);
    assert!((summary.avg_trades_per_day - 1.0).abs() < 1e-9);

    let files = report_exports(&summary, &outcome.tally, &bind_daily(1000.0, &[])).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        ["backtest_summary.csv", "tp_sl_distribution.csv", "daily_results.csv"]
    );
    assert!(files.iter().all(|f| f.contents.starts_with('\u{feff}')));

    let slices = distribution(&outcome.tally);
    assert_eq!(slices[0].count, 2);
    assert_eq!(slices[1].count, 1);
}

#[test]
fn window_resets_on_new_filter() {
    let mut text = String::from("exit_time,side,exit_reason,pnl_usdt\n");
    for i in 0..1000 {
        let side = if i % 2 == 0 { "LONG" } else { "SHORT" };
        text.push_str(&format!("2024-01-01,{side},TP,{i}\n"));
    }
    let records = decode_csv(&text).unwrap();

    let mut rows = VirtualRows::new(WindowConfig::default());
    rows.reset(apply_filter(&records, &FilterCriteria::default()).len());
    rows.scroll_to(36 * 900);
    assert!(rows.window().start > 0);

    let shorts = apply_filter(&records, &FilterCriteria::default().with_side(SideFilter::Short));
    rows.reset(shorts.len());
    assert_eq!(rows.scroll_offset(), 0);
    assert_eq!(rows.window().start, 0);
    assert!(rows.window().end <= shorts.len());
}
