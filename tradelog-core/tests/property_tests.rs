//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Decoding re-encoded comma-free records reproduces them
//! 2. Filtering is idempotent, and default criteria keep everything in order
//! 3. Summaries of nothing are exactly zero
//! 4. Row windows stay within bounds
//! 5. Number coercion is always finite

use proptest::prelude::*;
use tradelog_core::{
    apply_filter, compute_window, decode_csv, summarize, to_number, FilterCriteria, SideFilter,
    Summary, TradeRecord, WindowConfig,
};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_column() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn arb_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.:/+-]{0,12}"
}

/// Distinct column names plus rows of matching width.
fn arb_table() -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
    prop::collection::btree_set(arb_column(), 1..6)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|columns| {
            let width = columns.len();
            let row = prop::collection::vec(arb_value(), width)
                // A row of only empty fields is a blank line.
                .prop_filter("non-blank row", |r| r.iter().any(|v| !v.is_empty()));
            (Just(columns), prop::collection::vec(row, 0..20))
        })
}

fn arb_trade() -> impl Strategy<Value = TradeRecord> {
    (
        prop::option::of((2023i32..2025, 1u32..13, 1u32..29)),
        prop_oneof![Just("LONG"), Just("short"), Just("BUY"), Just("")],
        prop_oneof![Just("TP"), Just("STOP_LOSS"), Just("manual"), Just("")],
        -100.0..100.0_f64,
    )
        .prop_map(|(date, side, reason, pnl)| {
            let exit = date
                .map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
                .unwrap_or_default();
            TradeRecord::from_pairs([
                ("exit_time", exit),
                ("side", side.to_string()),
                ("exit_reason", reason.to_string()),
                ("pnl_usdt", format!("{pnl:.2}")),
            ])
        })
}

fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
    (
        prop::option::of((2023i32..2025, 1u32..13, 1u32..29)),
        prop::option::of((2023i32..2025, 1u32..13, 1u32..29)),
        any::<bool>(),
        any::<bool>(),
        prop_oneof![Just(SideFilter::All), Just(SideFilter::Long), Just(SideFilter::Short)],
    )
        .prop_map(|(start, end, tp, sl, side)| {
            let day = |(y, m, d): (i32, u32, u32)| chrono::NaiveDate::from_ymd_opt(y, m, d);
            FilterCriteria::default()
                .with_start_date(start.and_then(day))
                .with_end_date(end.and_then(day))
                .with_take_profit(tp)
                .with_stop_loss(sl)
                .with_side(side)
        })
}

fn encode(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut text = columns.join(",");
    for row in rows {
        text.push('\n');
        text.push_str(&row.join(","));
    }
    text
}

// ── 1. Decoder round-trip ────────────────────────────────────────────

proptest! {
    #[test]
    fn decode_round_trips_comma_free_rows((columns, rows) in arb_table()) {
        let records = decode_csv(&encode(&columns, &rows)).unwrap();
        prop_assert_eq!(records.len(), rows.len());
        for (record, row) in records.iter().zip(&rows) {
            prop_assert_eq!(record.columns(), columns.as_slice());
            prop_assert_eq!(record.values(), row.as_slice());
        }
    }
}

// ── 2. Filter idempotence ────────────────────────────────────────────

proptest! {
    #[test]
    fn filtering_twice_is_filtering_once(
        trades in prop::collection::vec(arb_trade(), 0..50),
        criteria in arb_criteria(),
    ) {
        let once = apply_filter(&trades, &criteria);
        let kept: Vec<TradeRecord> = once.rows(&trades).cloned().collect();
        let twice = apply_filter(&kept, &criteria);
        prop_assert_eq!(twice.len(), kept.len());
        prop_assert_eq!(twice.indices, (0..kept.len()).collect::<Vec<_>>());
        prop_assert_eq!(apply_filter(&trades, &criteria), once);
    }

    #[test]
    fn default_criteria_keep_everything(trades in prop::collection::vec(arb_trade(), 0..50)) {
        let outcome = apply_filter(&trades, &FilterCriteria::default());
        prop_assert_eq!(outcome.indices, (0..trades.len()).collect::<Vec<_>>());
        prop_assert_eq!(outcome.tally.total(), trades.len());
    }

    #[test]
    fn bounded_filter_excludes_undated(
        trades in prop::collection::vec(arb_trade(), 0..50),
        criteria in arb_criteria(),
    ) {
        let outcome = apply_filter(&trades, &criteria);
        if criteria.is_date_bounded() {
            for record in outcome.rows(&trades) {
                prop_assert!(!record.get("exit_time").unwrap_or("").is_empty());
            }
        }
    }
}

// ── 3. Aggregator zero-safety ────────────────────────────────────────

#[test]
fn empty_summary_is_zero() {
    let records: Vec<TradeRecord> = Vec::new();
    let summary = summarize(None, &records);
    assert_eq!(summary, Summary::default());
    for (label, value, _) in summary.metrics() {
        assert_eq!(value, 0.0, "{label}");
    }
}

proptest! {
    #[test]
    fn summary_fields_are_finite(trades in prop::collection::vec(arb_trade(), 0..50)) {
        let summary = summarize(None, &trades);
        for (label, value, _) in summary.metrics() {
            prop_assert!(value.is_finite(), "{} = {}", label, value);
        }
    }
}

// ── 4. Window bounds ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn window_stays_in_bounds(
        total in 0usize..5000,
        offset in any::<usize>(),
        row_height in 0usize..64,
        viewport_height in 0usize..2000,
        buffer in 0usize..50,
    ) {
        let config = WindowConfig { row_height, viewport_height, buffer, threshold: 200 };
        let w = compute_window(total, &config, offset);
        prop_assert!(w.start <= w.end);
        prop_assert!(w.end <= total);
        if total <= config.threshold {
            prop_assert_eq!((w.start, w.end), (0, total));
        }
    }
}

// ── 5. Coercion safety ───────────────────────────────────────────────

proptest! {
    #[test]
    fn to_number_is_finite(s in any::<String>()) {
        prop_assert!(to_number(Some(&s)).is_finite());
    }

    #[test]
    fn to_number_of_numeric_text(s in "[+-]?[0-9]{0,400}(\\.[0-9]{0,20})?([eE][+-]?[0-9]{1,4})?") {
        prop_assert!(to_number(Some(&s)).is_finite());
    }
}

#[test]
fn to_number_edge_inputs() {
    for s in ["", "abc", "1e400", "NaN", "inf", "-infinity", "--1", "1,000"] {
        assert_eq!(to_number(Some(s)), 0.0, "{s}");
    }
    assert_eq!(to_number(None), 0.0);
}
