//! Criterion benchmarks for the trade-log pipeline on large logs.
//!
//! Benchmarks:
//! 1. CSV decoding
//! 2. Filter pass with tally
//! 3. Summary aggregation over filtered rows
//! 4. Row-window scrolling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradelog_core::{
    apply_filter, compute_window, decode_csv, summarize, FilterCriteria, SideFilter, TradeRecord,
    WindowConfig,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_log(n: usize) -> String {
    let base = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut text = String::from(
        "entry_time,exit_time,symbol,side,exit_reason,entry_price,exit_price,size,pnl_usdt,pnl_percent,entry_fee,exit_fee,capital_after\n",
    );
    let mut capital = 10_000.0;
    for i in 0..n {
        let date = base + chrono::Duration::days((i / 20) as i64);
        let side = if i % 3 == 0 { "SHORT" } else { "LONG" };
        let reason = match i % 5 {
            0 | 1 => "TAKE_PROFIT",
            2 | 3 => "STOP_LOSS",
            _ => "SIGNAL",
        };
        let pnl = (i as f64 * 0.7).sin() * 25.0;
        capital += pnl;
        text.push_str(&format!(
            "{date} 00:00:00,{date} 04:00:00,BTCUSDT,{side},{reason},42000.5,42100.25,0.01,{pnl:.4},{:.4},0.0210,0.0211,{capital:.2}\n",
            pnl / 4.2
        ));
    }
    text
}

fn make_records(n: usize) -> Vec<TradeRecord> {
    decode_csv(&make_log(n)).unwrap()
}

// ── 1. Decode ────────────────────────────────────────────────────────

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_csv");
    for &n in &[1_000, 10_000, 50_000] {
        let text = make_log(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| decode_csv(black_box(text)).unwrap())
        });
    }
    group.finish();
}

// ── 2. Filter ────────────────────────────────────────────────────────

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_filter");
    let start = chrono::NaiveDate::from_ymd_opt(2023, 2, 1);
    let end = chrono::NaiveDate::from_ymd_opt(2023, 6, 30);
    let criteria = FilterCriteria::for_range(start, end)
        .with_stop_loss(false)
        .with_side(SideFilter::Long);

    for &n in &[1_000, 10_000, 50_000] {
        let records = make_records(n);
        group.bench_with_input(BenchmarkId::new("permissive", n), &records, |b, records| {
            b.iter(|| apply_filter(black_box(records), &FilterCriteria::default()))
        });
        group.bench_with_input(BenchmarkId::new("bounded", n), &records, |b, records| {
            b.iter(|| apply_filter(black_box(records), &criteria))
        });
    }
    group.finish();
}

// ── 3. Summary ───────────────────────────────────────────────────────

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for &n in &[1_000, 10_000, 50_000] {
        let records = make_records(n);
        let outcome = apply_filter(&records, &FilterCriteria::default());
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| summarize(None, outcome.rows(black_box(&records))))
        });
    }
    group.finish();
}

// ── 4. Window ────────────────────────────────────────────────────────

fn bench_window(c: &mut Criterion) {
    let config = WindowConfig::default();
    c.bench_function("compute_window_sweep_50k", |b| {
        b.iter(|| {
            let mut rendered = 0usize;
            for offset in (0..50_000 * 36).step_by(600) {
                rendered += compute_window(black_box(50_000), &config, offset).len();
            }
            rendered
        })
    });
}

criterion_group!(benches, bench_decode, bench_filter, bench_summary, bench_window);
criterion_main!(benches);
