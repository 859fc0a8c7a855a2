//! Summary aggregation over a backtest detail and its filtered trades.
//!
//! With a detail object, its fields are ground truth and only zero or absent
//! fields are backfilled from the trade rows. Without one, every metric is
//! derived from the rows. Ratios are recomputed last from whichever base
//! values ended up populated.

use chrono::NaiveDate;
use serde::Serialize;

use crate::detail::{BacktestDetail, DailyResult};
use crate::fields::TradeView;
use crate::format::MetricKind;
use crate::record::TradeRecord;

/// Where the base values of a [`Summary`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SummarySource {
    /// Detail object, possibly backfilled from rows.
    Detail,
    /// Trade rows only.
    #[default]
    Records,
}

/// Aggregates of a sequence of trade rows, computed in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTotals {
    pub count: u64,
    pub wins: u64,
    pub losses: u64,
    pub pnl: f64,
    pub fees: f64,
    /// Capital-after value of the last row that carried one.
    pub last_capital_after: Option<f64>,
    pub first_exit: Option<NaiveDate>,
    pub last_exit: Option<NaiveDate>,
}

impl RecordTotals {
    pub fn collect<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        let mut totals = Self::default();
        for record in records {
            totals.push(&TradeView::from_record(record));
        }
        totals
    }

    pub fn push(&mut self, view: &TradeView) {
        self.count += 1;
        if view.is_winner() {
            self.wins += 1;
        } else if view.is_loser() {
            self.losses += 1;
        }
        self.pnl += view.pnl_usdt;
        self.fees += view.fees();
        if view.capital_after.is_some() {
            self.last_capital_after = view.capital_after;
        }
        if let Some(day) = view.exit_date {
            self.first_exit = Some(self.first_exit.map_or(day, |d| d.min(day)));
            self.last_exit = Some(self.last_exit.map_or(day, |d| d.max(day)));
        }
    }

    /// Implied starting capital. Without a capital-after column the start is
    /// unknown and reported as zero.
    pub fn implied_start(&self) -> f64 {
        self.last_capital_after.map_or(0.0, |cap| cap - self.pnl)
    }

    /// Ending capital, or cumulative PnL when no capital-after column exists.
    pub fn implied_end(&self) -> f64 {
        self.last_capital_after.unwrap_or(self.pnl)
    }

    /// Inclusive day span between the earliest and latest exit.
    pub fn day_span(&self) -> Option<i64> {
        let (first, last) = (self.first_exit?, self.last_exit?);
        Some((last - first).num_days() + 1)
    }
}

/// Fixed-shape performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub net_pnl: f64,
    pub return_pct: f64,
    pub win_rate_pct: f64,
    pub loss_rate_pct: f64,
    pub total_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub total_fees: f64,
    pub avg_fee_per_trade: f64,
    pub fee_to_pnl_ratio: f64,
    pub starting_capital: f64,
    pub ending_capital: f64,
    pub avg_pnl_per_trade: f64,
    pub avg_trades_per_day: f64,
    pub source: SummarySource,
}

impl Summary {
    /// Labelled metrics in display and export order.
    pub fn metrics(&self) -> Vec<(&'static str, f64, MetricKind)> {
        vec![
            ("Net PnL (USDT)", self.net_pnl, MetricKind::Currency),
            ("Return (%)", self.return_pct, MetricKind::Percent),
            ("Win Rate (%)", self.win_rate_pct, MetricKind::Percent),
            ("Loss Rate (%)", self.loss_rate_pct, MetricKind::Percent),
            ("Total Trades", self.total_trades as f64, MetricKind::Count),
            ("Winning Trades", self.winning_trades as f64, MetricKind::Count),
            ("Losing Trades", self.losing_trades as f64, MetricKind::Count),
            ("Total Fees (USDT)", self.total_fees, MetricKind::Fee),
            ("Avg Fee per Trade (USDT)", self.avg_fee_per_trade, MetricKind::Fee),
            ("Fee to PnL Ratio", self.fee_to_pnl_ratio, MetricKind::Ratio),
            ("Starting Capital (USDT)", self.starting_capital, MetricKind::Currency),
            ("Ending Capital (USDT)", self.ending_capital, MetricKind::Currency),
            ("Avg PnL per Trade (USDT)", self.avg_pnl_per_trade, MetricKind::Currency),
            ("Avg Trades per Day", self.avg_trades_per_day, MetricKind::Ratio),
        ]
    }
}

/// Reduce a detail object (if any) and the filtered trades to a [`Summary`].
pub fn summarize<'a, I>(detail: Option<&BacktestDetail>, trades: I) -> Summary
where
    I: IntoIterator<Item = &'a TradeRecord>,
{
    let totals = RecordTotals::collect(trades);
    match detail {
        Some(detail) => from_detail(detail, &totals),
        None => from_records(&totals),
    }
}

fn from_records(totals: &RecordTotals) -> Summary {
    let starting_capital = totals.implied_start();
    let mut summary = Summary {
        net_pnl: totals.pnl,
        total_trades: totals.count,
        winning_trades: totals.wins,
        losing_trades: totals.losses,
        total_fees: totals.fees,
        starting_capital,
        ending_capital: totals.implied_end(),
        return_pct: percent_of(totals.pnl, starting_capital),
        source: SummarySource::Records,
        ..Summary::default()
    };
    summary.avg_pnl_per_trade = per_trade(summary.net_pnl, summary.total_trades);
    summary.avg_trades_per_day = totals
        .day_span()
        .map_or(0.0, |days| ratio(summary.total_trades as f64, days as f64));
    finish_ratios(&mut summary);
    summary
}

fn from_detail(detail: &BacktestDetail, totals: &RecordTotals) -> Summary {
    let initial = nonzero(detail.initial_capital);
    let final_ = nonzero(detail.final_capital);

    let starting_capital = initial.unwrap_or_else(|| totals.implied_start());
    let net_pnl = match (initial, final_) {
        (Some(start), Some(end)) => end - start,
        _ => totals.pnl,
    };
    let ending_capital = final_.unwrap_or(starting_capital + net_pnl);

    let total_trades = nonzero_count(detail.total_trades).unwrap_or(totals.count);
    let mut summary = Summary {
        net_pnl,
        total_trades,
        winning_trades: nonzero_count(detail.winning_trades).unwrap_or(totals.wins),
        losing_trades: nonzero_count(detail.losing_trades).unwrap_or(totals.losses),
        total_fees: nonzero(detail.total_fees).unwrap_or(totals.fees),
        starting_capital,
        ending_capital,
        return_pct: nonzero(detail.total_return)
            .unwrap_or_else(|| percent_of(net_pnl, starting_capital)),
        avg_pnl_per_trade: nonzero(detail.avg_profit_per_trade)
            .unwrap_or_else(|| per_trade(net_pnl, total_trades)),
        source: SummarySource::Detail,
        ..Summary::default()
    };

    summary.avg_trades_per_day = daily_average(&detail.daily_results, total_trades)
        .or_else(|| {
            detail
                .day_span()
                .map(|days| ratio(total_trades as f64, days as f64))
        })
        .or_else(|| {
            totals
                .day_span()
                .map(|days| ratio(total_trades as f64, days as f64))
        })
        .unwrap_or(0.0);
    finish_ratios(&mut summary);
    summary
}

/// Trades per day from the daily series. Days with neither a capital nor a
/// trade count carry no data and are not counted.
fn daily_average(days: &[DailyResult], total_trades: u64) -> Option<f64> {
    let with_data: Vec<&DailyResult> = days
        .iter()
        .filter(|d| d.capital.is_some() || d.trades.is_some())
        .collect();
    if with_data.is_empty() {
        return None;
    }
    let counted = with_data.iter().any(|d| d.trades.is_some());
    let trades = if counted {
        with_data.iter().filter_map(|d| d.trades).sum::<u64>()
    } else {
        total_trades
    };
    Some(ratio(trades as f64, with_data.len() as f64))
}

fn finish_ratios(summary: &mut Summary) {
    let trades = summary.total_trades as f64;
    summary.win_rate_pct = percent_of(summary.winning_trades as f64, trades);
    summary.loss_rate_pct = percent_of(summary.losing_trades as f64, trades);
    summary.avg_fee_per_trade = per_trade(summary.total_fees, summary.total_trades);
    summary.fee_to_pnl_ratio = ratio(summary.total_fees, summary.net_pnl.abs());
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

fn nonzero_count(value: Option<u64>) -> Option<u64> {
    value.filter(|v| *v != 0)
}

fn per_trade(amount: f64, trades: u64) -> f64 {
    ratio(amount, trades as f64)
}

fn percent_of(part: f64, whole: f64) -> f64 {
    ratio(part, whole) * 100.0
}

/// Division that yields 0 for a zero or non-finite result.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(pnl: &str, fee: &str, exit: &str) -> TradeRecord {
        TradeRecord::from_pairs([("exit_time", exit), ("pnl_usdt", pnl), ("fee", fee)])
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_without_detail_is_all_zero() {
        let s = summarize(None, &[]);
        assert_eq!(s, Summary::default());
        assert_eq!(s.fee_to_pnl_ratio, 0.0);
    }

    #[test]
    fn records_only() {
        let rows = vec![
            trade("10", "1", "2024-01-01"),
            trade("-4", "1", "2024-01-02"),
            trade("0", "0.5", "2024-01-04"),
        ];
        let s = summarize(None, &rows);
        assert_eq!(s.source, SummarySource::Records);
        assert_eq!(s.total_trades, 3);
        assert_eq!(s.winning_trades, 1);
        assert_eq!(s.losing_trades, 1);
        assert!(approx(s.net_pnl, 6.0));
        assert!(approx(s.total_fees, 2.5));
        assert!(approx(s.fee_to_pnl_ratio, 2.5 / 6.0));
        assert!(approx(s.avg_trades_per_day, 3.0 / 4.0));
        // No capital-after column: cumulative PnL stands in for capital.
        assert_eq!(s.starting_capital, 0.0);
        assert!(approx(s.ending_capital, 6.0));
        assert_eq!(s.return_pct, 0.0);
    }

    #[test]
    fn records_with_capital_after_infer_start() {
        let rows = vec![
            TradeRecord::from_pairs([("pnl_usdt", "20"), ("capital_after", "1020")]),
            TradeRecord::from_pairs([("pnl_usdt", "-5"), ("capital_after", "1015")]),
        ];
        let s = summarize(None, &rows);
        assert!(approx(s.starting_capital, 1000.0));
        assert!(approx(s.ending_capital, 1015.0));
        assert!(approx(s.return_pct, 1.5));
    }

    #[test]
    fn detail_capital_delta_with_no_records() {
        let detail = BacktestDetail {
            initial_capital: Some(1000.0),
            final_capital: Some(1100.0),
            total_trades: Some(0),
            ..Default::default()
        };
        let s = summarize(Some(&detail), &[]);
        assert_eq!(s.source, SummarySource::Detail);
        assert_eq!(s.total_trades, 0);
        assert!(approx(s.net_pnl, 100.0));
        assert!(approx(s.return_pct, 10.0));
        assert_eq!(s.fee_to_pnl_ratio, 0.0);
    }

    #[test]
    fn detail_fields_win_over_rows() {
        let detail = BacktestDetail {
            initial_capital: Some(1000.0),
            final_capital: Some(1200.0),
            total_trades: Some(40),
            winning_trades: Some(30),
            losing_trades: Some(10),
            total_fees: Some(20.0),
            total_return: Some(20.0),
            ..Default::default()
        };
        let rows = vec![trade("5", "1", "2024-01-01")];
        let s = summarize(Some(&detail), &rows);
        assert_eq!(s.total_trades, 40);
        assert!(approx(s.win_rate_pct, 75.0));
        assert!(approx(s.loss_rate_pct, 25.0));
        assert!(approx(s.total_fees, 20.0));
        assert!(approx(s.avg_fee_per_trade, 0.5));
        assert!(approx(s.fee_to_pnl_ratio, 0.1));
        assert!(approx(s.avg_pnl_per_trade, 5.0));
    }

    #[test]
    fn zero_detail_fields_backfill_from_rows() {
        let detail = BacktestDetail {
            initial_capital: Some(1000.0),
            total_fees: Some(0.0),
            ..Default::default()
        };
        let rows = vec![trade("10", "0.5", "2024-01-01"), trade("-2", "0.5", "2024-01-01")];
        let s = summarize(Some(&detail), &rows);
        assert_eq!(s.total_trades, 2);
        assert_eq!(s.winning_trades, 1);
        assert!(approx(s.total_fees, 1.0));
        assert!(approx(s.net_pnl, 8.0));
        assert!(approx(s.ending_capital, 1008.0));
        assert!(approx(s.return_pct, 0.8));
    }

    #[test]
    fn trades_per_day_prefers_daily_series() {
        let detail = BacktestDetail {
            total_trades: Some(10),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-10".into()),
            daily_results: vec![
                DailyResult { date: "d1".into(), trades: Some(3), ..Default::default() },
                DailyResult { date: "d2".into(), trades: Some(1), ..Default::default() },
                DailyResult { date: "d3".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        let s = summarize(Some(&detail), &[]);
        assert!(approx(s.avg_trades_per_day, 2.0));

        let detail = BacktestDetail { daily_results: Vec::new(), ..detail };
        let s = summarize(Some(&detail), &[]);
        assert!(approx(s.avg_trades_per_day, 1.0));
    }

    #[test]
    fn trades_per_day_falls_back_to_exit_span() {
        let detail = BacktestDetail {
            initial_capital: Some(1000.0),
            total_trades: Some(6),
            ..Default::default()
        };
        let rows = vec![trade("1", "0", "2024-01-01"), trade("1", "0", "2024-01-03")];
        let s = summarize(Some(&detail), &rows);
        assert_eq!(s.source, SummarySource::Detail);
        assert!(approx(s.avg_trades_per_day, 2.0));
    }

    #[test]
    fn metrics_cover_every_field() {
        let labels: Vec<_> = Summary::default().metrics().into_iter().map(|m| m.0).collect();
        assert_eq!(labels.len(), 14);
        assert_eq!(labels[0], "Net PnL (USDT)");
    }
}
