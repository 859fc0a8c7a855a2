//! Chart series derived from the daily results and the exit tally.

use serde::Serialize;

use crate::detail::DailyResult;
use crate::filter::{ExitClass, ExitTally};

/// One day of the PnL and trade-count charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub pnl_usd: f64,
    pub pnl_percent: f64,
    pub trades: u64,
    /// Ending capital, carried forward when the day reports none.
    pub capital: f64,
    pub cumulative_pnl: f64,
}

/// Bind the daily series, seeding the previous capital with `initial_capital`.
///
/// A day without a capital value books zero PnL and keeps the previous
/// capital, so a gap never shows up as a loss of the whole account.
pub fn bind_daily(initial_capital: f64, days: &[DailyResult]) -> Vec<DailyPoint> {
    let mut previous = finite_or_zero(initial_capital);
    let mut cumulative = 0.0;

    days.iter()
        .map(|day| {
            let capital = day.capital.unwrap_or(previous);
            let pnl_usd = capital - previous;
            let pnl_percent = day.pnl_percent.unwrap_or_else(|| {
                if previous == 0.0 {
                    0.0
                } else {
                    pnl_usd / previous * 100.0
                }
            });
            cumulative += pnl_usd;
            previous = capital;
            DailyPoint {
                date: day.date.clone(),
                pnl_usd,
                pnl_percent,
                trades: day.trades.unwrap_or(0),
                capital,
                cumulative_pnl: cumulative,
            }
        })
        .collect()
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// One slice of the exit-reason distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub class: ExitClass,
    pub count: usize,
    /// Share of the tally total, 0 when the tally is empty.
    pub percent: f64,
}

/// Take-profit, stop-loss and other slices, always in that order.
pub fn distribution(tally: &ExitTally) -> [DistributionSlice; 3] {
    let total = tally.total();
    ExitClass::ALL.map(|class| {
        let count = tally.count(class);
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        DistributionSlice { class, count, percent }
    })
}
