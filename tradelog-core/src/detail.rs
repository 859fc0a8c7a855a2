//! Server-computed backtest detail and its daily results.
//!
//! Every numeric field is optional and lenient: backends serialize decimals
//! as JSON numbers or as strings, and omit fields they did not compute.
//! Non-finite or unparsable values deserialize as `None`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::coerce::{parse_number, to_date};

/// Aggregate summary of one backtest run as returned by the detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDetail")]
pub struct BacktestDetail {
    pub initial_capital: Option<f64>,
    pub final_capital: Option<f64>,
    pub total_trades: Option<u64>,
    pub winning_trades: Option<u64>,
    pub losing_trades: Option<u64>,
    pub total_fees: Option<f64>,
    /// Total return in percent.
    pub total_return: Option<f64>,
    pub avg_profit_per_trade: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub market_type: Option<String>,
    pub leverage: Option<f64>,
    pub is_test_mode: Option<bool>,
    pub daily_results: Vec<DailyResult>,
}

impl BacktestDetail {
    pub fn start(&self) -> Option<NaiveDate> {
        to_date(self.start_date.as_deref())
    }

    pub fn end(&self) -> Option<NaiveDate> {
        to_date(self.end_date.as_deref())
    }

    /// Inclusive number of calendar days between start and end.
    pub fn day_span(&self) -> Option<i64> {
        let (start, end) = (self.start()?, self.end()?);
        (end >= start).then(|| (end - start).num_days() + 1)
    }
}

/// Wire shape of the detail body. Alternate key spellings each get their
/// own slot so a body carrying several of them still parses; the first
/// usable one wins.
#[derive(Deserialize)]
struct RawDetail {
    #[serde(default, deserialize_with = "lenient_f64")]
    initial_capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    final_capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    total_trades: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    winning_trades: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    losing_trades: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_fees: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_return: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_return_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    avg_profit_per_trade: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    avg_profit: Option<f64>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    interval: Option<String>,
    #[serde(default)]
    market_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    leverage: Option<f64>,
    #[serde(default)]
    is_test_mode: Option<bool>,
    #[serde(default)]
    test_mode: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    daily_results: Vec<DailyResult>,
}

impl From<RawDetail> for BacktestDetail {
    fn from(raw: RawDetail) -> Self {
        BacktestDetail {
            initial_capital: raw.initial_capital,
            final_capital: raw.final_capital,
            total_trades: raw.total_trades,
            winning_trades: raw.winning_trades,
            losing_trades: raw.losing_trades,
            total_fees: raw.total_fees,
            total_return: raw.total_return.or(raw.total_return_percent),
            avg_profit_per_trade: raw.avg_profit_per_trade.or(raw.avg_profit),
            start_date: raw.start_date,
            end_date: raw.end_date,
            symbol: raw.symbol,
            interval: raw.interval,
            market_type: raw.market_type,
            leverage: raw.leverage,
            is_test_mode: raw.is_test_mode.or(raw.test_mode),
            daily_results: raw.daily_results,
        }
    }
}

/// One calendar day of a backtest's equity series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDaily")]
pub struct DailyResult {
    pub date: String,
    /// Ending capital for the day.
    pub capital: Option<f64>,
    pub trades: Option<u64>,
    pub pnl_percent: Option<f64>,
}

#[derive(Deserialize)]
struct RawDaily {
    #[serde(default)]
    date: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    ending_capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    final_capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    trades: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    trade_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    trades_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pnl_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pnl_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    daily_return: Option<f64>,
}

impl From<RawDaily> for DailyResult {
    fn from(raw: RawDaily) -> Self {
        DailyResult {
            date: raw.date.unwrap_or_default(),
            capital: raw
                .capital
                .or(raw.ending_capital)
                .or(raw.final_capital)
                .or(raw.balance),
            trades: raw.trades.or(raw.trade_count).or(raw.trades_count),
            pnl_percent: raw.pnl_percent.or(raw.pnl_pct).or(raw.daily_return),
        }
    }
}

/// One entry of the backtest listing, used to populate the run selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestListing {
    #[serde(deserialize_with = "id_text")]
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl BacktestListing {
    /// One-line label for selectors, e.g. `#12 BTCUSDT 15m 2024-01-01..2024-01-31`.
    pub fn label(&self) -> String {
        let mut label = format!("#{}", self.id);
        for part in [&self.symbol, &self.interval].into_iter().flatten() {
            label.push(' ');
            label.push_str(part);
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            label.push_str(&format!(
                " {}..{}",
                short_date(self.start_date.as_deref()),
                short_date(self.end_date.as_deref())
            ));
        }
        label
    }
}

fn short_date(raw: Option<&str>) -> String {
    match to_date(raw) {
        Some(d) => d.to_string(),
        None => raw.unwrap_or("?").to_string(),
    }
}

/// Ids arrive as JSON numbers from some backends and strings from others.
fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Text(String),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Int(n) => n.to_string(),
        Id::Text(s) => s,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    #[allow(dead_code)]
    Other(serde::de::IgnoredAny),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) if n.is_finite() => Some(n),
        Some(NumberOrText::Text(s)) => parse_number(&s),
        _ => None,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(lenient_f64(deserializer)?
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DailyResult>, D::Error> {
    Ok(Option::<Vec<DailyResult>>::deserialize(deserializer)?.unwrap_or_default())
}
