//! Logical trade fields resolved through column aliases.
//!
//! Exporters disagree on column names (`pnl_usdt`, `pnl`, `realized_pnl`,
//! `Exit_Time`, ...). [`resolve`] tries each alias in order, exact match
//! first and then ignoring case, and returns the first non-blank value.

use chrono::NaiveDate;

use crate::coerce::{parse_number, to_date, to_number};
use crate::filter::{ExitClass, TradeSide};
use crate::record::TradeRecord;

/// Fields the analytics consume from a trade row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ExitTime,
    EntryTime,
    Symbol,
    Side,
    ExitReason,
    PnlUsdt,
    PnlPercent,
    EntryFee,
    ExitFee,
    /// Single fee column, used when entry/exit fees are not split.
    TotalFee,
    EntryPrice,
    ExitPrice,
    PositionSize,
    /// Account capital after the trade closed.
    CapitalAfter,
}

impl Field {
    /// Candidate column names, most specific first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::ExitTime => &[
                "exit_time",
                "exitTime",
                "exit_date",
                "close_time",
                "closed_at",
                "exit_timestamp",
                "time",
                "date",
            ],
            Field::EntryTime => &["entry_time", "entryTime", "entry_date", "open_time", "opened_at"],
            Field::Symbol => &["symbol", "pair", "ticker"],
            Field::Side => &["side", "direction", "position_side", "positionSide"],
            Field::ExitReason => &["exit_reason", "exitReason", "reason", "close_reason", "exit_type"],
            Field::PnlUsdt => &[
                "pnl_usdt",
                "pnlUsdt",
                "realized_pnl",
                "net_pnl",
                "pnl",
                "profit_usdt",
                "profit",
            ],
            Field::PnlPercent => &[
                "pnl_percent",
                "pnlPercent",
                "pnl_pct",
                "pnl%",
                "return_pct",
                "profit_percent",
                "roi",
            ],
            Field::EntryFee => &["entry_fee", "entryFee", "open_fee", "fee_entry"],
            Field::ExitFee => &["exit_fee", "exitFee", "close_fee", "fee_exit"],
            Field::TotalFee => &["fee", "fees", "total_fee", "commission"],
            Field::EntryPrice => &["entry_price", "entryPrice", "open_price"],
            Field::ExitPrice => &["exit_price", "exitPrice", "close_price"],
            Field::PositionSize => &["size", "position_size", "quantity", "qty", "amount"],
            Field::CapitalAfter => &[
                "capital_after",
                "capitalAfter",
                "balance_after",
                "capital",
                "balance",
                "equity",
            ],
        }
    }
}

/// First non-blank value among `aliases`, exact name before case-folded.
pub fn resolve<'r>(record: &'r TradeRecord, aliases: &[&str]) -> Option<&'r str> {
    aliases.iter().find_map(|alias| {
        non_blank(record.get(alias)).or_else(|| non_blank(record.get_ignore_case(alias)))
    })
}

/// [`resolve`] with a caller-supplied fallback.
pub fn resolve_or<'r>(record: &'r TradeRecord, aliases: &[&str], fallback: &'r str) -> &'r str {
    resolve(record, aliases).unwrap_or(fallback)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl TradeRecord {
    /// Resolve a logical field through its aliases.
    pub fn field(&self, field: Field) -> Option<&str> {
        resolve(self, field.aliases())
    }
}

/// Typed view of the fields the summary and tables need.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeView {
    pub exit_date: Option<NaiveDate>,
    pub side: TradeSide,
    pub exit_class: ExitClass,
    pub pnl_usdt: f64,
    pub pnl_percent: f64,
    pub entry_fee: f64,
    pub exit_fee: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    pub capital_after: Option<f64>,
}

impl TradeView {
    pub fn from_record(record: &TradeRecord) -> Self {
        let entry_fee = record.field(Field::EntryFee);
        let exit_fee = record.field(Field::ExitFee);
        let (entry_fee, exit_fee) = if entry_fee.is_none() && exit_fee.is_none() {
            // Unsplit fee column is booked on the exit leg.
            (0.0, to_number(record.field(Field::TotalFee)))
        } else {
            (to_number(entry_fee), to_number(exit_fee))
        };

        Self {
            exit_date: to_date(record.field(Field::ExitTime)),
            side: TradeSide::parse(record.field(Field::Side).unwrap_or("")),
            exit_class: ExitClass::classify(record.field(Field::ExitReason).unwrap_or("")),
            pnl_usdt: to_number(record.field(Field::PnlUsdt)),
            pnl_percent: to_number(record.field(Field::PnlPercent)),
            entry_fee,
            exit_fee,
            entry_price: to_number(record.field(Field::EntryPrice)),
            exit_price: to_number(record.field(Field::ExitPrice)),
            size: to_number(record.field(Field::PositionSize)),
            capital_after: record.field(Field::CapitalAfter).and_then(parse_number),
        }
    }

    pub fn fees(&self) -> f64 {
        self.entry_fee + self.exit_fee
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_usdt > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl_usdt < 0.0
    }
}
