//! Trade filter by date range, exit-reason toggles and side selection.
//!
//! [`apply_filter`] walks the records once, producing both the filtered
//! indices and the take-profit / stop-loss / other tally for the date window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::coerce::to_date;
use crate::fields::Field;
use crate::record::TradeRecord;

/// How a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitClass {
    TakeProfit,
    StopLoss,
    Other,
}

impl ExitClass {
    /// Classify an exit-reason string by case-insensitive substring.
    ///
    /// Take-profit markers are checked first, so a reason carrying both
    /// markers classifies as take-profit.
    pub fn classify(reason: &str) -> Self {
        let upper = reason.to_uppercase();
        if ["TP", "TAKE", "PROFIT"].iter().any(|m| upper.contains(m)) {
            ExitClass::TakeProfit
        } else if ["SL", "STOP"].iter().any(|m| upper.contains(m)) {
            ExitClass::StopLoss
        } else {
            ExitClass::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExitClass::TakeProfit => "Take Profit",
            ExitClass::StopLoss => "Stop Loss",
            ExitClass::Other => "Other",
        }
    }

    pub const ALL: [ExitClass; 3] = [ExitClass::TakeProfit, ExitClass::StopLoss, ExitClass::Other];
}

/// Position direction as recorded on a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Long,
    Short,
    Unknown,
}

impl TradeSide {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.eq_ignore_ascii_case("LONG") {
            TradeSide::Long
        } else if s.eq_ignore_ascii_case("SHORT") {
            TradeSide::Short
        } else {
            TradeSide::Unknown
        }
    }
}

/// Side selector of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SideFilter {
    #[default]
    All,
    Long,
    Short,
}

impl SideFilter {
    pub fn label(self) -> &'static str {
        match self {
            SideFilter::All => "ALL",
            SideFilter::Long => "LONG",
            SideFilter::Short => "SHORT",
        }
    }

    /// Cycle ALL → LONG → SHORT → ALL.
    pub fn next(self) -> Self {
        match self {
            SideFilter::All => SideFilter::Long,
            SideFilter::Long => SideFilter::Short,
            SideFilter::Short => SideFilter::All,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ALL" => Some(SideFilter::All),
            "LONG" => Some(SideFilter::Long),
            "SHORT" => Some(SideFilter::Short),
            _ => None,
        }
    }

    pub fn admits(self, side: TradeSide) -> bool {
        match self {
            SideFilter::All => true,
            SideFilter::Long => side == TradeSide::Long,
            SideFilter::Short => side == TradeSide::Short,
        }
    }
}

/// Filter criteria. Treated as a value: edits produce a new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub include_take_profit: bool,
    pub include_stop_loss: bool,
    pub side: SideFilter,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            include_take_profit: true,
            include_stop_loss: true,
            side: SideFilter::All,
        }
    }
}

impl FilterCriteria {
    /// Permissive criteria bounded to a backtest's date range.
    pub fn for_range(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
            ..Self::default()
        }
    }

    pub fn with_start_date(self, start_date: Option<NaiveDate>) -> Self {
        Self { start_date, ..self }
    }

    pub fn with_end_date(self, end_date: Option<NaiveDate>) -> Self {
        Self { end_date, ..self }
    }

    pub fn with_take_profit(self, include_take_profit: bool) -> Self {
        Self {
            include_take_profit,
            ..self
        }
    }

    pub fn with_stop_loss(self, include_stop_loss: bool) -> Self {
        Self {
            include_stop_loss,
            ..self
        }
    }

    pub fn with_side(self, side: SideFilter) -> Self {
        Self { side, ..self }
    }

    pub fn is_date_bounded(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Inclusive date check. Unknown dates fail whenever a bound is set.
    pub fn admits_date(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_date_bounded() {
            return true;
        }
        let Some(d) = date else {
            return false;
        };
        self.start_date.map_or(true, |s| d >= s) && self.end_date.map_or(true, |e| d <= e)
    }

    pub fn admits_class(&self, class: ExitClass) -> bool {
        match class {
            ExitClass::TakeProfit => self.include_take_profit,
            ExitClass::StopLoss => self.include_stop_loss,
            ExitClass::Other => true,
        }
    }
}

/// Exit-class counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitTally {
    pub take_profit: usize,
    pub stop_loss: usize,
    pub other: usize,
}

impl ExitTally {
    pub fn record(&mut self, class: ExitClass) {
        match class {
            ExitClass::TakeProfit => self.take_profit += 1,
            ExitClass::StopLoss => self.stop_loss += 1,
            ExitClass::Other => self.other += 1,
        }
    }

    pub fn count(&self, class: ExitClass) -> usize {
        match class {
            ExitClass::TakeProfit => self.take_profit,
            ExitClass::StopLoss => self.stop_loss,
            ExitClass::Other => self.other,
        }
    }

    pub fn total(&self) -> usize {
        self.take_profit + self.stop_loss + self.other
    }
}

/// Result of one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Indices into the input records, in input order.
    pub indices: Vec<usize>,
    /// Exit classes of every record inside the date window.
    pub tally: ExitTally,
}

impl FilterOutcome {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Resolve the indices against the records they were computed from.
    pub fn rows<'a>(&'a self, records: &'a [TradeRecord]) -> impl Iterator<Item = &'a TradeRecord> + 'a {
        self.indices.iter().filter_map(move |&i| records.get(i))
    }

    /// The `n`-th filtered record.
    pub fn row<'a>(&self, records: &'a [TradeRecord], n: usize) -> Option<&'a TradeRecord> {
        self.indices.get(n).and_then(|&i| records.get(i))
    }
}

/// Filter records and tally exit classes in a single traversal.
pub fn apply_filter(records: &[TradeRecord], criteria: &FilterCriteria) -> FilterOutcome {
    let mut outcome = FilterOutcome {
        indices: Vec::with_capacity(records.len()),
        tally: ExitTally::default(),
    };
    let bounded = criteria.is_date_bounded();

    for (i, record) in records.iter().enumerate() {
        if bounded {
            let exit_date = to_date(record.field(Field::ExitTime));
            if !criteria.admits_date(exit_date) {
                continue;
            }
        }

        let class = ExitClass::classify(record.field(Field::ExitReason).unwrap_or(""));
        outcome.tally.record(class);

        if !criteria.admits_class(class) {
            continue;
        }
        let side = TradeSide::parse(record.field(Field::Side).unwrap_or(""));
        if !criteria.side.admits(side) {
            continue;
        }
        outcome.indices.push(i);
    }

    outcome
}
