//! Fixed-locale number formatting.
//!
//! Formatting never consults the process locale: the decimal separator is
//! always `.`, and digit grouping (`,`) is applied only by [`format_display`].
//! Export files use [`format_plain`], whose output is byte-for-byte stable and
//! contains no commas, so it can go through the non-escaping CSV writer.

/// What a number represents; fixes its decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Percent values (2 dp).
    Percent,
    /// Currency amounts such as PnL and capital (2 dp).
    Currency,
    /// Fee amounts (4 dp).
    Fee,
    /// Prices and position sizes (6 dp).
    Price,
    /// Dimensionless ratios (4 dp).
    Ratio,
    /// Counts (0 dp).
    Count,
}

impl MetricKind {
    pub fn decimals(self) -> usize {
        match self {
            MetricKind::Percent | MetricKind::Currency => 2,
            MetricKind::Fee | MetricKind::Ratio => 4,
            MetricKind::Price => 6,
            MetricKind::Count => 0,
        }
    }
}

/// Format without grouping, e.g. `-1234.50`.
pub fn format_plain(value: f64, kind: MetricKind) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let s = format!("{:.*}", kind.decimals(), value);
    strip_negative_zero(s)
}

/// Format with `,` thousands grouping, e.g. `-1,234.50`.
pub fn format_display(value: f64, kind: MetricKind) -> String {
    let plain = format_plain(value, kind);
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `-0.00` reads as a loss that isn't there.
fn strip_negative_zero(s: String) -> String {
    match s.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => s,
    }
}
