//! Fail-safe coercion of trade-log strings into numbers and calendar days.
//!
//! Missing and malformed values are normal in heterogeneous exports. Numbers
//! coerce to `0.0`; dates coerce to `None` so that date-bounded filters can
//! exclude them instead of sorting them to 1970.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a finite number, tolerating surrounding whitespace, a leading `+`
/// and a trailing `%`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim_end();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce an optional string to a number. Never NaN, never infinite.
pub fn to_number(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number).unwrap_or(0.0)
}

/// Parse an optional string to a calendar day. Invalid input is `None`.
pub fn to_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return epoch_date(s);
    }

    // "2024-01-05 10:00:00+00:00" and similar: trust the leading ISO day.
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn epoch_date(digits: &str) -> Option<NaiveDate> {
    let value: i64 = digits.parse().ok()?;
    let dt = match digits.len() {
        13 => DateTime::from_timestamp_millis(value)?,
        10 => DateTime::from_timestamp(value, 0)?,
        _ => return None,
    };
    Some(dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn numbers_coerce_to_zero() {
        assert_eq!(to_number(None), 0.0);
        assert_eq!(to_number(Some("")), 0.0);
        assert_eq!(to_number(Some("   ")), 0.0);
        assert_eq!(to_number(Some("abc")), 0.0);
        assert_eq!(to_number(Some("1e400")), 0.0);
        assert_eq!(to_number(Some("NaN")), 0.0);
        assert_eq!(to_number(Some("-inf")), 0.0);
    }

    #[test]
    fn numbers_parse() {
        assert_eq!(to_number(Some("12.5")), 12.5);
        assert_eq!(to_number(Some(" -4.0 ")), -4.0);
        assert_eq!(to_number(Some("+3")), 3.0);
        assert_eq!(to_number(Some("2.5%")), 2.5);
        assert_eq!(parse_number("%"), None);
    }

    #[test]
    fn dates_in_common_shapes() {
        let want = day(2024, 1, 5);
        assert_eq!(to_date(Some("2024-01-05")), Some(want));
        assert_eq!(to_date(Some("2024/01/05")), Some(want));
        assert_eq!(to_date(Some("2024-01-05T13:45:00")), Some(want));
        assert_eq!(to_date(Some("2024-01-05 13:45:00.250")), Some(want));
        assert_eq!(to_date(Some("2024-01-05T13:45:00Z")), Some(want));
        assert_eq!(to_date(Some("2024-01-05 13:45")), Some(want));
        assert_eq!(to_date(Some("2024-01-05 13:45:00+00:00")), Some(want));
    }

    #[test]
    fn epoch_timestamps() {
        assert_eq!(to_date(Some("1704412800")), Some(day(2024, 1, 5)));
        assert_eq!(to_date(Some("1704412800000")), Some(day(2024, 1, 5)));
        assert_eq!(to_date(Some("12345")), None);
    }

    #[test]
    fn invalid_dates_are_none() {
        assert_eq!(to_date(None), None);
        assert_eq!(to_date(Some("")), None);
        assert_eq!(to_date(Some("not a date")), None);
        assert_eq!(to_date(Some("2024-13-45")), None);
        assert_eq!(to_date(Some("0")), None);
    }
}
