//! Parsing and formatting helpers.
//!
//! Everything that turns loosely formatted CSV text into typed values, and typed values back
//! into report text, lives here so the rest of the crate can work with clean numbers and dates.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Coerces a monetary value to `f64`.
///
/// Blank, non-numeric and non-finite inputs (`"NaN"`, `"inf"`) are treated as missing.
pub fn parse_amount(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an hour of day, accepting only `0..=23`.
pub fn parse_hour(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    s.parse::<u32>().ok().filter(|h| *h < 24)
}

/// Parses the date column. Full timestamps are accepted and keep their time component.
pub fn parse_date(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses the optional time-of-day column (`10:15:50.520000` in the till export).
pub fn parse_time(s: Option<&str>) -> Option<NaiveTime> {
    let s = s?.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Formats an amount with two decimals and thousands separators, e.g. `RM 1,234.50`.
pub fn format_money(currency: &str, amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as i64;
    let whole = (cents / 100).to_formatted_string(&Locale::en);
    let sign = if amount < 0.0 && cents != 0 { "-" } else { "" };
    format!("{}{} {}.{:02}", sign, currency, whole, cents % 100)
}

/// Formats a percentage with one decimal and an explicit sign, e.g. `+12.5%`.
pub fn format_percent(pct: f64) -> String {
    format!("{:+.1}%", pct)
}

pub fn format_count<T: ToFormattedString>(n: T) -> String {
    n.to_formatted_string(&Locale::en)
}

/// `1 order`, `12 orders`, `1,200 orders`.
pub fn format_orders(n: usize) -> String {
    let noun = if n == 1 { "order" } else { "orders" };
    format!("{} {}", format_count(n), noun)
}
