//! Row types for the point-of-sale export.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Column names the loader refuses to run without.
pub const REQUIRED_COLUMNS: &[&str] = &["money", "coffee_name", "Date", "hour_of_day", "Weekday"];

/// A CSV row exactly as exported by the till, before any coercion.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "money")]
    pub money: Option<String>,
    #[serde(rename = "coffee_name")]
    pub coffee_name: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "hour_of_day")]
    pub hour_of_day: Option<String>,
    #[serde(rename = "Weekday")]
    pub weekday: Option<String>,
}

/// One cleaned sale. The amount is always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    pub item: String,
    pub amount: f64,
    pub hour: u32,
    pub weekday: String,
}

impl Transaction {
    pub fn new(
        timestamp: NaiveDateTime,
        item: impl Into<String>,
        amount: f64,
        weekday: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            item: item.into(),
            amount,
            hour: timestamp.hour(),
            weekday: weekday.into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
