//! Aggregations over cleaned transactions.
//!
//! Grouping always goes through a [`BTreeMap`], so iteration order (and therefore the winner of
//! any tie in a mode or arg-max) is the ascending key order. Callers must not rely on which key
//! wins a tie; it is only guaranteed to be the same from run to run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::Transaction;

/// Whole-table summary printed by the console report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub top_item: String,
    pub peak_hour: u32,
    pub busiest_day: String,
}

/// Direction of the period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
}

impl Trend {
    /// A change of exactly zero counts as an increase.
    pub fn from_change(pct: f64) -> Self {
        if pct >= 0.0 {
            Trend::Increase
        } else {
            Trend::Decrease
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Increase => "increase",
            Trend::Decrease => "decrease",
        }
    }
}

/// Hour of day with the highest revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakHour {
    pub hour: u32,
    pub revenue: f64,
}

/// Best and worst calendar day by revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayExtremes {
    pub best_day: NaiveDate,
    pub best_revenue: f64,
    pub worst_day: NaiveDate,
    pub worst_revenue: f64,
}

pub fn total_revenue(rows: &[Transaction]) -> f64 {
    rows.iter().map(|row| row.amount).sum()
}

/// Returns `None` for an empty table.
pub fn compute_overall_stats(rows: &[Transaction]) -> Option<AggregateResult> {
    let (top_item, _) = mode(&counts_by(rows, |row| row.item.clone()))?;
    let (peak_hour, _) = mode(&counts_by(rows, |row| row.hour))?;
    let (busiest_day, _) = mode(&counts_by(rows, |row| row.weekday.clone()))?;

    Some(AggregateResult {
        total_revenue: total_revenue(rows),
        total_orders: rows.len(),
        top_item,
        peak_hour,
        busiest_day,
    })
}

/// `(current - previous) / previous * 100`, or `0.0` when there is nothing to compare against.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Sums `amount` per key.
pub fn revenue_by<K, F>(rows: &[Transaction], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&Transaction) -> K,
{
    let mut sums = BTreeMap::new();
    for row in rows {
        *sums.entry(key(row)).or_insert(0.0) += row.amount;
    }
    sums
}

/// Counts rows per key.
pub fn counts_by<K, F>(rows: &[Transaction], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&Transaction) -> K,
{
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(key(row)).or_insert(0) += 1;
    }
    counts
}

/// Most frequent key. Ties keep the first key in ascending order.
pub fn mode<K: Clone>(counts: &BTreeMap<K, usize>) -> Option<(K, usize)> {
    let mut best: Option<(&K, usize)> = None;
    for (key, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(key, count)| (key.clone(), count))
}

pub fn arg_max<K: Clone>(values: &BTreeMap<K, f64>) -> Option<(K, f64)> {
    pick(values, |candidate, current| candidate > current)
}

pub fn arg_min<K: Clone>(values: &BTreeMap<K, f64>) -> Option<(K, f64)> {
    pick(values, |candidate, current| candidate < current)
}

fn pick<K: Clone>(values: &BTreeMap<K, f64>, better: impl Fn(f64, f64) -> bool) -> Option<(K, f64)> {
    let mut chosen: Option<(&K, f64)> = None;
    for (key, &value) in values {
        if chosen.map_or(true, |(_, v)| better(value, v)) {
            chosen = Some((key, value));
        }
    }
    chosen.map(|(key, value)| (key.clone(), value))
}

pub fn peak_hour_by_revenue(rows: &[Transaction]) -> Option<PeakHour> {
    arg_max(&revenue_by(rows, |row| row.hour)).map(|(hour, revenue)| PeakHour { hour, revenue })
}

pub fn best_and_worst_days(rows: &[Transaction]) -> Option<DayExtremes> {
    let daily = revenue_by(rows, Transaction::date);
    let (best_day, best_revenue) = arg_max(&daily)?;
    let (worst_day, worst_revenue) = arg_min(&daily)?;
    Some(DayExtremes {
        best_day,
        best_revenue,
        worst_day,
        worst_revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(date: &str, hour: u32, item: &str, amount: f64, weekday: &str) -> Transaction {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::new(day.and_hms_opt(hour, 0, 0).unwrap(), item, amount, weekday)
    }

    #[test]
    fn percentage_change_matches_reference_values() {
        assert_eq!(percentage_change(100.0, 50.0), 100.0);
        assert_eq!(percentage_change(50.0, 100.0), -50.0);
        assert_eq!(percentage_change(42.0, 0.0), 0.0);
        assert_eq!(percentage_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn zero_change_is_an_increase() {
        assert_eq!(Trend::from_change(0.0), Trend::Increase);
        assert_eq!(Trend::from_change(-0.1), Trend::Decrease);
        assert_eq!(Trend::from_change(3.0).label(), "increase");
    }

    #[test]
    fn overall_stats_with_a_clear_winner() {
        let rows = vec![
            sale("2024-01-01", 8, "Latte", 10.0, "Mon"),
            sale("2024-01-02", 9, "Mocha", 15.0, "Tue"),
            sale("2024-01-02", 9, "Latte", 10.0, "Tue"),
        ];
        let stats = compute_overall_stats(&rows).unwrap();
        assert_eq!(stats.total_revenue, 35.0);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.top_item, "Latte");
        assert_eq!(stats.peak_hour, 9);
        assert_eq!(stats.busiest_day, "Tue");
    }

    #[test]
    fn overall_stats_signal_no_data() {
        assert!(compute_overall_stats(&[]).is_none());
        assert!(peak_hour_by_revenue(&[]).is_none());
        assert!(best_and_worst_days(&[]).is_none());
    }

    #[test]
    fn best_and_worst_days_from_daily_sums() {
        let rows = vec![
            sale("2024-01-01", 8, "Latte", 10.0, "Mon"),
            sale("2024-01-02", 9, "Mocha", 15.0, "Tue"),
            sale("2024-01-02", 10, "Latte", 10.0, "Tue"),
        ];
        let days = best_and_worst_days(&rows).unwrap();
        assert_eq!(days.best_day, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(days.best_revenue, 25.0);
        assert_eq!(days.worst_day, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(days.worst_revenue, 10.0);
    }

    #[test]
    fn peak_hour_carries_its_revenue() {
        let rows = vec![
            sale("2024-01-01", 8, "Latte", 10.0, "Mon"),
            sale("2024-01-01", 8, "Latte", 10.0, "Mon"),
            sale("2024-01-01", 15, "Mocha", 30.0, "Mon"),
        ];
        let peak = peak_hour_by_revenue(&rows).unwrap();
        assert_eq!(peak, PeakHour { hour: 15, revenue: 30.0 });
        // Frequency and revenue disagree on purpose.
        assert_eq!(compute_overall_stats(&rows).unwrap().peak_hour, 8);
    }

    #[test]
    fn ties_resolve_to_the_first_key() {
        let counts = counts_by(
            &[
                sale("2024-01-01", 8, "Mocha", 1.0, "Mon"),
                sale("2024-01-01", 8, "Latte", 1.0, "Mon"),
            ],
            |row| row.item.clone(),
        );
        assert_eq!(mode(&counts), Some(("Latte".to_string(), 1)));
    }
}
