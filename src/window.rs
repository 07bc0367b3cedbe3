//! Period windows used to slice the transaction table for one report.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::types::Transaction;

/// The two report cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Weekly,
    Monthly,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 2] = [PeriodKind::Weekly, PeriodKind::Monthly];

    /// Lower-case name used in file names.
    pub fn slug(self) -> &'static str {
        match self {
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
        }
    }

    /// Noun used in prose ("compared with the previous week").
    pub fn unit(self) -> &'static str {
        match self {
            PeriodKind::Weekly => "week",
            PeriodKind::Monthly => "month",
        }
    }

    /// Fixed document file name for this cadence.
    pub fn report_file_name(self) -> String {
        format!("{}_cafe_report.pdf", self.slug())
    }

    /// The window ending at (weekly) or containing (monthly) `reference`.
    pub fn current_window(self, reference: NaiveDate) -> PeriodWindow {
        match self {
            PeriodKind::Weekly => PeriodWindow::new(reference - Duration::days(6), reference),
            PeriodKind::Monthly => PeriodWindow::new(month_start(reference), month_end(reference)),
        }
    }

    /// The window immediately before [`PeriodKind::current_window`], with no overlap.
    pub fn previous_window(self, reference: NaiveDate) -> PeriodWindow {
        let current = self.current_window(reference);
        let last_day = current.start - Duration::days(1);
        match self {
            PeriodKind::Weekly => PeriodWindow::new(last_day - Duration::days(6), last_day),
            PeriodKind::Monthly => PeriodWindow::new(month_start(last_day), last_day),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &PeriodWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Human label: `2024-01-01 to 2024-01-07` for weeks, `January 2024` for months.
    pub fn label(&self, kind: PeriodKind) -> String {
        match kind {
            PeriodKind::Weekly => format!("{} to {}", self.start, self.end),
            PeriodKind::Monthly => self.start.format("%B %Y").to_string(),
        }
    }
}

/// Rows of one window, together with the window they were selected for.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSubset {
    pub window: PeriodWindow,
    pub rows: Vec<Transaction>,
}

impl PeriodSubset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Latest transaction date in the table, the default reference for both cadences.
pub fn latest_date(rows: &[Transaction]) -> Option<NaiveDate> {
    rows.iter().map(Transaction::date).max()
}

pub fn select_window(rows: &[Transaction], reference: NaiveDate, kind: PeriodKind) -> PeriodSubset {
    subset(rows, kind.current_window(reference))
}

pub fn select_previous_window(
    rows: &[Transaction],
    reference: NaiveDate,
    kind: PeriodKind,
) -> PeriodSubset {
    subset(rows, kind.previous_window(reference))
}

fn subset(rows: &[Transaction], window: PeriodWindow) -> PeriodSubset {
    let rows = rows
        .iter()
        .filter(|row| window.contains(row.date()))
        .cloned()
        .collect();
    PeriodSubset { window, rows }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn month_end(date: NaiveDate) -> NaiveDate {
    // Day 1 plus 31 days always lands in the following month.
    month_start(month_start(date) + Duration::days(31)) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(date: NaiveDate) -> Transaction {
        Transaction::new(date.and_hms_opt(9, 0, 0).unwrap(), "Latte", 3.5, "Mon")
    }

    #[test]
    fn weekly_windows_are_contiguous_seven_day_blocks() {
        let reference = day(2024, 3, 10);
        let current = PeriodKind::Weekly.current_window(reference);
        let previous = PeriodKind::Weekly.previous_window(reference);
        assert_eq!(current, PeriodWindow::new(day(2024, 3, 4), day(2024, 3, 10)));
        assert_eq!(previous, PeriodWindow::new(day(2024, 2, 26), day(2024, 3, 3)));
        assert!(!current.overlaps(&previous));
    }

    #[test]
    fn monthly_windows_follow_calendar_months() {
        let current = PeriodKind::Monthly.current_window(day(2024, 2, 14));
        assert_eq!(current, PeriodWindow::new(day(2024, 2, 1), day(2024, 2, 29)));

        let previous = PeriodKind::Monthly.previous_window(day(2024, 1, 20));
        assert_eq!(previous, PeriodWindow::new(day(2023, 12, 1), day(2023, 12, 31)));
        assert_eq!(previous.label(PeriodKind::Monthly), "December 2023");
    }

    #[test]
    fn selected_rows_stay_within_bounds_and_never_overlap() {
        let start = day(2023, 11, 1);
        let rows: Vec<Transaction> = (0..120).map(|i| sale(start + Duration::days(i))).collect();
        let reference = latest_date(&rows).unwrap();

        for kind in PeriodKind::ALL {
            let current = select_window(&rows, reference, kind);
            let previous = select_previous_window(&rows, reference, kind);
            assert!(current.rows.iter().all(|r| current.window.contains(r.date())));
            assert!(previous.rows.iter().all(|r| previous.window.contains(r.date())));
            assert!(current
                .rows
                .iter()
                .all(|r| !previous.window.contains(r.date())));
            assert!(!current.window.overlaps(&previous.window));
        }

        let weekly = select_window(&rows, reference, PeriodKind::Weekly);
        assert_eq!(weekly.rows.len(), 7);
    }

    #[test]
    fn empty_table_has_no_reference_date() {
        assert_eq!(latest_date(&[]), None);
    }

    #[test]
    fn report_file_names_are_fixed_per_kind() {
        assert_eq!(PeriodKind::Weekly.report_file_name(), "weekly_cafe_report.pdf");
        assert_eq!(PeriodKind::Monthly.report_file_name(), "monthly_cafe_report.pdf");
    }
}
