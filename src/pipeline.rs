//! End-to-end run: load, summarise, then build each requested report.

use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::loader::{load_and_clean, LoadReport};
use crate::report::{build_period_report, ReportOutcome};
use crate::stats::{compute_overall_stats, AggregateResult};
use crate::types::Transaction;
use crate::window::{latest_date, select_previous_window, select_window};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub load: LoadReport,
    pub reference_date: Option<NaiveDate>,
    pub overall: Option<AggregateResult>,
    pub outcomes: Vec<ReportOutcome>,
}

/// Loads `config.input` and builds every report kind in `config.kinds`.
pub fn run(config: &ReportConfig) -> Result<RunSummary, ReportError> {
    let (rows, load) = load_and_clean(&config.input)?;
    run_with_rows(config, &rows, load)
}

/// Same as [`run`] for rows that are already cleaned.
pub fn run_with_rows(
    config: &ReportConfig,
    rows: &[Transaction],
    load: LoadReport,
) -> Result<RunSummary, ReportError> {
    let overall = compute_overall_stats(rows);
    let options = config.output();
    options.create_dirs()?;

    let reference_date = config.as_of.or_else(|| latest_date(rows));
    let Some(reference) = reference_date else {
        warn!("No transactions loaded; no period reports to build");
        return Ok(RunSummary {
            load,
            reference_date,
            overall,
            outcomes: config
                .kinds
                .iter()
                .map(|&kind| ReportOutcome::NoData { kind })
                .collect(),
        });
    };
    info!("Building reports as of {}", reference);

    let mut outcomes = Vec::with_capacity(config.kinds.len());
    for &kind in &config.kinds {
        let current = select_window(rows, reference, kind);
        let previous = select_previous_window(rows, reference, kind);
        let label = current.window.label(kind);
        outcomes.push(build_period_report(
            &current, &previous, &label, kind, &options,
        )?);
    }

    Ok(RunSummary {
        load,
        reference_date,
        overall,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::PeriodKind;

    fn config_in(dir: &std::path::Path) -> ReportConfig {
        ReportConfig {
            charts_dir: dir.join("charts"),
            reports_dir: dir.join("reports"),
            ..ReportConfig::default()
        }
    }

    #[test]
    fn no_rows_reports_every_requested_kind() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let load = LoadReport {
            total_rows: 2,
            kept_rows: 0,
            dropped_amounts: 2,
        };

        let summary = run_with_rows(&config, &[], load).unwrap();

        assert_eq!(summary.reference_date, None);
        assert_eq!(summary.overall, None);
        assert_eq!(
            summary.outcomes,
            vec![
                ReportOutcome::NoData { kind: PeriodKind::Weekly },
                ReportOutcome::NoData { kind: PeriodKind::Monthly },
            ]
        );
        assert_eq!(summary.outcomes[1].kind(), PeriodKind::Monthly);
        assert!(!config.reports_dir.join("weekly_cafe_report.pdf").exists());
    }

    #[test]
    fn summary_only_run_builds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            kinds: Vec::new(),
            ..config_in(dir.path())
        };

        let summary = run_with_rows(&config, &[], LoadReport::default()).unwrap();
        assert!(summary.outcomes.is_empty());
    }
}
