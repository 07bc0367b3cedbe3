//! Run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::ReportError;
use crate::window::PeriodKind;

pub const DEFAULT_INPUT: &str = "data/Coffe_sales.csv";
pub const DEFAULT_CHARTS_DIR: &str = "charts";
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_CURRENCY: &str = "RM";

/// Width the charts are scaled to on an A4 page.
pub const CHART_WIDTH_MM: f64 = 170.0;

/// Where a run reads from and writes to, and how it formats money.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub charts_dir: PathBuf,
    pub reports_dir: PathBuf,
    /// Searched before the default font locations.
    pub fonts_dir: Option<PathBuf>,
    pub currency: String,
    /// Reference date for the windows; defaults to the latest date in the data.
    pub as_of: Option<NaiveDate>,
    pub kinds: Vec<PeriodKind>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            fonts_dir: None,
            currency: DEFAULT_CURRENCY.to_string(),
            as_of: None,
            kinds: PeriodKind::ALL.to_vec(),
        }
    }
}

impl ReportConfig {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            charts_dir: self.charts_dir.clone(),
            reports_dir: self.reports_dir.clone(),
            fonts_dir: self.fonts_dir.clone(),
            currency: self.currency.clone(),
        }
    }
}

/// The part of the configuration a single report build needs.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub charts_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub fonts_dir: Option<PathBuf>,
    pub currency: String,
}

impl OutputOptions {
    /// Options writing charts and reports under `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            charts_dir: root.join(DEFAULT_CHARTS_DIR),
            reports_dir: root.join(DEFAULT_REPORTS_DIR),
            fonts_dir: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Creates the chart and report directories if they do not exist yet.
    pub fn create_dirs(&self) -> Result<(), ReportError> {
        for dir in [&self.charts_dir, &self.reports_dir] {
            fs::create_dir_all(dir).map_err(|source| ReportError::io(dir.as_path(), source))?;
        }
        Ok(())
    }

    pub fn line_chart_path(&self, kind: PeriodKind) -> PathBuf {
        self.charts_dir
            .join(format!("{}_revenue_trend.png", kind.slug()))
    }

    pub fn bar_chart_path(&self, kind: PeriodKind) -> PathBuf {
        self.charts_dir.join(format!("{}_top_items.png", kind.slug()))
    }

    pub fn report_path(&self, kind: PeriodKind) -> PathBuf {
        self.reports_dir.join(kind.report_file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_are_derived_from_directories() {
        let options = OutputOptions::under("/tmp/run");
        assert_eq!(
            options.report_path(PeriodKind::Weekly),
            Path::new("/tmp/run/reports/weekly_cafe_report.pdf")
        );
        assert_eq!(
            options.line_chart_path(PeriodKind::Monthly),
            Path::new("/tmp/run/charts/monthly_revenue_trend.png")
        );
        assert_eq!(
            options.bar_chart_path(PeriodKind::Weekly),
            Path::new("/tmp/run/charts/weekly_top_items.png")
        );
    }

    #[test]
    fn defaults_cover_both_report_kinds() {
        let config = ReportConfig::default();
        assert_eq!(config.kinds, vec![PeriodKind::Weekly, PeriodKind::Monthly]);
        assert_eq!(config.currency, "RM");
        assert_eq!(config.output().charts_dir, Path::new("charts"));
    }
}
