//! Weekly and monthly period reports.
//!
//! [`compose_period_report`] computes the period figures, writes the two charts and lays out
//! the content as a [`ReportDocument`]. [`build_period_report`] adds the PDF step on top.

use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

use crate::builder::PdfBuilder;
use crate::charts::{self, Chart};
use crate::config::{OutputOptions, CHART_WIDTH_MM};
use crate::error::{ChartError, ReportError};
use crate::model::{ChartBlock, RichParagraph, ReportDocument};
use crate::richtext::{Span, NEGATIVE, POSITIVE};
use crate::stats::{self, DayExtremes, PeakHour, Trend};
use crate::util::{format_count, format_money, format_orders, format_percent};
use crate::window::{PeriodKind, PeriodSubset, PeriodWindow};

pub const DOCUMENT_TITLE: &str = "Café Sales Report";
pub const BREAKDOWN_HEADING: &str = "Performance Breakdown";

const GROWTH_INSIGHTS: [&str; 3] = [
    "Revenue is up; keep the current menu and promotions running.",
    "Stock up on the best sellers ahead of the busiest hours.",
    "Reward returning customers to hold on to the momentum.",
];

const DECLINE_INSIGHTS: [&str; 3] = [
    "Revenue is down; review pricing and current promotions.",
    "Run time-limited offers during the quieter hours.",
    "Consider bundling or replacing the slowest-selling items.",
];

/// Period-specific figure shown after the charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PeriodStats {
    Weekly { peak_hour: Option<PeakHour> },
    Monthly { days: Option<DayExtremes> },
}

/// Numbers behind one period report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub kind: PeriodKind,
    pub window: PeriodWindow,
    pub label: String,
    pub revenue: f64,
    pub orders: usize,
    pub previous_revenue: f64,
    pub change_pct: f64,
    pub trend: Trend,
    pub stats: PeriodStats,
    pub charts: Vec<PathBuf>,
}

/// A laid-out report that has not been rendered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedReport {
    pub summary: PeriodSummary,
    pub document: ReportDocument,
}

/// What happened to one requested report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReportOutcome {
    Written { path: PathBuf, summary: PeriodSummary },
    Skipped { kind: PeriodKind, window: PeriodWindow },
    /// No reference date could be resolved because no transaction survived cleaning.
    NoData { kind: PeriodKind },
}

impl ReportOutcome {
    pub fn kind(&self) -> PeriodKind {
        match self {
            ReportOutcome::Written { summary, .. } => summary.kind,
            ReportOutcome::Skipped { kind, .. } | ReportOutcome::NoData { kind } => *kind,
        }
    }
}

/// Title-cased cadence name, e.g. `Weekly`.
pub fn report_name(kind: PeriodKind) -> &'static str {
    match kind {
        PeriodKind::Weekly => "Weekly",
        PeriodKind::Monthly => "Monthly",
    }
}

pub fn insights(trend: Trend) -> &'static [&'static str] {
    match trend {
        Trend::Increase => &GROWTH_INSIGHTS,
        Trend::Decrease => &DECLINE_INSIGHTS,
    }
}

/// Writes the period charts and lays out the report content.
///
/// Returns `Ok(None)` when `current` has no rows; nothing is written in that case.
pub fn compose_period_report(
    current: &PeriodSubset,
    previous: &PeriodSubset,
    period_label: &str,
    kind: PeriodKind,
    options: &OutputOptions,
) -> Result<Option<ComposedReport>, ChartError> {
    if current.is_empty() {
        return Ok(None);
    }

    let name = report_name(kind);
    let currency = options.currency.as_str();
    let revenue = stats::total_revenue(&current.rows);
    let previous_revenue = stats::total_revenue(&previous.rows);
    let change_pct = stats::percentage_change(revenue, previous_revenue);
    let trend = Trend::from_change(change_pct);

    let mut document =
        ReportDocument::new(DOCUMENT_TITLE).with_footer(format!("{} Report", name));

    document
        .heading(format!("{} Summary", name), 1)
        .paragraph(vec![Span::new("Period: ").bold(), Span::new(period_label)])
        .paragraph(vec![
            Span::new("Total Revenue: ").bold(),
            Span::new(format_money(currency, revenue)),
        ])
        .paragraph(vec![
            Span::new("Total Orders: ").bold(),
            Span::new(format_count(current.rows.len())),
        ])
        .paragraph(trend_line(trend, change_pct, kind));

    let mut chart_paths = Vec::new();

    let line = charts::render_line_chart(
        &current.rows,
        &format!("{} Revenue Trend", name),
        options.line_chart_path(kind),
    )?;
    if let Some(chart) = line {
        document
            .heading("Revenue Trend", 2)
            .chart(chart_block(&chart, line_legend(&chart, currency)));
        chart_paths.push(chart.path);
    }

    let bar = charts::render_bar_chart(
        &current.rows,
        &format!("{} Top Items", name),
        options.bar_chart_path(kind),
    )?;
    if let Some(chart) = bar {
        document
            .heading(BREAKDOWN_HEADING, 2)
            .chart(chart_block(&chart, None));
        // Legend lists the best seller first, matching the top bar.
        for (item, count) in chart.series.iter().rev() {
            document.bullet(vec![
                Span::new(format!("{}: ", item)).bold(),
                Span::new(format_orders(*count as usize)),
            ]);
        }
        chart_paths.push(chart.path);
    }

    let period_stats = match kind {
        PeriodKind::Weekly => {
            let peak_hour = stats::peak_hour_by_revenue(&current.rows);
            if let Some(peak) = peak_hour {
                document.heading("Peak Hour", 2).paragraph(vec![
                    Span::new(format!("{}:00", peak.hour)).bold(),
                    Span::new(format!(" with {}", format_money(currency, peak.revenue))),
                ]);
            }
            PeriodStats::Weekly { peak_hour }
        }
        PeriodKind::Monthly => {
            let days = stats::best_and_worst_days(&current.rows);
            if let Some(days) = days {
                document
                    .heading("Best and Worst Days", 2)
                    .paragraph(vec![
                        Span::new("Best Day: ").bold(),
                        Span::new(format!(
                            "{} ({})",
                            days.best_day,
                            format_money(currency, days.best_revenue)
                        )),
                    ])
                    .paragraph(vec![
                        Span::new("Worst Day: ").bold(),
                        Span::new(format!(
                            "{} ({})",
                            days.worst_day,
                            format_money(currency, days.worst_revenue)
                        )),
                    ]);
            }
            PeriodStats::Monthly { days }
        }
    };

    document.heading("Insights", 2);
    for insight in insights(trend) {
        document.bullet(vec![Span::new(*insight)]);
    }

    let summary = PeriodSummary {
        kind,
        window: current.window,
        label: period_label.to_string(),
        revenue,
        orders: current.rows.len(),
        previous_revenue,
        change_pct,
        trend,
        stats: period_stats,
        charts: chart_paths,
    };
    Ok(Some(ComposedReport { summary, document }))
}

/// Composes the report for `current` and saves it as a PDF in the reports directory.
///
/// An empty `current` subset is not an error: the outcome is `Skipped` and no file is
/// written.
pub fn build_period_report(
    current: &PeriodSubset,
    previous: &PeriodSubset,
    period_label: &str,
    kind: PeriodKind,
    options: &OutputOptions,
) -> Result<ReportOutcome, ReportError> {
    if current.is_empty() {
        warn!(
            "No transactions for the {} report ({}); skipping",
            kind, period_label
        );
        return Ok(ReportOutcome::Skipped {
            kind,
            window: current.window,
        });
    }

    options.create_dirs()?;
    let Some(composed) = compose_period_report(current, previous, period_label, kind, options)?
    else {
        return Ok(ReportOutcome::Skipped {
            kind,
            window: current.window,
        });
    };

    let rendered = PdfBuilder::new()
        .with_fonts_dir(options.fonts_dir.clone())
        .render(&composed.document)?;
    let path = rendered.save(options.report_path(kind))?;
    info!(
        "{} report for {}: revenue {}, {} vs previous {}",
        report_name(kind),
        period_label,
        format_money(&options.currency, composed.summary.revenue),
        composed.summary.trend.label(),
        format_percent(composed.summary.change_pct)
    );
    Ok(ReportOutcome::Written {
        path,
        summary: composed.summary,
    })
}

fn trend_line(trend: Trend, change_pct: f64, kind: PeriodKind) -> Vec<Span> {
    let color = match trend {
        Trend::Increase => POSITIVE,
        Trend::Decrease => NEGATIVE,
    };
    vec![
        Span::new("Trend: ").bold(),
        Span::new(format!("{} of {}", trend.label(), format_percent(change_pct)))
            .bold()
            .colored(color),
        Span::new(format!(" compared with the previous {}", kind.unit())),
    ]
}

fn line_legend(chart: &Chart, currency: &str) -> Option<RichParagraph> {
    let (day, revenue) = chart
        .series
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    Some(RichParagraph::new(vec![Span::new(format!(
        "Daily revenue across {} day(s); highest on {} ({})",
        chart.series.len(),
        day,
        format_money(currency, *revenue)
    ))]))
}

fn chart_block(chart: &Chart, caption: Option<RichParagraph>) -> ChartBlock {
    ChartBlock::new(chart.path.clone())
        .with_caption(caption)
        .with_width_mm(CHART_WIDTH_MM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;
    use crate::types::Transaction;
    use chrono::NaiveDate;

    fn sale(date: &str, hour: u32, item: &str, amount: f64) -> Transaction {
        let timestamp = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap();
        Transaction::new(timestamp, item, amount, "Mon")
    }

    fn subset(kind: PeriodKind, reference: &str, rows: Vec<Transaction>) -> PeriodSubset {
        let reference = NaiveDate::parse_from_str(reference, "%Y-%m-%d").unwrap();
        PeriodSubset {
            window: kind.current_window(reference),
            rows,
        }
    }

    fn week() -> Vec<Transaction> {
        vec![
            sale("2024-01-01", 9, "Latte", 10.0),
            sale("2024-01-02", 14, "Mocha", 15.0),
            sale("2024-01-02", 14, "Latte", 10.0),
        ]
    }

    #[test]
    fn empty_period_is_skipped_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let options = OutputOptions::under(dir.path());
        let empty = subset(PeriodKind::Weekly, "2024-01-07", Vec::new());

        let outcome =
            build_period_report(&empty, &empty, "2024-01-01 to 2024-01-07", PeriodKind::Weekly, &options)
                .unwrap();

        assert!(matches!(outcome, ReportOutcome::Skipped { kind: PeriodKind::Weekly, .. }));
        assert!(!options.report_path(PeriodKind::Weekly).exists());
        assert!(!options.line_chart_path(PeriodKind::Weekly).exists());
    }

    #[test]
    fn weekly_sections_follow_the_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let options = OutputOptions::under(dir.path());
        options.create_dirs().unwrap();
        let current = subset(PeriodKind::Weekly, "2024-01-07", week());
        let previous = subset(PeriodKind::Weekly, "2023-12-31", vec![sale("2023-12-30", 9, "Latte", 20.0)]);

        let composed = compose_period_report(&current, &previous, "this week", PeriodKind::Weekly, &options)
            .unwrap()
            .unwrap();

        assert_eq!(
            composed.document.headings(),
            vec!["Weekly Summary", "Revenue Trend", BREAKDOWN_HEADING, "Peak Hour", "Insights"]
        );
        assert_eq!(composed.document.title(), DOCUMENT_TITLE);
        assert_eq!(composed.document.footer(), "Weekly Report");

        let lines = composed.document.text_lines();
        assert!(lines.contains(&"Total Revenue: RM 35.00".to_string()));
        assert!(lines.contains(&"Total Orders: 3".to_string()));
        assert!(lines.contains(&"Trend: increase of +75.0% compared with the previous week".to_string()));
        assert!(lines.contains(&"14:00 with RM 25.00".to_string()));

        let bullets: Vec<String> = composed
            .document
            .blocks()
            .iter()
            .filter_map(|block| match block {
                Block::Bullet(p) => Some(p.text()),
                _ => None,
            })
            .collect();
        assert_eq!(bullets[0], "Latte: 2 orders");
        assert_eq!(bullets[1], "Mocha: 1 order");
        assert_eq!(&bullets[2..], GROWTH_INSIGHTS.as_slice());
    }

    #[test]
    fn decline_uses_the_decline_insights() {
        let dir = tempfile::tempdir().unwrap();
        let options = OutputOptions::under(dir.path());
        options.create_dirs().unwrap();
        let current = subset(PeriodKind::Monthly, "2024-01-31", vec![sale("2024-01-05", 10, "Latte", 10.0)]);
        let previous = subset(PeriodKind::Monthly, "2023-12-31", vec![sale("2023-12-05", 10, "Latte", 40.0)]);

        let composed = compose_period_report(&current, &previous, "January 2024", PeriodKind::Monthly, &options)
            .unwrap()
            .unwrap();

        assert_eq!(composed.summary.trend, Trend::Decrease);
        assert!((composed.summary.change_pct + 75.0).abs() < 1e-9);
        let lines = composed.document.text_lines();
        for insight in DECLINE_INSIGHTS {
            assert!(lines.contains(&insight.to_string()));
        }
        assert!(lines.contains(&"Best Day: 2024-01-05 (RM 10.00)".to_string()));
        assert!(lines.contains(&"Worst Day: 2024-01-05 (RM 10.00)".to_string()));
        assert!(composed.document.headings().contains(&"Best and Worst Days"));
    }

    #[test]
    fn charts_are_written_to_the_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let options = OutputOptions::under(dir.path());
        options.create_dirs().unwrap();
        let current = subset(PeriodKind::Weekly, "2024-01-07", week());
        let previous = subset(PeriodKind::Weekly, "2023-12-31", Vec::new());

        let composed = compose_period_report(&current, &previous, "this week", PeriodKind::Weekly, &options)
            .unwrap()
            .unwrap();

        let embedded: Vec<_> = composed.document.charts().map(|c| c.path().to_path_buf()).collect();
        assert_eq!(
            embedded,
            vec![
                options.line_chart_path(PeriodKind::Weekly),
                options.bar_chart_path(PeriodKind::Weekly)
            ]
        );
        assert_eq!(composed.summary.charts, embedded);
        assert!(embedded.iter().all(|path| path.exists()));
        // No previous revenue means a 0% change, reported as growth.
        assert_eq!(composed.summary.change_pct, 0.0);
        assert_eq!(composed.summary.trend, Trend::Increase);
    }

    #[test]
    fn blank_item_names_drop_the_breakdown_section() {
        let dir = tempfile::tempdir().unwrap();
        let options = OutputOptions::under(dir.path());
        options.create_dirs().unwrap();
        let current = subset(PeriodKind::Weekly, "2024-01-07", vec![sale("2024-01-03", 8, "", 12.0)]);
        let previous = subset(PeriodKind::Weekly, "2023-12-31", Vec::new());

        let composed = compose_period_report(&current, &previous, "this week", PeriodKind::Weekly, &options)
            .unwrap()
            .unwrap();

        assert!(!composed.document.headings().contains(&BREAKDOWN_HEADING));
        assert_eq!(composed.document.charts().count(), 1);
        assert!(!options.bar_chart_path(PeriodKind::Weekly).exists());
    }
}
