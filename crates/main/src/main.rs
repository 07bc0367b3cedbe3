use std::error::Error;
use std::fs;
use std::path::PathBuf;

use cafe_report::loader::{load_and_clean, LoadReport};
use cafe_report::pipeline::{run_with_rows, RunSummary};
use cafe_report::report::{report_name, ReportOutcome};
use cafe_report::stats::{compute_overall_stats, AggregateResult};
use cafe_report::types::Transaction;
use cafe_report::util::{format_count, format_money, format_orders, format_percent};
use cafe_report::{PeriodKind, ReportConfig};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use serde::Serialize;
use tabled::{Table, Tabled};

const PREVIEW_ROWS: usize = 5;

/// Sales reports for a café point-of-sale export.
///
/// PDF rendering needs a TrueType family: put Roboto-Regular/Bold/Italic/BoldItalic.ttf
/// under `assets/fonts` or point `CAFE_REPORT_FONTS_DIR` (or `--fonts-dir`) at a directory
/// holding them.
#[derive(Parser)]
#[command(author, version, about = "Café sales summaries and period reports")]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Transaction export to read.
    #[arg(long, global = true, default_value = cafe_report::config::DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory the chart PNGs are written to.
    #[arg(long, global = true, default_value = cafe_report::config::DEFAULT_CHARTS_DIR)]
    charts_dir: PathBuf,

    /// Directory the PDF reports are written to.
    #[arg(long, global = true, default_value = cafe_report::config::DEFAULT_REPORTS_DIR)]
    reports_dir: PathBuf,

    /// Directory holding the report font family.
    #[arg(long, global = true)]
    fonts_dir: Option<PathBuf>,

    /// Currency prefix for amounts.
    #[arg(long, global = true, default_value = cafe_report::config::DEFAULT_CURRENCY)]
    currency: String,

    /// Reference date (YYYY-MM-DD); defaults to the latest date in the data.
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Also write the summaries as JSON to this file.
    #[arg(long, global = true)]
    summary_json: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the overall summary and a preview of the cleaned rows.
    Summary,

    /// Build the weekly report.
    Weekly,

    /// Build the monthly report.
    Monthly,

    /// Build every report.
    #[command(aliases = ["run-all", "run_all"])]
    All,
}

impl Commands {
    fn kinds(&self) -> Vec<PeriodKind> {
        match self {
            Commands::Summary => Vec::new(),
            Commands::Weekly => vec![PeriodKind::Weekly],
            Commands::Monthly => vec![PeriodKind::Monthly],
            Commands::All => PeriodKind::ALL.to_vec(),
        }
    }
}

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Hour")]
    hour: u32,
    #[tabled(rename = "Weekday")]
    weekday: String,
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    load: &'a LoadReport,
    overall: Option<&'a AggregateResult>,
    reports: &'a [ReportOutcome],
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(err) = execute(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn Error>> {
    let args = cli.paths;
    let config = ReportConfig {
        input: args.input,
        charts_dir: args.charts_dir,
        reports_dir: args.reports_dir,
        fonts_dir: args.fonts_dir,
        currency: args.currency,
        as_of: args.as_of,
        kinds: cli.command.kinds(),
    };
    log::debug!("Resolved configuration: {:?}", config);

    let (rows, load) = load_and_clean(&config.input)?;

    let summary = if matches!(cli.command, Commands::Summary) {
        let overall = compute_overall_stats(&rows);
        print_overview(&config, overall.as_ref(), &load);
        print_preview(&rows, &config.currency);
        RunSummary {
            load,
            reference_date: None,
            overall,
            outcomes: Vec::new(),
        }
    } else {
        let summary = run_with_rows(&config, &rows, load)?;
        print_outcomes(&summary.outcomes, &config.currency);
        summary
    };

    if let Some(path) = args.summary_json {
        let export = JsonExport {
            load: &summary.load,
            overall: summary.overall.as_ref(),
            reports: &summary.outcomes,
        };
        fs::write(&path, serde_json::to_string_pretty(&export)?)?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

fn print_overview(config: &ReportConfig, overall: Option<&AggregateResult>, load: &LoadReport) {
    println!("☕ Café Automated Sales Report");
    println!("-------------------------------");
    let Some(overall) = overall else {
        println!("No transactions in {}", config.input.display());
        return;
    };
    println!(
        "Total Revenue: {}",
        format_money(&config.currency, overall.total_revenue)
    );
    println!("Total Orders: {}", format_count(overall.total_orders));
    println!("Top-Selling Coffee: {}", overall.top_item);
    println!("Peak Hour: {}:00", overall.peak_hour);
    println!("Busiest Day: {}", overall.busiest_day);
    if load.dropped_amounts > 0 {
        println!(
            "Dropped {} of {} rows with an unusable amount",
            format_count(load.dropped_amounts),
            format_count(load.total_rows)
        );
    }
}

fn print_preview(rows: &[Transaction], currency: &str) {
    if rows.is_empty() {
        return;
    }
    let preview: Vec<PreviewRow> = rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(|row| PreviewRow {
            date: row.date().to_string(),
            hour: row.hour,
            weekday: row.weekday.clone(),
            item: row.item.clone(),
            amount: format_money(currency, row.amount),
        })
        .collect();
    println!();
    println!("{}", Table::new(preview));
}

fn print_outcomes(outcomes: &[ReportOutcome], currency: &str) {
    for outcome in outcomes {
        match outcome {
            ReportOutcome::Written { path, summary } => println!(
                "{} report ({}): {} across {}, {} vs previous {} -> {}",
                report_name(summary.kind),
                summary.label,
                format_money(currency, summary.revenue),
                format_orders(summary.orders),
                format_percent(summary.change_pct),
                summary.kind.unit(),
                path.display()
            ),
            ReportOutcome::Skipped { kind, window } => println!(
                "{} report skipped: no transactions between {} and {}",
                report_name(*kind),
                window.start,
                window.end
            ),
            ReportOutcome::NoData { .. } => println!(
                "{} report skipped: no usable transactions were loaded",
                report_name(outcome.kind())
            ),
        }
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
