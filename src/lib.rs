//! Core entry point for the cafe_report crate.

pub mod builder;
pub mod charts;
pub mod config;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod richtext;
pub mod stats;
pub mod types;
pub mod util;
pub mod window;

pub use config::{OutputOptions, ReportConfig};
pub use error::{ChartError, ParseError, PdfBuildError, ReportError};
pub use pipeline::{run, RunSummary};
pub use report::{build_period_report, compose_period_report, ReportOutcome};
pub use window::PeriodKind;
