//! Error types shared across the loading, charting and rendering layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures while reading and cleaning the transaction export.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be opened or its header row could not be read.
    #[error("failed to read {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A record could not be decoded as CSV.
    #[error("malformed CSV record in {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// One or more required columns are absent from the header row.
    #[error("{} is missing required column(s): {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    /// The date column holds a value none of the accepted formats match.
    #[error("line {line}: cannot parse date {value:?}")]
    InvalidDate { line: u64, value: String },

    /// The hour-of-day column is not an integer between 0 and 23.
    #[error("line {line}: hour of day {value:?} is not in 0..=23")]
    InvalidHour { line: u64, value: String },
}

/// Failures while encoding or writing a chart image.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to encode chart image")]
    Encode(#[from] image::ImageError),

    #[error("failed to write chart to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while flushing a [`crate::model::ReportDocument`] into PDF bytes.
#[derive(Debug, Error)]
pub enum PdfBuildError {
    /// No usable font family could be located.
    #[error("unable to load fonts")]
    FontLoad(#[source] genpdf::error::Error),

    /// A chart image referenced by the document could not be embedded.
    #[error("failed to embed image {}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },

    /// Layout or serialization of the document failed.
    #[error("failed to render PDF")]
    Render(#[source] genpdf::error::Error),
}

/// Top-level error for a reporting run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Pdf(#[from] PdfBuildError),

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
