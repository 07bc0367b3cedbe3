//! Loading and cleaning of the till export.

use std::path::Path;

use chrono::Timelike;
use csv::ReaderBuilder;
use log::{debug, info};
use serde::Serialize;

use crate::error::ParseError;
use crate::types::{RawRow, Transaction, REQUIRED_COLUMNS};
use crate::util::{parse_amount, parse_date, parse_hour, parse_time};

/// Counters describing what cleaning did to the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_amounts: usize,
}

/// Reads `path`, coerces the amount column and drops rows without a usable amount.
///
/// Any other defect (unreadable file, missing column, bad date or hour) aborts the load.
pub fn load_and_clean(
    path: impl AsRef<Path>,
) -> Result<(Vec<Transaction>, LoadReport), ParseError> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = rdr
        .headers()
        .map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !headers.iter().any(|h| h == **name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut report = LoadReport::default();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|source| ParseError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        report.total_rows += 1;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|source| ParseError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let Some(amount) = parse_amount(raw.money.as_deref()) else {
            debug!("line {}: dropping row with amount {:?}", line, raw.money);
            report.dropped_amounts += 1;
            continue;
        };

        let date = parse_date(raw.date.as_deref()).ok_or_else(|| ParseError::InvalidDate {
            line,
            value: raw.date.clone().unwrap_or_default(),
        })?;
        let hour = parse_hour(raw.hour_of_day.as_deref()).ok_or_else(|| ParseError::InvalidHour {
            line,
            value: raw.hour_of_day.clone().unwrap_or_default(),
        })?;

        // Prefer the explicit time column, then a time embedded in the date, then the hour.
        let timestamp = match parse_time(raw.time.as_deref()) {
            Some(time) => date.date().and_time(time),
            None if date.time().num_seconds_from_midnight() != 0 => date,
            None => date.date().and_hms_opt(hour, 0, 0).unwrap_or(date),
        };

        rows.push(Transaction {
            timestamp,
            item: raw.coffee_name.unwrap_or_default().trim().to_string(),
            amount,
            hour,
            weekday: raw.weekday.unwrap_or_default().trim().to_string(),
        });
    }

    report.kept_rows = rows.len();
    info!(
        "Loaded {} rows from {} ({} kept, {} dropped for unparseable amounts)",
        report.total_rows,
        path.display(),
        report.kept_rows,
        report.dropped_amounts
    );
    Ok((rows, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        write_csv_bytes(contents.as_bytes())
    }

    fn write_csv_bytes(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp csv");
        file.write_all(contents).expect("write temp csv");
        file
    }

    const HEADER: &str = "hour_of_day,cash_type,money,coffee_name,Weekday,Date,Time\n";

    #[test]
    fn drops_rows_with_unparseable_amounts() {
        let file = write_csv(&format!(
            "{HEADER}8,card,10,Latte,Mon,2024-01-01,08:05:00.000000\n\
             9,card,bad,Latte,Tue,2024-01-02,09:10:00.000000\n\
             9,card,15,Mocha,Tue,2024-01-02,09:40:00.000000\n"
        ));

        let (rows, report) = load_and_clean(file.path()).expect("load succeeds");
        assert_eq!(rows.len(), 2);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.dropped_amounts, 1);
        let revenue: f64 = rows.iter().map(|r| r.amount).sum();
        assert_eq!(revenue, 25.0);
        assert_eq!(rows[1].item, "Mocha");
        assert_eq!(rows[1].timestamp.to_string(), "2024-01-02 09:40:00");
    }

    #[test]
    fn falls_back_to_hour_when_time_is_absent() {
        let file = write_csv(
            "money,coffee_name,Date,hour_of_day,Weekday\n\
             4.5,Americano,2024-02-10,14,Sat\n",
        );
        let (rows, _) = load_and_clean(file.path()).expect("load succeeds");
        assert_eq!(rows[0].timestamp.to_string(), "2024-02-10 14:00:00");
        assert_eq!(rows[0].hour, 14);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let file = write_csv("money,coffee_name,Date\n10,Latte,2024-01-01\n");
        let err = load_and_clean(file.path()).unwrap_err();
        match err {
            ParseError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["hour_of_day".to_string(), "Weekday".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_and_clean(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, ParseError::Open { .. }));
    }

    #[test]
    fn invalid_date_is_fatal() {
        let file = write_csv(&format!("{HEADER}8,card,10,Latte,Mon,someday,08:00:00\n"));
        let err = load_and_clean(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { line: 2, .. }));
    }

    #[test]
    fn hour_outside_the_day_is_fatal() {
        let file = write_csv(&format!(
            "{HEADER}8,card,10,Latte,Mon,2024-01-01,08:00:00\n\
             24,card,12,Mocha,Mon,2024-01-01,23:59:00\n"
        ));
        let err = load_and_clean(file.path()).unwrap_err();
        match err {
            ParseError::InvalidHour { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "24");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_utf8_record_is_malformed() {
        let mut contents = HEADER.as_bytes().to_vec();
        contents.extend_from_slice(b"8,card,10,Latte,Mon,2024-01-01,08:00:00\n");
        contents.extend_from_slice(b"9,card,12,\xff\xfe,Mon,2024-01-01,09:00:00\n");
        let file = write_csv_bytes(&contents);

        let err = load_and_clean(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }
}
