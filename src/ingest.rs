//! Reading fixes from CSV
//!
//! Rows are headerless and read by position (see [`DataColumns`]). A row
//! that does not parse is logged and skipped; a header row is recognised
//! the same way and skipped quietly.

use crate::cluster::Fix;
use crate::config::DataColumns;
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

/// Fixes read from a file, plus how many rows were skipped as malformed
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub fixes: Vec<Fix>,
    pub rejected: usize,
}

/// Reads every parseable fix from a CSV file
pub fn read_fixes<P: AsRef<Path>>(path: P, columns: &DataColumns) -> Result<Ingested> {
    let file = File::open(path.as_ref())?;
    let ingested = read_fixes_from(file, columns)?;
    debug!(
        path = ?path.as_ref(),
        fixes = ingested.fixes.len(),
        rejected = ingested.rejected,
        "read fix data"
    );
    Ok(ingested)
}

/// Reads every parseable fix from any CSV source
pub fn read_fixes_from<R: Read>(source: R, columns: &DataColumns) -> Result<Ingested> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let mut ingested = Ingested::default();

    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "CSV row could not be read, skipped");
                ingested.rejected += 1;
                continue;
            }
        };

        match parse_row(&record, columns) {
            Ok(fix) => ingested.fixes.push(fix),
            Err(e) if row == 0 => debug!(error = %e, "first row is not data, treating as header"),
            Err(e) => {
                warn!(error = %e, "CSV row doesn't look like data, skipped");
                ingested.rejected += 1;
            }
        }
    }

    Ok(ingested)
}

/// Turns one CSV row into a fix
pub fn parse_row(record: &StringRecord, columns: &DataColumns) -> Result<Fix> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let bad_row = |reason: String| Error::BadRow { line, reason };

    let field = |index: usize| {
        record.get(index).ok_or_else(|| {
            bad_row(format!(
                "expected at least {} columns, found {}",
                index + 1,
                record.len()
            ))
        })
    };

    let id = field(columns.id)?;
    let animal_id = field(columns.animal_id)?;
    let timestamp = field(columns.timestamp)?;
    let datetime = parse_timestamp(timestamp)
        .ok_or_else(|| bad_row(format!("unparseable timestamp {timestamp:?}")))?;
    let y = parse_coordinate(field(columns.northing)?).map_err(&bad_row)?;
    let x = parse_coordinate(field(columns.easting)?).map_err(&bad_row)?;

    Ok(Fix::new(id, animal_id, datetime, x, y))
}

fn parse_coordinate(value: &str) -> std::result::Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("unparseable coordinate {value:?}"))
}

/// Parses a timestamp; date-only values fall at midnight
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    parse_with_default_time(value, NaiveTime::MIN)
}

/// Parses a timestamp; date-only values fall at `default_time`
pub fn parse_with_default_time(value: &str, default_time: NaiveTime) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(|date| date.and_time(default_time))
        })
}

/// Parses a date given on the command line or in the config file
///
/// An empty value or `"0"` means "no date".
pub fn parse_date_argument(value: &str) -> Result<Option<NaiveDateTime>> {
    let value = value.trim();
    if value.is_empty() || value == "0" {
        return Ok(None);
    }
    parse_timestamp(value)
        .map(Some)
        .ok_or_else(|| Error::BadDate(value.to_string()))
}
