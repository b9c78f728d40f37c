use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use common::{BacktestError, Result};
use serde::Deserialize;

use super::PriceSeries;

/// Load prices from a CSV file
///
/// The close is read from a `close` column (`adj close` is preferred when
/// present); without either, the last column is used. The first column is
/// taken as the date when every row parses as one.
pub fn load_csv(path: &Path) -> Result<PriceSeries> {
    let file = File::open(path).map_err(|e| BacktestError::DataLoadError(e.to_string()))?;
    read_csv(BufReader::new(file))
}

fn read_csv<R: Read>(reader: R) -> Result<PriceSeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| BacktestError::CsvError(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(BacktestError::CsvError("missing header row".to_string()));
    }

    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let close_idx = find("adj close")
        .or_else(|| find("close"))
        .unwrap_or(headers.len() - 1);

    let mut closes = Vec::new();
    let mut dates = Vec::new();
    let mut all_dated = close_idx != 0;

    for (row, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| BacktestError::CsvError(e.to_string()))?;

        let raw = record.get(close_idx).ok_or_else(|| {
            BacktestError::CsvError(format!("row {}: missing close column", row + 1))
        })?;
        let close: f64 = raw.parse().map_err(|_| {
            BacktestError::CsvError(format!("row {}: invalid close price {:?}", row + 1, raw))
        })?;
        closes.push(close);

        if all_dated {
            match record.get(0).and_then(|s| parse_date(s).ok()) {
                Some(date) => dates.push(date),
                None => all_dated = false,
            }
        }
    }

    if !all_dated {
        dates.clear();
    }

    Ok(PriceSeries { dates, closes })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPrices {
    Plain(Vec<f64>),
    Dated(Vec<DatedClose>),
}

#[derive(Deserialize)]
struct DatedClose {
    date: String,
    close: f64,
}

/// Load prices from a JSON file
///
/// Accepts either a bare array of prices or an array of
/// `{"date": ..., "close": ...}` objects.
pub fn load_json(path: &Path) -> Result<PriceSeries> {
    let file = File::open(path).map_err(|e| BacktestError::DataLoadError(e.to_string()))?;
    let parsed: JsonPrices = serde_json::from_reader(BufReader::new(file))?;
    from_json(parsed)
}

fn from_json(parsed: JsonPrices) -> Result<PriceSeries> {
    match parsed {
        JsonPrices::Plain(closes) => Ok(PriceSeries {
            dates: vec![],
            closes,
        }),
        JsonPrices::Dated(rows) => {
            let mut series = PriceSeries::default();
            for row in rows {
                series.dates.push(parse_date(&row.date)?);
                series.closes.push(row.close);
            }
            Ok(series)
        }
    }
}

/// Parse a date from various formats
fn parse_date(s: &str) -> Result<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
    for fmt in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in &date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Try Unix timestamp (seconds)
    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt.date_naive());
        }
    }

    Err(BacktestError::CsvError(format!(
        "Unable to parse date: {}",
        s
    )))
}
