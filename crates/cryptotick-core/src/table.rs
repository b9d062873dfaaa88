//! Flat-file artifacts: the combined price table and the merged metric table.
//!
//! Both are comma separated with a header row whose first column is `Date`.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::metrics::MetricsTable;
use crate::CandleSeries;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to create '{}': {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to format date: {0}")]
    DateFormat(#[from] time::error::Format),
}

/// One row of `base_data.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    #[serde(rename = "Date")]
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub name: String,
}

/// Flattens series into tagged rows, series by series, oldest first.
pub fn price_rows(series: &[CandleSeries]) -> Vec<PriceRow> {
    series
        .iter()
        .flat_map(|one| {
            let name = one.symbol.to_string();
            one.candles.iter().map(move |candle| PriceRow {
                date: candle.ts.format_rfc3339(),
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: candle.volume,
                name: name.clone(),
            })
        })
        .collect()
}

/// Writes the price table and returns the number of data rows.
pub fn write_price_table<W: Write>(writer: W, series: &[CandleSeries]) -> Result<usize, TableError> {
    let mut csv = csv::Writer::from_writer(writer);
    let rows = price_rows(series);
    if rows.is_empty() {
        csv.write_record(["Date", "open", "high", "low", "close", "volume", "name"])?;
    }
    for row in &rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(rows.len())
}

/// Writes the metric table and returns the number of data rows.
pub fn write_metrics_table<W: Write>(writer: W, table: &MetricsTable) -> Result<usize, TableError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.metrics().len() + 1);
    header.push("Date");
    header.extend(table.metrics().iter().map(String::as_str));
    csv.write_record(&header)?;

    // Cells go through the serializer so floats render like the price table
    // and missing cells stay empty.
    for (day, cells) in table.rows() {
        csv.write_field(format_date(*day)?)?;
        csv.serialize(cells)?;
    }

    csv.flush()?;
    Ok(table.len())
}

pub fn write_price_csv(path: &Path, series: &[CandleSeries]) -> Result<usize, TableError> {
    write_price_table(create(path)?, series)
}

pub fn write_metrics_csv(path: &Path, table: &MetricsTable) -> Result<usize, TableError> {
    write_metrics_table(create(path)?, table)
}

pub fn format_date(day: Date) -> Result<String, TableError> {
    Ok(day.format(DATE_FORMAT)?)
}

fn create(path: &Path) -> Result<File, TableError> {
    File::create(path).map_err(|source| TableError::Create {
        path: path.to_owned(),
        source,
    })
}
