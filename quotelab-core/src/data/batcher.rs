//! Quote batcher — converts raw CSV rows into time-ordered quote batches.
//!
//! Two tabular shapes are supported, auto-detected from the header row:
//!
//! - **Long**: one row per (timestep, instrument) observation, with a
//!   `product_id` column and a `mid_price` column. Rows are re-sorted by
//!   `(timestep, instrument)` and consecutive equal-timestep runs fold into
//!   one batch each.
//! - **Wide**: one time column plus one column per instrument. Each row
//!   becomes one batch, in file order.
//!
//! Non-numeric, missing, or non-finite price cells are silently skipped; the
//! batch simply omits that instrument for that step. An unreadable file, a
//! missing time column, or zero data rows are fatal.

use csv::StringRecord;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::domain::{Batch, InstrumentId, Quote, Timestep};

/// Recognized time column names, in priority order.
const TIME_COLUMNS: [&str; 2] = ["timestep", "timestamp"];
/// Instrument id column marking the long shape.
const ID_COLUMN: &str = "product_id";
/// Price column used by the long shape.
const PRICE_COLUMN: &str = "mid_price";

/// Which tabular shape was detected for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    Long,
    Wide,
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("input file has no data rows")]
    Empty,

    #[error("no time column found (expected one of: timestep, timestamp)")]
    MissingTimeColumn,
}

/// Read a CSV file and batch it.
///
/// Returns the instrument universe (sorted, deduplicated) and the ordered
/// batch sequence.
pub fn load_csv(path: &Path) -> Result<(Vec<InstrumentId>, Vec<Batch>), DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();
    let rows: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;
    debug!(path = %path.display(), rows = rows.len(), "read input table");
    batch_records(&headers, &rows)
}

/// Batch already-parsed records. Header-driven core of [`load_csv`], usable
/// without file I/O.
pub fn batch_records(
    headers: &StringRecord,
    rows: &[StringRecord],
) -> Result<(Vec<InstrumentId>, Vec<Batch>), DataError> {
    if rows.is_empty() {
        return Err(DataError::Empty);
    }

    let time_idx = TIME_COLUMNS
        .iter()
        .find_map(|name| column_index(headers, name))
        .ok_or(DataError::MissingTimeColumn)?;

    match column_index(headers, ID_COLUMN) {
        Some(id_idx) => {
            debug!(shape = ?TableShape::Long, "detected table shape");
            batch_long(headers, rows, time_idx, id_idx)
        }
        None => {
            debug!(shape = ?TableShape::Wide, "detected table shape");
            batch_wide(headers, rows, time_idx)
        }
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Long shape: group by instrument is implicit — all valid rows are sorted by
/// `(timestep, instrument)` and equal-timestep runs fold into batches.
fn batch_long(
    headers: &StringRecord,
    rows: &[StringRecord],
    time_idx: usize,
    id_idx: usize,
) -> Result<(Vec<InstrumentId>, Vec<Batch>), DataError> {
    let price_idx = column_index(headers, PRICE_COLUMN);

    // Universe is every id observed, whether or not its price cells parse.
    let universe: BTreeSet<InstrumentId> = rows
        .iter()
        .filter_map(|row| row.get(id_idx))
        .map(|id| id.to_string())
        .collect();

    let mut quotes: Vec<Quote> = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(id), Some(ts)) = (row.get(id_idx), row.get(time_idx)) else {
            continue;
        };
        let Some(price) = price_idx
            .and_then(|i| row.get(i))
            .and_then(parse_price)
        else {
            continue;
        };
        quotes.push(Quote::new(id, ts, price));
    }

    quotes.sort_by(|a, b| {
        a.timestep
            .cmp(&b.timestep)
            .then_with(|| a.instrument.cmp(&b.instrument))
    });

    let mut batches = Vec::new();
    let mut current: Vec<Quote> = Vec::new();
    let mut current_ts: Option<Timestep> = None;
    for quote in quotes {
        match &current_ts {
            Some(ts) if *ts == quote.timestep => current.push(quote),
            Some(ts) => {
                if let Some(batch) = Batch::from_quotes(ts.clone(), std::mem::take(&mut current)) {
                    batches.push(batch);
                }
                current_ts = Some(quote.timestep.clone());
                current.push(quote);
            }
            None => {
                current_ts = Some(quote.timestep.clone());
                current.push(quote);
            }
        }
    }
    if let Some(ts) = current_ts {
        if let Some(batch) = Batch::from_quotes(ts, current) {
            batches.push(batch);
        }
    }

    Ok((universe.into_iter().collect(), batches))
}

/// Wide shape: one batch per row, instruments in header order (sorted).
fn batch_wide(
    headers: &StringRecord,
    rows: &[StringRecord],
    time_idx: usize,
) -> Result<(Vec<InstrumentId>, Vec<Batch>), DataError> {
    let mut instrument_cols: Vec<(InstrumentId, usize)> = headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != time_idx)
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();
    instrument_cols.sort_by(|a, b| a.0.cmp(&b.0));

    let universe: Vec<InstrumentId> = instrument_cols.iter().map(|(id, _)| id.clone()).collect();

    let mut batches = Vec::new();
    for row in rows {
        let Some(ts) = row.get(time_idx) else {
            continue;
        };
        let quotes: Vec<Quote> = instrument_cols
            .iter()
            .filter_map(|(id, idx)| {
                let price = row.get(*idx).and_then(parse_price)?;
                Some(Quote::new(id.clone(), ts, price))
            })
            .collect();
        // A row with zero valid cells emits no batch at all.
        if let Some(batch) = Batch::from_quotes(ts.to_string(), quotes) {
            batches.push(batch);
        }
    }

    Ok((universe, batches))
}

/// Parse a price cell; empty, non-numeric, and non-finite cells are skips.
fn parse_price(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|p| p.is_finite())
}
