//! Data ingestion — raw tabular rows to ordered quote batches.

pub mod batcher;

pub use batcher::{batch_records, load_csv, DataError, TableShape};
