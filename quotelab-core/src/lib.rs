//! QuoteLab Core — deterministic quote-replay simulation engine.
//!
//! This crate contains the heart of the local evaluation harness:
//! - Domain types (quotes, market events, batches)
//! - Market price cache keyed by instrument id
//! - Leverage-constrained portfolio ledger with all-or-nothing trades
//! - Quote batcher that turns raw CSV rows into ordered simulation steps
//! - Batch-by-batch event loop with per-step fault isolation

pub mod data;
pub mod domain;
pub mod engine;
pub mod strategy;
