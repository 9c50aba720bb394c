//! Simulation engine — batch-by-batch event loop and supporting types.
//!
//! The engine consumes ordered quote batches (from the batcher) and runs the
//! three-phase loop per batch:
//!
//! 1. Apply every event to the market (clock markers are no-ops)
//! 2. Invoke the strategy callback once, inside a fault boundary
//! 3. Append the portfolio NAV to the history

pub mod loop_runner;
pub mod state;

pub use loop_runner::Engine;
pub use state::{EngineConfig, EngineError};
