//! Engine configuration and error types.

use crate::domain::NoQuoteError;
use crate::strategy::StrategyError;

/// Configuration for a single simulation run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub initial_cash: f64,
    /// Maximum gross exposure / NAV ratio the portfolio will accept.
    pub leverage_limit: f64,
}

impl EngineConfig {
    pub fn new(initial_cash: f64, leverage_limit: f64) -> Self {
        Self {
            initial_cash,
            leverage_limit,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            leverage_limit: 10.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The strategy factory failed; fatal, the run never starts.
    #[error("failed to build strategy: {0}")]
    Build(StrategyError),

    /// A held position lost its market quote at NAV time. This cannot happen
    /// through engine-driven trades (a position requires a quote to open, and
    /// the market never forgets one), so it signals ledger corruption.
    #[error(transparent)]
    NoQuote(#[from] NoQuoteError),
}
