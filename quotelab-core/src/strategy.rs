//! Strategy contract — the single callback a trading policy must provide.

use crate::domain::{Market, Portfolio};

/// Opaque failure raised by a strategy callback or factory.
///
/// The engine never inspects it beyond logging; per-step failures are
/// swallowed at the loop boundary, factory failures are fatal.
pub type StrategyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A stateful trading policy, invoked exactly once per batch.
///
/// The strategy receives the market read-only and the portfolio mutably for
/// the duration of one call; it must not retain either across calls. Any
/// number of `buy`/`sell` attempts may be made inside one invocation.
pub trait Strategy {
    fn on_quote(&mut self, market: &Market, portfolio: &mut Portfolio)
        -> Result<(), StrategyError>;
}

/// A policy that never trades. Useful as a baseline and in tests.
#[derive(Debug, Default)]
pub struct FlatStrategy;

impl Strategy for FlatStrategy {
    fn on_quote(&mut self, _market: &Market, _portfolio: &mut Portfolio)
        -> Result<(), StrategyError> {
        Ok(())
    }
}
