//! Batch-by-batch event loop — the heart of the simulation.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error};

use crate::domain::{Batch, InstrumentId, Market, Portfolio};
use crate::strategy::{Strategy, StrategyError};

use super::state::{EngineConfig, EngineError};

/// Single-pass simulation engine.
///
/// Owns the market, the portfolio, and the NAV history for one run; the
/// strategy sees market and portfolio by reference for exactly one callback
/// invocation per batch. After the last batch no further mutation occurs.
pub struct Engine {
    universe: Vec<InstrumentId>,
    market: Market,
    portfolio: Portfolio,
    strategy: Box<dyn Strategy>,
    nav_history: Vec<f64>,
    initial_cash: f64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("universe", &self.universe)
            .field("nav_history", &self.nav_history)
            .field("initial_cash", &self.initial_cash)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine, constructing the strategy through its factory.
    ///
    /// The factory receives the instrument universe. A factory failure is
    /// fatal — the run never starts.
    pub fn new<F>(
        universe: Vec<InstrumentId>,
        strategy_factory: F,
        config: EngineConfig,
    ) -> Result<Self, EngineError>
    where
        F: FnOnce(&[InstrumentId]) -> Result<Box<dyn Strategy>, StrategyError>,
    {
        let strategy = strategy_factory(&universe).map_err(EngineError::Build)?;
        debug!(instruments = universe.len(), "strategy built");

        Ok(Self {
            universe,
            market: Market::new(),
            portfolio: Portfolio::new(config.initial_cash, config.leverage_limit),
            strategy,
            nav_history: vec![config.initial_cash],
            initial_cash: config.initial_cash,
        })
    }

    /// Run the full loop over an ordered batch sequence.
    pub fn run(&mut self, batches: &[Batch]) -> Result<(), EngineError> {
        debug!(batches = batches.len(), "starting simulation run");
        for batch in batches {
            self.process_batch(batch)?;
        }
        Ok(())
    }

    /// Process one batch: market updates, one strategy callback, one NAV sample.
    ///
    /// The strategy call sits inside a fault boundary: both returned errors
    /// and panics are logged and swallowed, so a misbehaving step never aborts
    /// the run. This mirrors the remote evaluator, which isolates per-event
    /// failures instead of failing the whole submission.
    pub fn process_batch(&mut self, batch: &Batch) -> Result<(), EngineError> {
        for event in &batch.events {
            self.market.update(event);
        }

        let Self {
            market,
            portfolio,
            strategy,
            ..
        } = self;
        match catch_unwind(AssertUnwindSafe(|| strategy.on_quote(market, portfolio))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(timestep = %batch.timestep, %err, "strategy error during on_quote");
            }
            Err(payload) => {
                error!(
                    timestep = %batch.timestep,
                    "strategy panicked during on_quote: {}",
                    panic_message(payload.as_ref())
                );
            }
        }

        let nav = self.portfolio.net_asset_value(&self.market)?;
        self.nav_history.push(nav);
        Ok(())
    }

    pub fn universe(&self) -> &[InstrumentId] {
        &self.universe
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// NAV samples: seed value plus one per processed batch.
    pub fn nav_history(&self) -> &[f64] {
        &self.nav_history
    }

    /// Last recorded NAV (the seed value if no batch was processed).
    pub fn final_nav(&self) -> f64 {
        *self
            .nav_history
            .last()
            .expect("nav history is seeded at construction")
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Final NAV minus initial cash.
    pub fn pnl(&self) -> f64 {
        self.final_nav() - self.initial_cash
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
