//! Simulation runner — wires together batcher, engine, and metrics.
//!
//! Two entry points:
//! - `run_simulation()`: builds the strategy preset named in the config. Used
//!   by the CLI.
//! - `run_simulation_with_factory()`: takes a caller-supplied strategy
//!   factory. Used by strategy authors embedding the harness.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use quotelab_core::data::{load_csv, DataError};
use quotelab_core::domain::InstrumentId;
use quotelab_core::engine::{Engine, EngineConfig, EngineError};
use quotelab_core::strategy::{Strategy, StrategyError};

use crate::config::SimConfig;
use crate::metrics::sharpe_ratio;
use crate::presets::build_preset;
use crate::result::{SimResult, SCHEMA_VERSION};

/// Errors from the runner. All of these are fatal for the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Run a full simulation with the preset strategy named in the config.
pub fn run_simulation(config: &SimConfig) -> Result<SimResult, RunError> {
    let strategy_config = config.strategy.clone();
    run_simulation_with_factory(config, move |universe: &[InstrumentId]| {
        build_preset(&strategy_config, universe)
    })
}

/// Run a full simulation with a caller-supplied strategy factory.
///
/// The factory receives the instrument universe discovered in the data file.
/// A factory failure aborts the run before any batch is processed; per-step
/// strategy failures are swallowed inside the engine loop.
pub fn run_simulation_with_factory<F>(
    config: &SimConfig,
    strategy_factory: F,
) -> Result<SimResult, RunError>
where
    F: FnOnce(&[InstrumentId]) -> Result<Box<dyn Strategy>, StrategyError>,
{
    let sim = &config.simulation;
    let (universe, batches) = load_csv(&sim.data_path)?;
    debug!(
        instruments = universe.len(),
        batches = batches.len(),
        "data batched"
    );

    let engine_config = EngineConfig::new(sim.initial_cash, sim.leverage_limit);
    let mut engine = Engine::new(universe.clone(), strategy_factory, engine_config)?;
    engine.run(&batches)?;

    let sharpe = sharpe_ratio(engine.nav_history(), sim.periods_per_year);
    let result = SimResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        universe,
        initial_cash: sim.initial_cash,
        final_nav: engine.final_nav(),
        pnl: engine.pnl(),
        sharpe,
        nav_history: engine.nav_history().to_vec(),
        batch_count: batches.len(),
        completed_at: Utc::now().to_rfc3339(),
    };
    info!(
        final_nav = result.final_nav,
        pnl = result.pnl,
        sharpe = result.sharpe,
        "simulation complete"
    );
    Ok(result)
}
