//! QuoteLab Runner — orchestrates a full simulation from config to result.
//!
//! - `config`: TOML run configuration with content-addressed run ids
//! - `runner`: loads data, wires the engine, computes metrics
//! - `metrics`: pure performance-metric functions (Sharpe ratio)
//! - `presets`: built-in example strategies selectable from config
//! - `result`: serializable run result plus JSON/CSV export

pub mod config;
pub mod metrics;
pub mod presets;
pub mod result;
pub mod runner;

pub use config::{ConfigError, SimConfig, StrategyConfig};
pub use result::{export_json, export_nav_csv, import_json, save_artifacts, SimResult, SCHEMA_VERSION};
pub use runner::{run_simulation, run_simulation_with_factory, RunError};
