//! Serializable run configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Full configuration for a single simulation run.
///
/// Captures everything needed to reproduce the run: the input data file, the
/// portfolio seed parameters, the annualization convention, and the strategy
/// preset. Two identical configs hash to the same [`RunId`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub strategy: StrategyConfig,
}

/// The `[simulation]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Path to the input CSV (long or wide shape, auto-detected).
    pub data_path: PathBuf,

    /// Starting cash for the portfolio.
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,

    /// Maximum gross exposure / NAV ratio.
    #[serde(default = "default_leverage_limit")]
    pub leverage_limit: f64,

    /// Annualization constant for the Sharpe ratio (252 = trading days).
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
}

fn default_initial_cash() -> f64 {
    100_000.0
}

fn default_leverage_limit() -> f64 {
    10.0
}

fn default_periods_per_year() -> u32 {
    252
}

/// The `[strategy]` section — which built-in preset to run.
///
/// Library users bypass this entirely by supplying their own factory to
/// [`crate::runner::run_simulation_with_factory`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    /// Never trades. The NAV history stays at the initial cash.
    Flat,

    /// Buy below / sell above fixed price thresholds on one instrument.
    Threshold {
        /// Instrument to trade; defaults to the first of the universe.
        instrument: Option<String>,
        buy_below: f64,
        sell_above: f64,
        quantity: i64,
    },

    /// Trades on a rolling-mean vs. full-history-mean crossover.
    RollingMean {
        /// Instrument to trade; defaults to the first of the universe.
        instrument: Option<String>,
        window: usize,
        quantity: i64,
    },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::Flat
    }
}

impl SimConfig {
    /// Minimal config over a data file, with every default applied.
    pub fn for_data(data_path: impl Into<PathBuf>) -> Self {
        Self {
            simulation: SimulationConfig {
                data_path: data_path.into(),
                initial_cash: default_initial_cash(),
                leverage_limit: default_leverage_limit(),
                periods_per_year: default_periods_per_year(),
            },
            strategy: StrategyConfig::default(),
        }
    }

    /// Load from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a RunId, so result artifacts
    /// from repeated runs land on the same file.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("SimConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
[simulation]
data_path = "data/comp_data.csv"
"#,
        )
        .unwrap();

        assert_eq!(config.simulation.initial_cash, 100_000.0);
        assert_eq!(config.simulation.leverage_limit, 10.0);
        assert_eq!(config.simulation.periods_per_year, 252);
        assert_eq!(config.strategy, StrategyConfig::Flat);
    }

    #[test]
    fn parses_strategy_section() {
        let config: SimConfig = toml::from_str(
            r#"
[simulation]
data_path = "quotes.csv"
initial_cash = 50000.0

[strategy]
type = "THRESHOLD"
buy_below = 3.0
sell_above = 4.5
quantity = 10000
"#,
        )
        .unwrap();

        assert_eq!(config.simulation.initial_cash, 50_000.0);
        assert_eq!(
            config.strategy,
            StrategyConfig::Threshold {
                instrument: None,
                buy_below: 3.0,
                sell_above: 4.5,
                quantity: 10_000,
            }
        );
    }

    #[test]
    fn unknown_preset_type_is_a_parse_error() {
        let result: Result<SimConfig, _> = toml::from_str(
            r#"
[simulation]
data_path = "quotes.csv"

[strategy]
type = "MYSTERY"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn run_id_is_deterministic_and_config_sensitive() {
        let config = SimConfig::for_data("a.csv");
        assert_eq!(config.run_id(), config.run_id());

        let mut other = config.clone();
        other.simulation.leverage_limit = 2.0;
        assert_ne!(config.run_id(), other.run_id());
    }
}
