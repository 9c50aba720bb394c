//! QuoteLab CLI — run a local evaluation the way the remote evaluator would.
//!
//! Commands:
//! - `run` — replay a quote CSV through a strategy preset and print metrics

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotelab_runner::config::{SimConfig, StrategyConfig};
use quotelab_runner::{run_simulation, save_artifacts};

#[derive(Parser)]
#[command(
    name = "quotelab",
    about = "QuoteLab CLI — deterministic quote-replay backtesting harness"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a quote CSV through a strategy and report NAV, PnL, and Sharpe.
    Run {
        /// Path to a TOML run config. Other flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input CSV (long or wide shape, auto-detected). Required unless
        /// the config file provides it.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Built-in preset when no config file names one: flat, threshold,
        /// rolling-mean.
        #[arg(long)]
        preset: Option<String>,

        /// Starting cash.
        #[arg(long)]
        initial_cash: Option<f64>,

        /// Maximum gross exposure / NAV ratio.
        #[arg(long)]
        leverage_limit: Option<f64>,

        /// Annualization constant for the Sharpe ratio.
        #[arg(long)]
        periods_per_year: Option<u32>,

        /// Output directory for result artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data,
            preset,
            initial_cash,
            leverage_limit,
            periods_per_year,
            output_dir,
        } => cmd_run(
            config,
            data,
            preset,
            initial_cash,
            leverage_limit,
            periods_per_year,
            output_dir,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    config_path: Option<PathBuf>,
    data: Option<PathBuf>,
    preset: Option<String>,
    initial_cash: Option<f64>,
    leverage_limit: Option<f64>,
    periods_per_year: Option<u32>,
    output_dir: PathBuf,
) -> Result<()> {
    let mut config = match (&config_path, &data) {
        (Some(path), _) => SimConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(data_path)) => SimConfig::for_data(data_path),
        (None, None) => anyhow::bail!("either --config or --data is required"),
    };

    if let Some(data_path) = data {
        config.simulation.data_path = data_path;
    }
    if let Some(cash) = initial_cash {
        config.simulation.initial_cash = cash;
    }
    if let Some(limit) = leverage_limit {
        config.simulation.leverage_limit = limit;
    }
    if let Some(ppy) = periods_per_year {
        config.simulation.periods_per_year = ppy;
    }
    if let Some(name) = preset {
        config.strategy = preset_by_name(&name)?;
    }

    let result = run_simulation(&config).context("simulation failed")?;

    println!("--- Local Evaluation Metrics ---");
    println!("Final NAV:         {:>14.2}", result.final_nav);
    println!("Total PnL:         {:>14.2}", result.pnl);
    println!("Annualized Sharpe: {:>14.4}", result.sharpe);

    let json_path = save_artifacts(&result, &output_dir)?;
    info!(path = %json_path.display(), "artifacts saved");
    Ok(())
}

/// Map a `--preset` name to a strategy config with its stock parameters.
fn preset_by_name(name: &str) -> Result<StrategyConfig> {
    match name {
        "flat" => Ok(StrategyConfig::Flat),
        "threshold" => Ok(StrategyConfig::Threshold {
            instrument: None,
            buy_below: 3.0,
            sell_above: 4.5,
            quantity: 10_000,
        }),
        "rolling-mean" => Ok(StrategyConfig::RollingMean {
            instrument: None,
            window: 10,
            quantity: 100,
        }),
        other => anyhow::bail!("unknown preset '{other}' (expected: flat, threshold, rolling-mean)"),
    }
}
