//! Built-in example strategies, selectable from the `[strategy]` config.
//!
//! These mirror the example traders shipped with the submission template:
//! a do-nothing baseline, a fixed-threshold trader, and a rolling-mean
//! crossover trader. Real strategy development happens against the
//! [`Strategy`] trait directly; the presets exist so the CLI can run a full
//! simulation out of the box.

use quotelab_core::domain::{InstrumentId, Market, Portfolio};
use quotelab_core::strategy::{FlatStrategy, Strategy, StrategyError};

use crate::config::StrategyConfig;

/// Build the configured preset for a universe.
///
/// Fails if the preset needs an instrument and neither the config nor the
/// universe provides one; the engine treats that as a fatal build error.
pub fn build_preset(
    config: &StrategyConfig,
    universe: &[InstrumentId],
) -> Result<Box<dyn Strategy>, StrategyError> {
    match config {
        StrategyConfig::Flat => Ok(Box::new(FlatStrategy)),
        StrategyConfig::Threshold {
            instrument,
            buy_below,
            sell_above,
            quantity,
        } => Ok(Box::new(ThresholdTrader {
            instrument: pick_instrument(instrument.as_deref(), universe)?,
            buy_below: *buy_below,
            sell_above: *sell_above,
            quantity: *quantity,
        })),
        StrategyConfig::RollingMean {
            instrument,
            window,
            quantity,
        } => Ok(Box::new(RollingMeanTrader {
            instrument: pick_instrument(instrument.as_deref(), universe)?,
            window: *window,
            quantity: *quantity,
            history: Vec::new(),
        })),
    }
}

fn pick_instrument(
    configured: Option<&str>,
    universe: &[InstrumentId],
) -> Result<InstrumentId, StrategyError> {
    match configured {
        Some(id) => Ok(id.to_string()),
        None => universe
            .first()
            .cloned()
            .ok_or_else(|| "cannot pick an instrument from an empty universe".into()),
    }
}

/// Buys below a floor price when not long, sells above a ceiling when not
/// short. The leverage gate naturally caps how far it can pile in.
#[derive(Debug)]
pub struct ThresholdTrader {
    instrument: InstrumentId,
    buy_below: f64,
    sell_above: f64,
    quantity: i64,
}

impl Strategy for ThresholdTrader {
    fn on_quote(
        &mut self,
        market: &Market,
        portfolio: &mut Portfolio,
    ) -> Result<(), StrategyError> {
        // No quote yet for our instrument this early in the run: do nothing.
        if !market.has_quote(&self.instrument) {
            return Ok(());
        }
        let price = market.price_of(&self.instrument)?;
        let position = portfolio.position(&self.instrument);

        if position <= 0 && price < self.buy_below {
            portfolio.buy(market, &self.instrument, self.quantity)?;
        } else if position >= 0 && price > self.sell_above {
            portfolio.sell(market, &self.instrument, self.quantity)?;
        }
        Ok(())
    }
}

/// Rolling-mean crossover: compares the mean of the last `window` prices to
/// the mean of the full history and trades toward the short-term trend.
#[derive(Debug)]
pub struct RollingMeanTrader {
    instrument: InstrumentId,
    window: usize,
    quantity: i64,
    history: Vec<f64>,
}

impl Strategy for RollingMeanTrader {
    fn on_quote(
        &mut self,
        market: &Market,
        portfolio: &mut Portfolio,
    ) -> Result<(), StrategyError> {
        if !market.has_quote(&self.instrument) {
            return Ok(());
        }
        let price = market.price_of(&self.instrument)?;
        self.history.push(price);

        if self.history.len() < self.window {
            return Ok(());
        }

        let full_mean = crate::metrics::mean(&self.history);
        let window_mean =
            crate::metrics::mean(&self.history[self.history.len() - self.window..]);

        if full_mean < window_mean {
            portfolio.buy(market, &self.instrument, self.quantity)?;
        } else if full_mean > window_mean {
            portfolio.sell(market, &self.instrument, self.quantity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotelab_core::domain::{MarketEvent, Quote};

    fn market_at(instrument: &str, price: f64) -> Market {
        let mut market = Market::new();
        market.update(&MarketEvent::Quote(Quote::new(instrument, "t0", price)));
        market
    }

    #[test]
    fn threshold_buys_below_floor() {
        let market = market_at("X", 2.5);
        let mut portfolio = Portfolio::new(100_000.0, 10.0);
        let mut trader = ThresholdTrader {
            instrument: "X".into(),
            buy_below: 3.0,
            sell_above: 4.5,
            quantity: 100,
        };

        trader.on_quote(&market, &mut portfolio).unwrap();
        assert_eq!(portfolio.position("X"), 100);

        // Already long: a second cheap quote does not add.
        trader.on_quote(&market, &mut portfolio).unwrap();
        assert_eq!(portfolio.position("X"), 100);
    }

    #[test]
    fn threshold_sells_above_ceiling() {
        let market = market_at("X", 5.0);
        let mut portfolio = Portfolio::new(100_000.0, 10.0);
        let mut trader = ThresholdTrader {
            instrument: "X".into(),
            buy_below: 3.0,
            sell_above: 4.5,
            quantity: 100,
        };

        trader.on_quote(&market, &mut portfolio).unwrap();
        assert_eq!(portfolio.position("X"), -100);
    }

    #[test]
    fn threshold_waits_for_first_quote() {
        let market = Market::new();
        let mut portfolio = Portfolio::new(100_000.0, 10.0);
        let mut trader = ThresholdTrader {
            instrument: "X".into(),
            buy_below: 3.0,
            sell_above: 4.5,
            quantity: 100,
        };

        trader.on_quote(&market, &mut portfolio).unwrap();
        assert!(portfolio.positions().is_empty());
    }

    #[test]
    fn rolling_mean_needs_a_full_window() {
        let market = market_at("X", 10.0);
        let mut portfolio = Portfolio::new(100_000.0, 10.0);
        let mut trader = RollingMeanTrader {
            instrument: "X".into(),
            window: 3,
            quantity: 10,
            history: Vec::new(),
        };

        trader.on_quote(&market, &mut portfolio).unwrap();
        trader.on_quote(&market, &mut portfolio).unwrap();
        assert!(portfolio.positions().is_empty());
    }

    #[test]
    fn preset_defaults_to_first_universe_instrument() {
        let config = StrategyConfig::Threshold {
            instrument: None,
            buy_below: 3.0,
            sell_above: 4.5,
            quantity: 10,
        };
        assert!(build_preset(&config, &["A".to_string()]).is_ok());
        assert!(build_preset(&config, &[]).is_err());
    }
}
