//! Portfolio — cash + position ledger with a leverage ceiling on every trade.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use super::{InstrumentId, Market, NoQuoteError};

/// Floor applied to NAV in the leverage denominator to guard division by
/// a near-zero (or negative) net asset value.
const NAV_FLOOR: f64 = 1e-8;

/// Side of an attempted trade, for log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TradeSide {
    Buy,
    Sell,
}

/// Cash + signed integer positions, gated by a leverage limit.
///
/// The accounting identity holds at every step:
/// `net_asset_value == cash + sum(quantity * last price)`.
///
/// Every `buy`/`sell` is atomic: the hypothetical post-trade state is checked
/// against the leverage limit first, and state changes only if the check
/// passes. Sells may take a position negative (shorts are allowed).
///
/// The ledger holds no market handle; the [`Market`] stays owned by the
/// engine and is passed into each operation that needs prices.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    positions: HashMap<InstrumentId, i64>,
    pub leverage_limit: f64,
}

/// Read-only snapshot of the ledger, for reporting and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub cash: f64,
    pub positions: HashMap<InstrumentId, i64>,
    pub gross_exposure: f64,
    pub net_asset_value: f64,
    pub leverage: f64,
}

impl Portfolio {
    pub fn new(cash: f64, leverage_limit: f64) -> Self {
        Self {
            cash,
            positions: HashMap::new(),
            leverage_limit,
        }
    }

    /// Signed quantity held for an instrument (0 if absent).
    pub fn position(&self, instrument: &str) -> i64 {
        self.positions.get(instrument).copied().unwrap_or(0)
    }

    /// All non-zero entries of the position ledger.
    pub fn positions(&self) -> &HashMap<InstrumentId, i64> {
        &self.positions
    }

    /// Sum of |quantity| * last price over all held positions.
    pub fn gross_exposure(&self, market: &Market) -> Result<f64, NoQuoteError> {
        gross_of(&self.positions, market)
    }

    /// Cash plus signed mark-to-market value of all positions.
    ///
    /// Fails if any held instrument has no quote — a position cannot be
    /// opened without one, so that is an invariant violation worth surfacing.
    pub fn net_asset_value(&self, market: &Market) -> Result<f64, NoQuoteError> {
        net_of(self.cash, &self.positions, market)
    }

    /// Current leverage = gross exposure / max(NAV, floor).
    pub fn leverage(&self, market: &Market) -> Result<f64, NoQuoteError> {
        let gross = self.gross_exposure(market)?;
        let net = self.net_asset_value(market)?;
        Ok(gross / net.max(NAV_FLOOR))
    }

    /// Attempt to buy `quantity` units at the instrument's last market price.
    ///
    /// `Ok(true)` commits the trade; `Ok(false)` means the leverage limit
    /// would be breached and nothing changed. A rejection is a normal outcome,
    /// not an error. `Err` means no quote exists for the instrument.
    pub fn buy(
        &mut self,
        market: &Market,
        instrument: &str,
        quantity: i64,
    ) -> Result<bool, NoQuoteError> {
        self.apply_trade(market, instrument, quantity, TradeSide::Buy)
    }

    /// Attempt to sell `quantity` units; the position may go negative.
    /// Same contract as [`Portfolio::buy`].
    pub fn sell(
        &mut self,
        market: &Market,
        instrument: &str,
        quantity: i64,
    ) -> Result<bool, NoQuoteError> {
        self.apply_trade(market, instrument, quantity, TradeSide::Sell)
    }

    /// Snapshot of cash, positions, and derived risk figures.
    pub fn summary(&self, market: &Market) -> Result<PortfolioSummary, NoQuoteError> {
        Ok(PortfolioSummary {
            cash: self.cash,
            positions: self.positions.clone(),
            gross_exposure: self.gross_exposure(market)?,
            net_asset_value: self.net_asset_value(market)?,
            leverage: self.leverage(market)?,
        })
    }

    /// All-or-nothing trade commit shared by `buy` and `sell`.
    fn apply_trade(
        &mut self,
        market: &Market,
        instrument: &str,
        quantity: i64,
        side: TradeSide,
    ) -> Result<bool, NoQuoteError> {
        let timestep = market.timestep_of(instrument)?.clone();
        let price = market.price_of(instrument)?;

        let signed_qty = match side {
            TradeSide::Buy => quantity,
            TradeSide::Sell => -quantity,
        };

        // Hypothetical post-trade state; committed only if the check passes.
        let new_cash = self.cash - signed_qty as f64 * price;
        let mut new_positions = self.positions.clone();
        let entry = new_positions.entry(instrument.to_string()).or_insert(0);
        *entry += signed_qty;
        if *entry == 0 {
            new_positions.remove(instrument);
        }

        if !self.leverage_ok(market, new_cash, &new_positions)? {
            warn!(
                %timestep,
                instrument,
                quantity,
                "trade rejected: leverage limit exceeded"
            );
            return Ok(false);
        }

        self.cash = new_cash;
        self.positions = new_positions;
        let action = match side {
            TradeSide::Buy => "BOUGHT",
            TradeSide::Sell => "SOLD",
        };
        info!(
            %timestep,
            "{action} {quantity} {instrument} @ {price} | new cash={:.2}",
            self.cash
        );
        Ok(true)
    }

    /// Whether a hypothetical `(cash, positions)` state respects the limit.
    fn leverage_ok(
        &self,
        market: &Market,
        cash: f64,
        positions: &HashMap<InstrumentId, i64>,
    ) -> Result<bool, NoQuoteError> {
        let gross = gross_of(positions, market)?;
        let net = net_of(cash, positions, market)?;
        Ok(gross / net.max(NAV_FLOOR) <= self.leverage_limit)
    }
}

fn gross_of(positions: &HashMap<InstrumentId, i64>, market: &Market) -> Result<f64, NoQuoteError> {
    let mut total = 0.0;
    for (instrument, qty) in positions {
        total += qty.unsigned_abs() as f64 * market.price_of(instrument)?;
    }
    Ok(total)
}

fn net_of(
    cash: f64,
    positions: &HashMap<InstrumentId, i64>,
    market: &Market,
) -> Result<f64, NoQuoteError> {
    let mut value = cash;
    for (instrument, qty) in positions {
        value += *qty as f64 * market.price_of(instrument)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketEvent, Quote};

    fn market_with(prices: &[(&str, f64)]) -> Market {
        let mut market = Market::new();
        for (id, price) in prices {
            market.update(&MarketEvent::Quote(Quote::new(*id, "t0", *price)));
        }
        market
    }

    #[test]
    fn nav_with_no_positions_equals_cash() {
        let portfolio = Portfolio::new(100_000.0, 10.0);
        let market = Market::new();
        assert_eq!(portfolio.net_asset_value(&market).unwrap(), 100_000.0);
    }

    #[test]
    fn buy_commits_cash_and_position() {
        let market = market_with(&[("SPY", 400.0)]);
        let mut portfolio = Portfolio::new(100_000.0, 10.0);

        assert_eq!(portfolio.buy(&market, "SPY", 10), Ok(true));
        assert_eq!(portfolio.cash, 96_000.0);
        assert_eq!(portfolio.position("SPY"), 10);
        // Frictionless trade: NAV is unchanged by the fill itself.
        assert_eq!(portfolio.net_asset_value(&market).unwrap(), 100_000.0);
    }

    #[test]
    fn over_leveraged_buy_is_rejected_without_state_change() {
        // cash 1000, limit 1.0, cost 2000: leverage would be 2000/1000 = 2.
        let market = market_with(&[("X", 2.0)]);
        let mut portfolio = Portfolio::new(1_000.0, 1.0);

        assert_eq!(portfolio.buy(&market, "X", 1_000), Ok(false));
        assert_eq!(portfolio.cash, 1_000.0);
        assert_eq!(portfolio.position("X"), 0);
        assert!(portfolio.positions().is_empty());
    }

    #[test]
    fn sell_opens_short_position() {
        let market = market_with(&[("X", 5.0)]);
        let mut portfolio = Portfolio::new(1_000.0, 10.0);

        assert_eq!(portfolio.sell(&market, "X", 100), Ok(true));
        assert_eq!(portfolio.position("X"), -100);
        assert_eq!(portfolio.cash, 1_500.0);
        // gross 500, nav 1000 -> leverage 0.5
        assert!((portfolio.leverage(&market).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn trade_without_quote_propagates_error() {
        let market = Market::new();
        let mut portfolio = Portfolio::new(1_000.0, 10.0);
        assert_eq!(
            portfolio.buy(&market, "GHOST", 1),
            Err(NoQuoteError("GHOST".to_string()))
        );
    }

    #[test]
    fn round_trip_flattens_position_entry() {
        let market = market_with(&[("X", 2.0)]);
        let mut portfolio = Portfolio::new(1_000.0, 10.0);
        portfolio.buy(&market, "X", 10).unwrap();
        portfolio.sell(&market, "X", 10).unwrap();

        assert_eq!(portfolio.position("X"), 0);
        assert!(portfolio.positions().is_empty());
        assert_eq!(portfolio.cash, 1_000.0);
    }

    #[test]
    fn leverage_uses_gross_exposure() {
        let market = market_with(&[("A", 10.0), ("B", 10.0)]);
        let mut portfolio = Portfolio::new(1_000.0, 10.0);
        portfolio.buy(&market, "A", 50).unwrap();
        portfolio.sell(&market, "B", 50).unwrap();

        // long 500 + short 500 -> gross 1000, nav 1000 -> leverage 1.0
        let summary = portfolio.summary(&market).unwrap();
        assert_eq!(summary.gross_exposure, 1_000.0);
        assert_eq!(summary.net_asset_value, 1_000.0);
        assert!((summary.leverage - 1.0).abs() < 1e-12);
    }

    #[test]
    fn nav_requires_quote_for_every_held_instrument() {
        let market = market_with(&[("X", 2.0)]);
        let mut portfolio = Portfolio::new(1_000.0, 10.0);
        portfolio.buy(&market, "X", 10).unwrap();

        let empty = Market::new();
        assert_eq!(
            portfolio.net_asset_value(&empty),
            Err(NoQuoteError("X".to_string()))
        );
    }
}
