//! Market — last-seen price cache keyed by instrument id.

use std::collections::HashMap;

use super::{InstrumentId, MarketEvent, Quote, Timestep};

/// Lookup of an instrument that has never received a quote.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no quote available for {0}")]
pub struct NoQuoteError(pub InstrumentId);

/// Mutable cache of the most recent quote per instrument.
///
/// Updated in batch order by the engine and never rolled back; one instance
/// lives for exactly one run.
#[derive(Debug, Clone, Default)]
pub struct Market {
    quotes: HashMap<InstrumentId, Quote>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event: quotes fully replace the cached entry, clock markers
    /// are a no-op.
    pub fn update(&mut self, event: &MarketEvent) {
        if let MarketEvent::Quote(quote) = event {
            self.quotes.insert(quote.instrument.clone(), quote.clone());
        }
    }

    /// Last applied price for an instrument.
    pub fn price_of(&self, instrument: &str) -> Result<f64, NoQuoteError> {
        self.quotes
            .get(instrument)
            .map(|q| q.price)
            .ok_or_else(|| NoQuoteError(instrument.to_string()))
    }

    /// Timestep of the last applied quote for an instrument.
    pub fn timestep_of(&self, instrument: &str) -> Result<&Timestep, NoQuoteError> {
        self.quotes
            .get(instrument)
            .map(|q| &q.timestep)
            .ok_or_else(|| NoQuoteError(instrument.to_string()))
    }

    /// Full last-seen quote, including its named fields.
    pub fn quote(&self, instrument: &str) -> Option<&Quote> {
        self.quotes.get(instrument)
    }

    /// Whether the instrument has received at least one quote.
    pub fn has_quote(&self, instrument: &str) -> bool {
        self.quotes.contains_key(instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_of_unknown_instrument_fails() {
        let market = Market::new();
        assert_eq!(
            market.price_of("SPY"),
            Err(NoQuoteError("SPY".to_string()))
        );
    }

    #[test]
    fn update_replaces_previous_quote() {
        let mut market = Market::new();
        market.update(&MarketEvent::Quote(Quote::new("SPY", "t0", 400.0)));
        market.update(&MarketEvent::Quote(Quote::new("SPY", "t1", 410.0)));

        assert_eq!(market.price_of("SPY"), Ok(410.0));
        assert_eq!(market.timestep_of("SPY").unwrap(), "t1");

        let quote = market.quote("SPY").unwrap();
        assert_eq!(quote.fields.get("Price Close"), Some(&410.0));
    }

    #[test]
    fn clock_event_is_a_no_op() {
        let mut market = Market::new();
        market.update(&MarketEvent::Clock {
            timestep: "t0".into(),
        });
        assert!(!market.has_quote("Clock"));
        assert!(market.price_of("Clock").is_err());
    }
}
