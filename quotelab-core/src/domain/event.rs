//! Quote and batch types — the fundamental simulation units.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{InstrumentId, Timestep};

/// Reserved instrument id for the end-of-batch clock marker.
pub const CLOCK_ID: &str = "Clock";

/// A single price observation for one instrument at one timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub instrument: InstrumentId,
    pub timestep: Timestep,
    pub price: f64,
    /// Named numeric fields attached to the observation (e.g. "Price Close").
    pub fields: HashMap<String, f64>,
}

impl Quote {
    pub fn new(instrument: impl Into<InstrumentId>, timestep: impl Into<Timestep>, price: f64) -> Self {
        let mut fields = HashMap::new();
        fields.insert("Price Close".to_string(), price);
        Self {
            instrument: instrument.into(),
            timestep: timestep.into(),
            price,
            fields,
        }
    }
}

/// One event inside a batch: a real quote, or the terminal clock marker.
///
/// The clock carries no price; it only marks the end of a timestep so that
/// downstream consumers see the same event stream the remote evaluator emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEvent {
    Quote(Quote),
    Clock { timestep: Timestep },
}

impl MarketEvent {
    /// The timestep this event belongs to.
    pub fn timestep(&self) -> &Timestep {
        match self {
            MarketEvent::Quote(q) => &q.timestep,
            MarketEvent::Clock { timestep } => timestep,
        }
    }

    /// The instrument id, or [`CLOCK_ID`] for clock markers.
    pub fn instrument(&self) -> &str {
        match self {
            MarketEvent::Quote(q) => &q.instrument,
            MarketEvent::Clock { .. } => CLOCK_ID,
        }
    }

    pub fn is_clock(&self) -> bool {
        matches!(self, MarketEvent::Clock { .. })
    }
}

/// All events for one discrete simulation step.
///
/// Invariants (upheld by [`Batch::from_quotes`] and the batcher):
/// - every quote event shares the batch timestep
/// - quotes are ordered by instrument id ascending
/// - the final event is a single clock marker with the batch timestep
/// - a batch holds at least one non-clock quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub timestep: Timestep,
    pub events: Vec<MarketEvent>,
}

impl Batch {
    /// Build a batch from quotes already sharing one timestep, appending the
    /// terminal clock. Returns `None` for an empty quote list — a step with
    /// no real observations is not a step.
    pub fn from_quotes(timestep: Timestep, quotes: Vec<Quote>) -> Option<Self> {
        if quotes.is_empty() {
            return None;
        }
        let mut events: Vec<MarketEvent> = quotes.into_iter().map(MarketEvent::Quote).collect();
        events.push(MarketEvent::Clock {
            timestep: timestep.clone(),
        });
        Some(Self { timestep, events })
    }

    /// Iterator over the non-clock quotes of this batch.
    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.events.iter().filter_map(|e| match e {
            MarketEvent::Quote(q) => Some(q),
            MarketEvent::Clock { .. } => None,
        })
    }

    /// Number of non-clock quotes.
    pub fn quote_count(&self) -> usize {
        self.quotes().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_quotes_appends_single_trailing_clock() {
        let batch = Batch::from_quotes(
            "t1".into(),
            vec![Quote::new("A", "t1", 1.0), Quote::new("B", "t1", 2.0)],
        )
        .unwrap();

        assert_eq!(batch.events.len(), 3);
        assert!(batch.events.last().unwrap().is_clock());
        assert_eq!(batch.events.last().unwrap().timestep(), "t1");
        assert_eq!(batch.quote_count(), 2);
    }

    #[test]
    fn from_quotes_rejects_empty_step() {
        assert!(Batch::from_quotes("t1".into(), vec![]).is_none());
    }

    #[test]
    fn clock_event_reports_reserved_instrument_id() {
        let clock = MarketEvent::Clock {
            timestep: "t9".into(),
        };
        assert_eq!(clock.instrument(), CLOCK_ID);
        assert_eq!(clock.timestep(), "t9");
        assert!(clock.is_clock());
    }

    #[test]
    fn quote_carries_price_close_field() {
        let q = Quote::new("SPY", "2024-01-02", 400.0);
        assert_eq!(q.fields.get("Price Close"), Some(&400.0));
    }
}
