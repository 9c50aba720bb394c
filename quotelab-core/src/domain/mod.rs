//! Domain types for QuoteLab

pub mod event;
pub mod market;
pub mod portfolio;

pub use event::{Batch, MarketEvent, Quote, CLOCK_ID};
pub use market::{Market, NoQuoteError};
pub use portfolio::{Portfolio, PortfolioSummary};

/// Instrument identifier type alias
pub type InstrumentId = String;

/// Logical simulation clock value, carried verbatim from the source rows.
///
/// Timesteps compare lexicographically on the raw cell text, which is also
/// how the batcher orders them. Zero-padded numeric steps and ISO timestamps
/// both sort correctly under this rule.
pub type Timestep = String;
