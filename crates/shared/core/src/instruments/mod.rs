//! Instrument definitions for the traded symbol
//!
//! One instrument per simulation. The asset class picks the preset
//! contract parameters and the commission formula:
//! - FOREX (EUR/USD)
//! - STOCKS (AAPL)
//! - COMMODITIES (XAU)
//! - CRYPTO (BTC/USD)

mod asset_class;
mod instrument;
mod session;
mod spec;

pub use asset_class::{AssetClass, InstrumentError};
pub use instrument::Instrument;
pub use session::TradingSession;
pub use spec::InstrumentSpec;
