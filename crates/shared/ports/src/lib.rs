//! Holodeck Ports
//!
//! Port definitions (traits) for the Holodeck simulator.
//! These define the boundaries between the simulated venue, the account
//! ledger and the infrastructure that feeds them.

mod clock;
mod error;
mod ledger;
mod risk;
mod tick_source;

pub use clock::Clock;
pub use error::{ClockError, ClockResult, TickSourceError, TickSourceResult};
pub use ledger::{Ledger, LedgerUpdate};
pub use risk::{RiskCheckResult, RiskConfig, RiskManager};
pub use tick_source::TickSource;
