//! Holodeck Risk
//!
//! Account-dependent pre-trade checks. Static order validation (sizes,
//! prices, sides) lives with the executor; these checks need the ledger.

mod basic;

pub use basic::BasicRiskManager;
pub use holodeck_ports::{RiskCheckResult, RiskConfig, RiskManager};
