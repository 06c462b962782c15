//! Holodeck Exchange
//!
//! The simulated venue: prices an agent order against the current tick
//! (slippage, partial fills, commission), keeps resting limit orders and
//! in-flight orders, and posts fills to the ledger.

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Pricing models
pub mod pricing;

// Cross-cutting concerns
pub mod error;
pub mod stats;

// Re-export main types for convenience
pub use application::{ExecutorConfig, OrderExecutor, validate_order};
pub use error::{ExchangeError, Result};
pub use infrastructure::{InflightQueue, RestingBook, RestingOrder};
pub use pricing::{
    CommissionCalculator, CommissionKind, CommissionModel, CommissionStats, CommissionTotals,
    PartialFillPolicy, SlippageModel, SlippageQuote,
};
pub use stats::ExecutionStats;
