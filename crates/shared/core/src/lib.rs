//! Holodeck Core Domain
//!
//! Pure domain types for the Holodeck market simulator.
//! This crate contains no I/O and is 100% unit testable.

pub mod entities;
pub mod instruments;
pub mod market;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Account types
    AccountStatus,
    BalanceReason,
    BalanceSnapshot,
    BalanceUpdate,
    DrawdownPolicy,
    // Execution types
    Execution,
    ExecutionStatus,
    FillOutcome,
    // Core trading entities
    Order,
    OrderId,
    OrderStatus,
    OrderType,
    Position,
    PositionSide,
    RejectReason,
    Side,
    TimeInForce,
    TradeStats,
};
pub use instruments::{AssetClass, Instrument, InstrumentError, InstrumentSpec, TradingSession};
pub use market::{DepthLevel, DepthProfile, Tick};
pub use values::{Money, Price, Quantity, Symbol, Timestamp};
