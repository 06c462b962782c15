//! Holodeck Ledger
//!
//! The single cash account of a simulation together with its position.
//! Fills and mark-to-market ticks flow in; the authoritative balance,
//! margin, drawdown and status flow out.

mod account;

pub use account::{Account, AccountConfig};
