use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side
///
/// `Hold` is an explicit no-op decision: it produces a zero-size
/// execution and never touches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
    Hold,
}

impl Side {
    /// Returns the opposite side (`Hold` stays `Hold`)
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
            Side::Hold => Side::Hold,
        }
    }

    /// +1 for buys, -1 for sells, 0 for holds
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => Decimal::NEGATIVE_ONE,
            Side::Hold => Decimal::ZERO,
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Side::Hold)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
            Side::Hold => f.write_str("HOLD"),
        }
    }
}
