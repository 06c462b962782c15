use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// NEW -> (PENDING | FILLED | PARTIALLY_FILLED | REJECTED | CANCELED).
/// A resting limit order stays `Pending` while partially filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order has been created but not yet processed
    New,
    /// Resting limit order, or an order waiting out its latency
    Pending,
    /// Market order filled for less than its size; the rest is dropped
    PartiallyFilled,
    /// Order has been completely filled
    Filled,
    /// Order failed validation
    Rejected,
    /// Canceled by the agent or expired at session close
    Canceled,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled
                | OrderStatus::PartiallyFilled
                | OrderStatus::Rejected
                | OrderStatus::Canceled
        )
    }

    /// Returns true if the order is still working
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Pending)
    }
}
