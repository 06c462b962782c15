use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{OrderStatus, OrderType, Side, TimeInForce};
use crate::market::Tick;
use crate::values::{Price, Quantity, Timestamp};

/// Unique identifier for an order, assigned sequentially by the executor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ORD-{:06}", self.0)
    }
}

/// Full order details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unassigned (`OrderId(0)`) until the executor accepts the order
    #[serde(default)]
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    /// Requested size in lots
    pub size: Quantity,
    #[serde(default)]
    pub filled_size: Quantity,
    /// Required for Limit orders
    #[serde(default)]
    pub limit_price: Option<Price>,
    #[serde(default)]
    pub time_in_force: TimeInForce,
    #[serde(default = "new_status")]
    pub status: OrderStatus,
    #[serde(default)]
    pub submitted_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

fn new_status() -> OrderStatus {
    OrderStatus::New
}

impl Order {
    pub fn new(
        side: Side,
        order_type: OrderType,
        size: Quantity,
        limit_price: Option<Price>,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            id: OrderId::default(),
            side,
            order_type,
            size,
            filled_size: Decimal::ZERO,
            limit_price,
            time_in_force,
            status: OrderStatus::New,
            submitted_at: None,
            updated_at: None,
        }
    }

    pub fn market(side: Side, size: Quantity) -> Self {
        Self::new(side, OrderType::Market, size, None, TimeInForce::GTC)
    }

    pub fn limit(side: Side, size: Quantity, price: Price) -> Self {
        Self::new(side, OrderType::Limit, size, Some(price), TimeInForce::GTC)
    }

    /// Explicit do-nothing decision
    pub fn hold() -> Self {
        Self::new(Side::Hold, OrderType::Market, Decimal::ZERO, None, TimeInForce::GTC)
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    /// Stamp the executor-assigned id and submission time
    pub fn accept(&mut self, id: OrderId, timestamp: Timestamp) {
        self.id = id;
        self.submitted_at = Some(timestamp);
        self.updated_at = Some(timestamp);
    }

    /// Record a fill of `size` lots
    pub fn record_fill(&mut self, size: Quantity, timestamp: Timestamp) {
        self.filled_size += size;
        self.updated_at = Some(timestamp);
    }

    pub fn set_status(&mut self, status: OrderStatus, timestamp: Timestamp) {
        self.status = status;
        self.updated_at = Some(timestamp);
    }

    /// Whether the current touch satisfies the order
    ///
    /// A BUY limit at P triggers on ask <= P, a SELL limit on bid >= P.
    pub fn is_marketable(&self, tick: &Tick) -> bool {
        match (self.order_type, self.side, self.limit_price) {
            (_, Side::Hold, _) => false,
            (OrderType::Market, _, _) => true,
            (OrderType::Limit, Side::Buy, Some(limit)) => tick.ask <= limit,
            (OrderType::Limit, Side::Sell, Some(limit)) => tick.bid >= limit,
            (OrderType::Limit, _, None) => false,
        }
    }

    /// Returns remaining size to be filled
    pub fn remaining_size(&self) -> Quantity {
        (self.size - self.filled_size).max(Decimal::ZERO)
    }

    /// Returns true if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_size >= self.size
    }
}
