use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Order, OrderId, OrderType, Side};
use crate::values::{Money, Price, Quantity, Timestamp};

/// Outcome of one order event as seen by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Filled,
    PartiallyFilled,
    /// Accepted but not (fully) executed yet: resting limit or in-flight order
    Pending,
    Rejected,
    Hold,
    Canceled,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Filled => "FILLED",
            ExecutionStatus::PartiallyFilled => "PARTIALLY_FILLED",
            ExecutionStatus::Pending => "PENDING",
            ExecutionStatus::Rejected => "REJECTED",
            ExecutionStatus::Hold => "HOLD",
            ExecutionStatus::Canceled => "CANCELED",
        };
        f.write_str(s)
    }
}

/// Why an order was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Size non-positive, outside instrument bounds, or a sub-minimum fill
    SizeOutOfRange,
    /// Limit price missing or non-positive
    PriceInvalid,
    /// Exposure would exceed available margin
    InsufficientMargin,
    /// Position size or open-position count limit, or account at limit
    PositionLimit,
    /// Side not allowed for this order kind or instrument
    UnsupportedSide,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::SizeOutOfRange => "SIZE_OUT_OF_RANGE",
            RejectReason::PriceInvalid => "PRICE_INVALID",
            RejectReason::InsufficientMargin => "INSUFFICIENT_MARGIN",
            RejectReason::PositionLimit => "POSITION_LIMIT",
            RejectReason::UnsupportedSide => "UNSUPPORTED_SIDE",
        };
        f.write_str(s)
    }
}

/// One fill (or non-fill) event produced by the executor
///
/// Invariants: `0 <= filled_size <= requested_size`, `commission >= 0`,
/// `slippage >= 0` measured in the direction adverse to the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub order_id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub status: ExecutionStatus,
    /// Average fill price, `None` when nothing was filled
    pub fill_price: Option<Price>,
    pub filled_size: Quantity,
    pub requested_size: Quantity,
    /// Size still working (pending) or dropped (market partial) after this event
    pub remaining_size: Quantity,
    /// Adverse price delta versus the ideal price
    pub slippage: Price,
    pub commission: Money,
    pub latency_ms: u64,
    pub timestamp: Timestamp,
    pub rejection: Option<RejectReason>,
    /// Human readable detail for rejections
    pub message: Option<String>,
}

impl Execution {
    fn base(order: &Order, status: ExecutionStatus, timestamp: Timestamp) -> Self {
        Self {
            order_id: order.id,
            side: order.side,
            order_type: order.order_type,
            status,
            fill_price: None,
            filled_size: Decimal::ZERO,
            requested_size: order.size,
            remaining_size: order.remaining_size(),
            slippage: Decimal::ZERO,
            commission: Decimal::ZERO,
            latency_ms: 0,
            timestamp,
            rejection: None,
            message: None,
        }
    }

    pub fn fill(
        order: &Order,
        fill_price: Price,
        filled_size: Quantity,
        slippage: Price,
        commission: Money,
        timestamp: Timestamp,
    ) -> Self {
        let remaining = (order.remaining_size() - filled_size).max(Decimal::ZERO);
        let status = if remaining > Decimal::ZERO {
            ExecutionStatus::PartiallyFilled
        } else {
            ExecutionStatus::Filled
        };
        Self {
            fill_price: Some(fill_price),
            filled_size,
            remaining_size: remaining,
            slippage,
            commission,
            ..Self::base(order, status, timestamp)
        }
    }

    pub fn rejected(
        order: &Order,
        reason: RejectReason,
        message: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            rejection: Some(reason),
            message: Some(message.into()),
            remaining_size: Decimal::ZERO,
            ..Self::base(order, ExecutionStatus::Rejected, timestamp)
        }
    }

    /// Acknowledgement for an order left working
    pub fn pending(order: &Order, timestamp: Timestamp) -> Self {
        Self::base(order, ExecutionStatus::Pending, timestamp)
    }

    pub fn hold(order: &Order, timestamp: Timestamp) -> Self {
        Self {
            requested_size: Decimal::ZERO,
            remaining_size: Decimal::ZERO,
            ..Self::base(order, ExecutionStatus::Hold, timestamp)
        }
    }

    pub fn canceled(order: &Order, timestamp: Timestamp) -> Self {
        Self::base(order, ExecutionStatus::Canceled, timestamp)
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Whether this event moved any size
    pub fn is_fill(&self) -> bool {
        self.filled_size > Decimal::ZERO
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ExecutionStatus::Rejected
    }

    /// Cost of slippage in account currency
    pub fn slippage_cost(&self, contract_size: Decimal) -> Money {
        self.slippage * self.filled_size * contract_size
    }
}
