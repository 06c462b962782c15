use holodeck_core::{Instrument, InstrumentSpec, Order, OrderType, Position, RejectReason, Side};
use rust_decimal::Decimal;

use crate::error::{ExchangeError, Result};

/// Account-independent checks on an order
///
/// Rejects non-positive or out-of-range sizes, missing or non-positive
/// limit prices, HOLD limits, and sells that would open a short on an
/// instrument that cannot be shorted.
pub fn validate_order(order: &Order, instrument: &Instrument, position: &Position) -> Result<()> {
    if order.side.is_hold() {
        if order.order_type == OrderType::Limit {
            return Err(ExchangeError::rejected(
                RejectReason::UnsupportedSide,
                "HOLD cannot be a limit order",
            ));
        }
        return Ok(());
    }

    if order.size <= Decimal::ZERO {
        return Err(ExchangeError::rejected(
            RejectReason::SizeOutOfRange,
            format!("Size {} must be positive", order.size),
        ));
    }

    if !instrument.validate_volume(order.size) {
        return Err(ExchangeError::rejected(
            RejectReason::SizeOutOfRange,
            format!(
                "Size {} outside [{}, {}]",
                order.size,
                instrument.min_volume(),
                instrument.max_volume()
            ),
        ));
    }

    if order.order_type == OrderType::Limit {
        match order.limit_price {
            Some(price) if price > Decimal::ZERO => {}
            Some(price) => {
                return Err(ExchangeError::rejected(
                    RejectReason::PriceInvalid,
                    format!("Limit price {} must be positive", price),
                ));
            }
            None => {
                return Err(ExchangeError::rejected(
                    RejectReason::PriceInvalid,
                    "Limit order without a limit price",
                ));
            }
        }
    }

    let opens_short =
        order.side == Side::Sell && position.increasing_size(order.side, order.size) > Decimal::ZERO;
    if opens_short && !instrument.is_shortable() {
        return Err(ExchangeError::rejected(
            RejectReason::UnsupportedSide,
            format!("{} cannot be sold short", instrument.symbol()),
        ));
    }

    Ok(())
}
