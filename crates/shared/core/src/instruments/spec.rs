use rust_decimal::Decimal;

use super::AssetClass;
use crate::values::{Price, Quantity};

/// Contract parameters every tradeable instrument exposes
///
/// Every instrument must define these properties for order validation,
/// commission, margin and P&L calculations.
pub trait InstrumentSpec {
    /// Symbol for this instrument (e.g., "EUR/USD", "AAPL")
    fn symbol(&self) -> &str;

    /// Market the instrument trades in
    fn asset_class(&self) -> AssetClass;

    /// Minimum price increment
    fn tick_size(&self) -> Price;

    /// Price distance of one pip
    fn pip_value(&self) -> Price;

    /// Units of the underlying per lot
    fn contract_size(&self) -> Decimal;

    /// Smallest order size accepted, in lots
    fn min_volume(&self) -> Quantity;

    /// Largest order size accepted, in lots
    fn max_volume(&self) -> Quantity;

    /// Whether a SELL may open a short position
    fn is_shortable(&self) -> bool {
        true
    }

    /// Economic exposure of `size` lots at `price`
    fn notional(&self, price: Price, size: Quantity) -> Decimal {
        price * size * self.contract_size()
    }

    /// Whether an order size lies within the instrument's volume bounds
    fn validate_volume(&self, size: Quantity) -> bool {
        size >= self.min_volume() && size <= self.max_volume()
    }

    /// Validate that a price conforms to tick size
    fn validate_price(&self, price: Price) -> bool {
        let tick = self.tick_size();
        if tick == Decimal::ZERO {
            return true;
        }
        (price % tick) == Decimal::ZERO
    }

    /// Convert a price distance into pips
    fn to_pips(&self, distance: Price) -> Decimal {
        let pip = self.pip_value();
        if pip == Decimal::ZERO {
            return Decimal::ZERO;
        }
        distance / pip
    }

    /// Round a price down to the nearest valid tick
    fn round_price_down(&self, price: Price) -> Price {
        let tick = self.tick_size();
        if tick == Decimal::ZERO {
            return price;
        }
        (price / tick).floor() * tick
    }

    /// Round a price up to the nearest valid tick
    fn round_price_up(&self, price: Price) -> Price {
        let tick = self.tick_size();
        if tick == Decimal::ZERO {
            return price;
        }
        (price / tick).ceil() * tick
    }
}
