use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Side;
use crate::market::Tick;
use crate::values::{Money, Price, Quantity, Timestamp};

/// Position side - long (bought), short (sold) or flat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    /// Long position - bought the asset, profit when price rises
    Long,
    /// Short position - sold borrowed asset, profit when price falls
    Short,
    #[default]
    Flat,
}

impl PositionSide {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            PositionSide::Long => PositionSide::Short,
            PositionSide::Short => PositionSide::Long,
            PositionSide::Flat => PositionSide::Flat,
        }
    }

    /// +1 long, -1 short, 0 flat
    pub fn sign(&self) -> Decimal {
        match self {
            PositionSide::Long => Decimal::ONE,
            PositionSide::Short => Decimal::NEGATIVE_ONE,
            PositionSide::Flat => Decimal::ZERO,
        }
    }

    /// Side a fill on `side` opens
    pub fn from_order_side(side: Side) -> Self {
        match side {
            Side::Buy => PositionSide::Long,
            Side::Sell => PositionSide::Short,
            Side::Hold => PositionSide::Flat,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => f.write_str("LONG"),
            PositionSide::Short => f.write_str("SHORT"),
            PositionSide::Flat => f.write_str("FLAT"),
        }
    }
}

/// What one fill did to the position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// P&L realized on the reducing portion
    pub realized_pnl: Money,
    /// Lots closed out of the previous position
    pub closed_size: Quantity,
    /// Lots opened or added on the fill side
    pub opened_size: Quantity,
    /// Closed the previous position and opened the opposite one
    pub flipped: bool,
}

impl FillOutcome {
    /// Whether the fill reduced or closed existing exposure
    pub fn is_reducing(&self) -> bool {
        self.closed_size > Decimal::ZERO
    }
}

/// The single aggregate position held in the simulated instrument
///
/// FLAT iff `size == 0`. Opposing fills close first and open the residual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,

    /// Current size in lots (always non-negative)
    pub size: Quantity,

    /// Weighted-average entry price
    pub entry_price: Price,

    /// Last price the position was valued at
    pub mark_price: Price,

    /// Units of the underlying per lot
    pub contract_size: Decimal,

    /// Realized profit/loss accumulated over the run
    pub realized_pnl: Money,

    /// Profit/loss of the open size at `mark_price`
    pub unrealized_pnl: Money,

    /// When the current position was opened
    pub opened_at: Option<Timestamp>,

    /// Last update time
    pub updated_at: Option<Timestamp>,
}

impl Position {
    /// A flat position in an instrument with the given contract size
    pub fn flat(contract_size: Decimal) -> Self {
        Self {
            side: PositionSide::Flat,
            size: Decimal::ZERO,
            entry_price: Decimal::ZERO,
            mark_price: Decimal::ZERO,
            contract_size,
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            opened_at: None,
            updated_at: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.size == Decimal::ZERO
    }

    /// Exposure at the average entry price
    pub fn entry_notional(&self) -> Money {
        self.size * self.entry_price * self.contract_size
    }

    /// Exposure at the current mark
    pub fn notional_value(&self) -> Money {
        self.size * self.mark_price * self.contract_size
    }

    /// Calculate total P&L (realized + unrealized)
    pub fn total_pnl(&self) -> Money {
        self.realized_pnl + self.unrealized_pnl
    }

    /// Lots of `size` on `side` that would close existing exposure
    pub fn reducing_size(&self, side: Side, size: Quantity) -> Quantity {
        if self.side == PositionSide::from_order_side(side).opposite() {
            size.min(self.size)
        } else {
            Decimal::ZERO
        }
    }

    /// Lots of `size` on `side` that would add exposure
    pub fn increasing_size(&self, side: Side, size: Quantity) -> Quantity {
        size - self.reducing_size(side, size)
    }

    /// Apply a fill of `size` lots at `price`
    ///
    /// Opens, adds to, reduces or flips the position. Realized P&L on the
    /// reducing portion is `sign * (exit - entry) * closed * contract_size`.
    pub fn apply_fill(
        &mut self,
        side: Side,
        size: Quantity,
        price: Price,
        timestamp: Timestamp,
    ) -> FillOutcome {
        let mut outcome = FillOutcome::default();
        let fill_side = PositionSide::from_order_side(side);
        if fill_side == PositionSide::Flat || size <= Decimal::ZERO {
            return outcome;
        }

        let mut residual = size;

        if self.side == fill_side.opposite() {
            let closed = residual.min(self.size);
            let pnl = self.side.sign() * (price - self.entry_price) * closed * self.contract_size;
            self.realized_pnl += pnl;
            self.size -= closed;
            residual -= closed;
            outcome.realized_pnl = pnl;
            outcome.closed_size = closed;

            if self.size == Decimal::ZERO {
                self.side = PositionSide::Flat;
                self.entry_price = Decimal::ZERO;
                self.opened_at = None;
                outcome.flipped = residual > Decimal::ZERO;
            }
        }

        if residual > Decimal::ZERO {
            if self.side == PositionSide::Flat {
                self.side = fill_side;
                self.size = residual;
                self.entry_price = price;
                self.mark_price = price;
                self.opened_at = Some(timestamp);
            } else {
                let old_notional = self.size * self.entry_price;
                let new_notional = residual * price;
                let total = self.size + residual;
                self.entry_price = (old_notional + new_notional) / total;
                self.size = total;
            }
            outcome.opened_size = residual;
        }

        self.revalue();
        self.updated_at = Some(timestamp);
        outcome
    }

    /// Revalue the open size at a new mark without touching realized P&L
    pub fn mark(&mut self, price: Price, timestamp: Timestamp) {
        if self.is_flat() {
            return;
        }
        self.mark_price = price;
        self.revalue();
        self.updated_at = Some(timestamp);
    }

    /// Mark at the side's exit price: bid for longs, ask for shorts
    pub fn mark_to_market(&mut self, tick: &Tick) {
        match self.side {
            PositionSide::Long => self.mark(tick.bid, tick.timestamp),
            PositionSide::Short => self.mark(tick.ask, tick.timestamp),
            PositionSide::Flat => {}
        }
    }

    fn revalue(&mut self) {
        self.unrealized_pnl = if self.is_flat() {
            Decimal::ZERO
        } else {
            self.side.sign() * (self.mark_price - self.entry_price) * self.size * self.contract_size
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    const FX: Decimal = dec!(100000);

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_open_long_from_flat() {
        let mut pos = Position::flat(FX);
        let outcome = pos.apply_fill(Side::Buy, dec!(1), dec!(1.1000), ts(0));

        assert_eq!(pos.side, PositionSide::Long);
        assert_eq!(pos.size, dec!(1));
        assert_eq!(pos.entry_price, dec!(1.1000));
        assert_eq!(pos.unrealized_pnl, Decimal::ZERO);
        assert_eq!(pos.opened_at, Some(ts(0)));
        assert_eq!(outcome.opened_size, dec!(1));
        assert!(!outcome.is_reducing());
    }

    #[test]
    fn test_add_recomputes_weighted_average() {
        let mut pos = Position::flat(FX);
        pos.apply_fill(Side::Buy, dec!(1), dec!(1.1000), ts(0));
        pos.apply_fill(Side::Buy, dec!(3), dec!(1.1004), ts(1));

        assert_eq!(pos.size, dec!(4));
        // (1.1000 + 3 * 1.1004) / 4
        assert_eq!(pos.entry_price, dec!(1.1003));
    }

    #[test]
    fn test_long_unrealized_pnl() {
        let mut pos = Position::flat(FX);
        pos.apply_fill(Side::Buy, dec!(1), dec!(1.1000), ts(0));

        pos.mark(dec!(1.1010), ts(1));
        assert_eq!(pos.unrealized_pnl, dec!(100));

        pos.mark(dec!(1.0700), ts(2));
        assert_eq!(pos.unrealized_pnl, dec!(-3000));
        assert_eq!(pos.realized_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_short_unrealized_pnl() {
        let mut pos = Position::flat(dec!(1));
        pos.apply_fill(Side::Sell, dec!(2), dec!(50000), ts(0));

        pos.mark(dec!(49000), ts(1));
        assert_eq!(pos.unrealized_pnl, dec!(2000));
        pos.mark(dec!(51000), ts(2));
        assert_eq!(pos.unrealized_pnl, dec!(-2000));
    }

    #[test]
    fn test_mark_to_market_uses_exit_side() {
        let tick = Tick::new(ts(1), dec!(1.1010), dec!(1.1012), dec!(1));

        let mut long = Position::flat(FX);
        long.apply_fill(Side::Buy, dec!(1), dec!(1.1000), ts(0));
        long.mark_to_market(&tick);
        assert_eq!(long.mark_price, dec!(1.1010));

        let mut short = Position::flat(FX);
        short.apply_fill(Side::Sell, dec!(1), dec!(1.1000), ts(0));
        short.mark_to_market(&tick);
        assert_eq!(short.mark_price, dec!(1.1012));
        assert_eq!(short.unrealized_pnl, dec!(-120));
    }

    #[test]
    fn test_round_trip_at_same_price_is_flat_and_zero_pnl() {
        let mut pos = Position::flat(FX);
        pos.apply_fill(Side::Buy, dec!(3), dec!(1.2345), ts(0));
        let outcome = pos.apply_fill(Side::Sell, dec!(3), dec!(1.2345), ts(1));

        assert_eq!(outcome.realized_pnl, Decimal::ZERO);
        assert_eq!(pos.realized_pnl, Decimal::ZERO);
        assert!(pos.is_flat());
        assert_eq!(pos.side, PositionSide::Flat);
        assert_eq!(pos.unrealized_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_partial_reduce_realizes_proportionally() {
        let mut pos = Position::flat(dec!(1));
        pos.apply_fill(Side::Buy, dec!(1), dec!(50000), ts(0));
        let outcome = pos.apply_fill(Side::Sell, dec!(0.5), dec!(55000), ts(1));

        assert_eq!(outcome.realized_pnl, dec!(2500));
        assert_eq!(outcome.closed_size, dec!(0.5));
        assert_eq!(pos.size, dec!(0.5));
        assert_eq!(pos.side, PositionSide::Long);
        assert_eq!(pos.entry_price, dec!(50000));
    }

    #[test]
    fn test_flip_long_to_short() {
        let mut pos = Position::flat(FX);
        pos.apply_fill(Side::Buy, dec!(1), dec!(1.1000), ts(0));
        let outcome = pos.apply_fill(Side::Sell, dec!(2), dec!(1.1010), ts(1));

        assert!(outcome.flipped);
        assert_eq!(outcome.closed_size, dec!(1));
        assert_eq!(outcome.opened_size, dec!(1));
        assert_eq!(outcome.realized_pnl, dec!(100));
        assert_eq!(pos.side, PositionSide::Short);
        assert_eq!(pos.size, dec!(1));
        assert_eq!(pos.entry_price, dec!(1.1010));
        assert_eq!(pos.opened_at, Some(ts(1)));
    }

    #[test]
    fn test_reducing_and_increasing_split() {
        let mut pos = Position::flat(FX);
        pos.apply_fill(Side::Sell, dec!(1), dec!(1.1), ts(0));

        assert_eq!(pos.reducing_size(Side::Buy, dec!(3)), dec!(1));
        assert_eq!(pos.increasing_size(Side::Buy, dec!(3)), dec!(2));
        assert_eq!(pos.reducing_size(Side::Sell, dec!(3)), Decimal::ZERO);
        assert_eq!(pos.increasing_size(Side::Sell, dec!(3)), dec!(3));
    }

    #[test]
    fn test_flat_position_ignores_marks() {
        let mut pos = Position::flat(FX);
        pos.mark(dec!(1.2), ts(0));
        assert_eq!(pos.mark_price, Decimal::ZERO);
        assert_eq!(pos.unrealized_pnl, Decimal::ZERO);
    }
}
