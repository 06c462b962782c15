use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::Side;
use crate::values::{Price, Quantity, Timestamp};

/// One price level of visible liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Price,
    pub volume: Quantity,
}

impl DepthLevel {
    pub fn new(price: Price, volume: Quantity) -> Self {
        Self { price, volume }
    }
}

/// Visible liquidity on both sides, best level first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthProfile {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl DepthProfile {
    pub fn new(bids: Vec<DepthLevel>, asks: Vec<DepthLevel>) -> Self {
        Self { bids, asks }
    }

    /// Levels an order on `side` consumes: asks for buys, bids for sells
    pub fn levels_for(&self, side: Side) -> &[DepthLevel] {
        match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
            Side::Hold => &[],
        }
    }

    /// Volume available to `side` within the first `levels` levels
    pub fn volume_within(&self, side: Side, levels: usize) -> Quantity {
        self.levels_for(side)
            .iter()
            .take(levels)
            .map(|level| level.volume)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// A point-in-time market snapshot
///
/// Ticks are read-only once produced; sources are expected to deliver
/// them with non-decreasing timestamps and `ask >= bid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: Timestamp,
    pub bid: Price,
    pub ask: Price,
    /// Last traded volume
    pub volume: Quantity,
    #[serde(default)]
    pub depth: Option<DepthProfile>,
}

impl Tick {
    pub fn new(timestamp: Timestamp, bid: Price, ask: Price, volume: Quantity) -> Self {
        Self {
            timestamp,
            bid,
            ask,
            volume,
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: DepthProfile) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn mid(&self) -> Price {
        (self.ask + self.bid) / Decimal::TWO
    }

    pub fn spread(&self) -> Price {
        self.ask - self.bid
    }

    /// Price an order on `side` would take: ask for buys, bid for sells
    pub fn touch(&self, side: Side) -> Price {
        match side {
            Side::Buy => self.ask,
            Side::Sell | Side::Hold => self.bid,
        }
    }

    /// Depth levels an order on `side` would consume, empty when unknown
    pub fn side_depth(&self, side: Side) -> &[DepthLevel] {
        self.depth
            .as_ref()
            .map(|depth| depth.levels_for(side))
            .unwrap_or(&[])
    }

    /// Crossed or non-positive quotes are unusable
    pub fn is_valid(&self) -> bool {
        self.ask >= self.bid && self.bid > Decimal::ZERO && self.volume >= Decimal::ZERO
    }
}
