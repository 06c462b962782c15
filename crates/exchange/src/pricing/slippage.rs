use holodeck_core::{Instrument, InstrumentSpec, Price, Quantity, Side, Tick};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Priced fill for a market order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlippageQuote {
    /// Fill price after slippage
    pub price: Price,
    /// Adverse distance from the touch, never negative
    pub slippage: Price,
    /// Size beyond the visible depth, priced at the worst visible level
    pub unfilled: Quantity,
}

/// Adverse price offset applied to market fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SlippageModel {
    /// Fill at the touch
    None,
    /// `pips` per lot of adverse offset
    Fixed { pips: Decimal },
    /// Walk the depth profile to a size-weighted average price; falls back
    /// to `Fixed { pips: fallback_pips }` when the tick carries no depth
    DepthBased { fallback_pips: Decimal },
}

impl SlippageModel {
    /// Price `size` lots on `side` against `tick`
    pub fn quote(
        &self,
        side: Side,
        size: Quantity,
        tick: &Tick,
        instrument: &Instrument,
    ) -> SlippageQuote {
        let touch = tick.touch(side);
        match *self {
            SlippageModel::None => SlippageQuote {
                price: touch,
                slippage: Decimal::ZERO,
                unfilled: Decimal::ZERO,
            },
            SlippageModel::Fixed { pips } => fixed(side, size, touch, pips, instrument),
            SlippageModel::DepthBased { fallback_pips } => {
                let levels = tick.side_depth(side);
                if levels.iter().all(|level| level.volume <= Decimal::ZERO) {
                    return fixed(side, size, touch, fallback_pips, instrument);
                }

                let mut remaining = size;
                let mut cost = Decimal::ZERO;
                let mut worst = touch;
                for level in levels.iter().filter(|level| level.volume > Decimal::ZERO) {
                    if remaining <= Decimal::ZERO {
                        break;
                    }
                    let take = remaining.min(level.volume);
                    cost += take * level.price;
                    remaining -= take;
                    worst = level.price;
                }
                // Excess beyond visible depth is priced at the worst level
                let unfilled = remaining.max(Decimal::ZERO);
                cost += unfilled * worst;

                let average = if size > Decimal::ZERO { cost / size } else { touch };
                let slippage = adverse(side, touch, average);
                SlippageQuote {
                    price: apply(side, touch, slippage),
                    slippage,
                    unfilled,
                }
            }
        }
    }
}

fn fixed(
    side: Side,
    size: Quantity,
    touch: Price,
    pips: Decimal,
    instrument: &Instrument,
) -> SlippageQuote {
    let slippage = (pips * instrument.pip_value() * size).max(Decimal::ZERO);
    SlippageQuote {
        price: apply(side, touch, slippage),
        slippage,
        unfilled: Decimal::ZERO,
    }
}

/// Distance from `touch` to `price` in the direction that hurts `side`
fn adverse(side: Side, touch: Price, price: Price) -> Price {
    match side {
        Side::Buy => (price - touch).max(Decimal::ZERO),
        Side::Sell | Side::Hold => (touch - price).max(Decimal::ZERO),
    }
}

fn apply(side: Side, touch: Price, slippage: Price) -> Price {
    match side {
        Side::Buy => touch + slippage,
        Side::Sell | Side::Hold => touch - slippage,
    }
}
