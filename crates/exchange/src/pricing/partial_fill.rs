use holodeck_core::{Quantity, Side, Tick};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much of an order one tick can absorb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PartialFillPolicy {
    /// Always fill the requested size
    #[default]
    None,
    /// Fill up to the same-side depth within the first `levels` levels
    DepthBased { levels: usize },
    /// Fill up to `fraction` of the tick's traded volume
    VolumeAdjusted { fraction: Decimal },
}

impl PartialFillPolicy {
    /// Fillable size for `requested` lots on `side`, never above `requested`
    pub fn fillable(&self, side: Side, requested: Quantity, tick: &Tick) -> Quantity {
        let requested = requested.max(Decimal::ZERO);
        match *self {
            PartialFillPolicy::None => requested,
            PartialFillPolicy::DepthBased { levels } => match &tick.depth {
                Some(depth) if !depth.levels_for(side).is_empty() => {
                    requested.min(depth.volume_within(side, levels))
                }
                // No depth published: full fill
                _ => requested,
            },
            PartialFillPolicy::VolumeAdjusted { fraction } => {
                requested.min((tick.volume * fraction).max(Decimal::ZERO))
            }
        }
    }
}
