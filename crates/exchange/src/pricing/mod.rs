mod commission;
mod partial_fill;
mod slippage;

pub use commission::{
    CommissionCalculator, CommissionKind, CommissionModel, CommissionStats, CommissionTotals,
};
pub use partial_fill::PartialFillPolicy;
pub use slippage::{SlippageModel, SlippageQuote};
