mod account;
mod execution;
mod order;
mod order_status;
mod order_type;
mod position;
mod side;
mod time_in_force;
mod trade_stats;

pub use account::{AccountStatus, BalanceReason, BalanceSnapshot, BalanceUpdate, DrawdownPolicy};
pub use execution::{Execution, ExecutionStatus, RejectReason};
pub use order::{Order, OrderId};
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use position::{FillOutcome, Position, PositionSide};
pub use side::Side;
pub use time_in_force::TimeInForce;
pub use trade_stats::TradeStats;
