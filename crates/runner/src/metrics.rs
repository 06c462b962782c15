use holodeck_core::{AssetClass, BalanceSnapshot, Money};
use holodeck_exchange::{CommissionTotals, ExecutionStats};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated view of a run, computed from the account and executor state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    pub ticks_processed: u64,
    pub orders_submitted: u64,
    /// Executions that moved size
    pub trades: u64,
    pub rejections: u64,
    /// Closing or reducing fills
    pub closed_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub breakeven_trades: u64,
    /// Percent of closed trades that won
    pub win_rate: Decimal,
    /// Gross profit over gross loss; `None` without losing trades
    pub profit_factor: Option<Decimal>,
    pub max_consecutive_wins: u64,
    pub max_consecutive_losses: u64,
    pub return_percent: Decimal,
    pub drawdown_percent: Decimal,
    pub max_drawdown_percent: Decimal,
    pub total_commission: Money,
    pub commission_by_asset_class: BTreeMap<AssetClass, CommissionTotals>,
    pub slippage_cost: Money,
    /// Simulated time between the first and the last tick
    pub simulated_span_ms: i64,
    /// Wall time since `start`
    pub session_duration_ms: i64,
    pub final_balance: Money,
    pub final_equity: Money,
}

impl SimulationMetrics {
    pub fn collect(
        ticks_processed: u64,
        account: &BalanceSnapshot,
        execution: &ExecutionStats,
        simulated_span_ms: i64,
        session_duration_ms: i64,
    ) -> Self {
        let trades = &account.trade_stats;
        Self {
            ticks_processed,
            orders_submitted: execution.submitted,
            trades: execution.executed,
            rejections: execution.rejected,
            closed_trades: trades.total,
            winning_trades: trades.winning,
            losing_trades: trades.losing,
            breakeven_trades: trades.breakeven,
            win_rate: trades.win_rate(),
            profit_factor: trades.profit_factor(),
            max_consecutive_wins: trades.max_consecutive_wins,
            max_consecutive_losses: trades.max_consecutive_losses,
            return_percent: account.return_percent(),
            drawdown_percent: account.drawdown_percent(),
            max_drawdown_percent: account.max_drawdown_percent(),
            total_commission: account.commission_paid,
            commission_by_asset_class: execution
                .commission
                .iter()
                .map(|(class, totals)| (*class, totals.clone()))
                .collect(),
            slippage_cost: execution.slippage_cost,
            simulated_span_ms,
            session_duration_ms,
            final_balance: account.balance,
            final_equity: account.equity,
        }
    }
}
