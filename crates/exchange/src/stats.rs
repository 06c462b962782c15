use holodeck_core::{Execution, ExecutionStatus, Money, OrderType, Price, RejectReason};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::pricing::CommissionStats;

/// Running counters of everything the executor did
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Orders accepted by `submit`, holds included
    pub submitted: u64,
    pub market_orders: u64,
    pub limit_orders: u64,
    pub holds: u64,
    /// Executions that moved size
    pub executed: u64,
    /// Executions that moved less than the remaining size
    pub partial_fills: u64,
    pub rejected: u64,
    pub canceled: u64,
    /// DAY orders canceled at session close
    pub expired: u64,
    pub total_commission: Money,
    /// Sum of adverse price deltas
    pub total_slippage: Price,
    /// Slippage in account currency
    pub slippage_cost: Money,
    pub rejections: HashMap<RejectReason, u64>,
    pub commission: CommissionStats,
}

impl ExecutionStats {
    pub fn record_submission(&mut self, order_type: OrderType, hold: bool) {
        self.submitted += 1;
        if hold {
            self.holds += 1;
            return;
        }
        match order_type {
            OrderType::Market => self.market_orders += 1,
            OrderType::Limit => self.limit_orders += 1,
        }
    }

    /// Count an execution event; fills also need `record_fill_costs`
    pub fn record(&mut self, execution: &Execution) {
        match execution.status {
            ExecutionStatus::Rejected => {
                self.rejected += 1;
                if let Some(reason) = execution.rejection {
                    *self.rejections.entry(reason).or_default() += 1;
                }
            }
            ExecutionStatus::Canceled => self.canceled += 1,
            _ => {}
        }
        if execution.is_fill() {
            self.executed += 1;
            if execution.remaining_size > Decimal::ZERO {
                self.partial_fills += 1;
            }
        }
    }

    pub fn record_fill_costs(&mut self, execution: &Execution, contract_size: Decimal) {
        self.total_commission += execution.commission;
        self.total_slippage += execution.slippage;
        self.slippage_cost += execution.slippage_cost(contract_size);
    }

    /// Share of submitted non-hold orders that were rejected, in percent
    pub fn rejection_rate(&self) -> Decimal {
        let orders = self.market_orders + self.limit_orders;
        if orders == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.rejected) / Decimal::from(orders) * Decimal::ONE_HUNDRED
    }
}
