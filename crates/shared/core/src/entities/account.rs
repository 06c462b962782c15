use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{OrderId, TradeStats};
use crate::values::{Money, Timestamp};

/// Account status
///
/// ACTIVE <-> AT_LIMIT is the only reversible transition; BLOWN and
/// CLOSED are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Normal operating status
    #[default]
    Active,
    /// No margin left, or drawdown breached under the soft policy
    AtLimit,
    /// Balance exhausted or drawdown breached under the hard policy
    Blown,
    /// Explicitly closed at the end of a run
    Closed,
}

impl AccountStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AccountStatus::Blown | AccountStatus::Closed)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::AtLimit => "AT_LIMIT",
            AccountStatus::Blown => "BLOWN",
            AccountStatus::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

/// What a drawdown breach does to the account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawdownPolicy {
    /// Breach blows the account
    #[default]
    Hard,
    /// Breach puts the account at limit, blocking new exposure
    Soft,
}

/// Cause of a cash balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceReason {
    Commission,
    RealizedPnl,
}

impl fmt::Display for BalanceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceReason::Commission => f.write_str("COMMISSION"),
            BalanceReason::RealizedPnl => f.write_str("REALIZED_PNL"),
        }
    }
}

/// Audit record appended for every cash movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub timestamp: Timestamp,
    pub balance_before: Money,
    pub balance_after: Money,
    pub delta: Money,
    pub reason: BalanceReason,
    pub order_id: Option<OrderId>,
}

impl BalanceUpdate {
    pub fn new(
        timestamp: Timestamp,
        balance_before: Money,
        delta: Money,
        reason: BalanceReason,
        order_id: Option<OrderId>,
    ) -> Self {
        Self {
            timestamp,
            balance_before,
            balance_after: balance_before + delta,
            delta,
            reason,
            order_id,
        }
    }
}

/// Point-in-time copy of the account state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub initial_balance: Money,
    /// Cash balance
    pub balance: Money,
    /// Cash plus unrealized P&L
    pub equity: Money,
    pub realized_pnl: Money,
    pub unrealized_pnl: Money,
    pub commission_paid: Money,
    pub used_margin: Money,
    pub available_margin: Money,
    pub buying_power: Money,
    pub leverage: Decimal,
    pub high_water_mark: Money,
    pub low_water_mark: Money,
    /// Current drawdown as a fraction of the high-water mark
    pub drawdown: Decimal,
    /// Largest drawdown fraction seen
    pub max_drawdown: Decimal,
    /// Largest drawdown in account currency
    pub max_drawdown_amount: Money,
    pub status: AccountStatus,
    pub trade_stats: TradeStats,
    pub updated_at: Option<Timestamp>,
}

impl BalanceSnapshot {
    /// Percentage return on the initial balance, measured on cash
    pub fn return_percent(&self) -> Decimal {
        if self.initial_balance.is_zero() {
            return Decimal::ZERO;
        }
        (self.balance - self.initial_balance) / self.initial_balance * Decimal::ONE_HUNDRED
    }

    pub fn drawdown_percent(&self) -> Decimal {
        self.drawdown * Decimal::ONE_HUNDRED
    }

    pub fn max_drawdown_percent(&self) -> Decimal {
        self.max_drawdown * Decimal::ONE_HUNDRED
    }
}
