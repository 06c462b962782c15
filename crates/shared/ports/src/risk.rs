use holodeck_core::{Instrument, Money, Order, Price, Quantity, RejectReason};
use rust_decimal::Decimal;

use crate::Ledger;

/// Account-dependent pre-trade limits
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    /// Largest resulting position in lots; zero derives it from the balance
    pub max_position_size: Quantity,
    /// Share of the balance used as the derived position limit
    pub derived_position_fraction: Decimal,
    /// Most positions that may be open at once
    pub max_open_positions: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_size: Decimal::ZERO,
            derived_position_fraction: Decimal::new(10, 2),
            max_open_positions: 1,
        }
    }
}

impl RiskConfig {
    pub fn with_max_position_size(mut self, max_position_size: Quantity) -> Self {
        self.max_position_size = max_position_size;
        self
    }

    pub fn with_max_open_positions(mut self, max_open_positions: usize) -> Self {
        self.max_open_positions = max_open_positions;
        self
    }

    /// Position limit in lots for an account holding `balance`
    pub fn position_limit(&self, balance: Money) -> Quantity {
        if self.max_position_size > Decimal::ZERO {
            self.max_position_size
        } else {
            (balance * self.derived_position_fraction).max(Decimal::ZERO)
        }
    }
}

/// Result of a risk check
#[derive(Debug, Clone, PartialEq)]
pub struct RiskCheckResult {
    /// Whether the order is approved
    pub approved: bool,
    /// Reject sub-reason when not approved
    pub rejection: Option<RejectReason>,
    /// Human readable detail when not approved
    pub reason: Option<String>,
    /// Margin the order would add
    pub required_margin: Money,
    /// Available margin after the order
    pub available_after: Money,
    /// Warnings (e.g., margin nearly exhausted)
    pub warnings: Vec<String>,
}

impl RiskCheckResult {
    pub fn approved(required_margin: Money, available_after: Money) -> Self {
        Self {
            approved: true,
            rejection: None,
            reason: None,
            required_margin,
            available_after,
            warnings: Vec::new(),
        }
    }

    pub fn rejected(rejection: RejectReason, reason: String) -> Self {
        Self {
            approved: false,
            rejection: Some(rejection),
            reason: Some(reason),
            required_margin: Decimal::ZERO,
            available_after: Decimal::ZERO,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: String) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// Port for account-dependent order checks
pub trait RiskManager {
    /// Check `order` as if it filled its remaining size at `price`
    fn validate_order(
        &self,
        ledger: &dyn Ledger,
        instrument: &Instrument,
        order: &Order,
        price: Price,
    ) -> RiskCheckResult;

    /// Margin needed for the exposure-increasing part of `size` lots at `price`
    fn required_margin(
        &self,
        ledger: &dyn Ledger,
        instrument: &Instrument,
        order: &Order,
        price: Price,
    ) -> Money;
}
