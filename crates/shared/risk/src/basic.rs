use holodeck_core::{
    AccountStatus, Instrument, InstrumentSpec, Money, Order, Price, RejectReason,
};
use holodeck_ports::{Ledger, RiskCheckResult, RiskConfig, RiskManager};
use log::debug;
use rust_decimal::Decimal;

/// Basic risk manager implementation
///
/// Checks run in order: terminal account, soft block, position size, open-position count,
/// margin. Only the exposure-increasing part of an order is checked;
/// reducing an existing position is always allowed.
pub struct BasicRiskManager {
    config: RiskConfig,
}

impl BasicRiskManager {
    /// Create a new basic risk manager with default config
    pub fn new() -> Self {
        Self {
            config: RiskConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Get the risk configuration
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Exposure-increasing notional of `order` at `price`
    fn increasing_notional(
        &self,
        ledger: &dyn Ledger,
        instrument: &Instrument,
        order: &Order,
        price: Price,
    ) -> Money {
        let increasing = ledger
            .position()
            .increasing_size(order.side, order.remaining_size());
        instrument.notional(price, increasing)
    }
}

impl Default for BasicRiskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskManager for BasicRiskManager {
    fn validate_order(
        &self,
        ledger: &dyn Ledger,
        instrument: &Instrument,
        order: &Order,
        price: Price,
    ) -> RiskCheckResult {
        let position = ledger.position();
        let size = order.remaining_size();
        let increasing = position.increasing_size(order.side, size);

        if increasing.is_zero() {
            return RiskCheckResult::approved(Decimal::ZERO, ledger.available_margin());
        }

        if ledger.status().is_terminal() {
            return RiskCheckResult::rejected(
                RejectReason::PositionLimit,
                format!("Account is {}; no new exposure is accepted", ledger.status()),
            );
        }

        if ledger.status() == AccountStatus::AtLimit {
            return RiskCheckResult::rejected(
                RejectReason::PositionLimit,
                "Account is at limit; only reducing orders are accepted".to_string(),
            );
        }

        // Resulting position on the order's side after the fill
        let reducing = size - increasing;
        let resulting = if reducing.is_zero() && !position.is_flat() {
            position.size + increasing
        } else {
            increasing
        };
        let limit = self.config.position_limit(ledger.balance());
        if resulting > limit {
            return RiskCheckResult::rejected(
                RejectReason::PositionLimit,
                format!("Position size {} exceeds maximum {}", resulting, limit),
            );
        }

        if position.is_flat() && ledger.open_positions() >= self.config.max_open_positions {
            return RiskCheckResult::rejected(
                RejectReason::PositionLimit,
                format!(
                    "Open positions {} already at maximum {}",
                    ledger.open_positions(),
                    self.config.max_open_positions
                ),
            );
        }

        let notional = self.increasing_notional(ledger, instrument, order, price);
        let available = ledger.available_margin();
        if notional > available {
            return RiskCheckResult::rejected(
                RejectReason::InsufficientMargin,
                format!(
                    "Insufficient margin: notional {} exceeds available {}",
                    notional, available
                ),
            );
        }

        let required_margin = self.required_margin(ledger, instrument, order, price);
        let available_after = available - required_margin;
        let mut result = RiskCheckResult::approved(required_margin, available_after);

        // Warn when less than 10% of buying power would remain
        let buying_power = ledger.balance() * ledger.leverage();
        if buying_power > Decimal::ZERO && available_after < buying_power / Decimal::TEN {
            result = result.with_warning("Low available margin after order".to_string());
        }

        debug!(
            "Order validated: side={}, size={}, price={}, notional={}, required_margin={}",
            order.side, size, price, notional, required_margin
        );

        result
    }

    fn required_margin(
        &self,
        ledger: &dyn Ledger,
        instrument: &Instrument,
        order: &Order,
        price: Price,
    ) -> Money {
        let notional = self.increasing_notional(ledger, instrument, order, price);
        let leverage = ledger.leverage();
        if leverage > Decimal::ZERO {
            notional / leverage
        } else {
            notional
        }
    }
}
