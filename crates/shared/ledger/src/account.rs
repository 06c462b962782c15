use holodeck_core::{
    AccountStatus, BalanceReason, BalanceSnapshot, BalanceUpdate, DrawdownPolicy, Execution,
    FillOutcome, Money, OrderId, Position, Tick, Timestamp, TradeStats,
};
use holodeck_ports::{Ledger, LedgerUpdate};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Static account parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AccountConfig {
    pub initial_balance: Money,
    /// Informational three-letter code
    pub currency: String,
    pub leverage: Decimal,
    /// Drawdown limit in percent (20.0 = 20 %)
    pub max_drawdown_percent: Decimal,
    pub drawdown_policy: DrawdownPolicy,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::new(10_000, 0),
            currency: "USD".to_string(),
            leverage: Decimal::ONE,
            max_drawdown_percent: Decimal::new(20, 0),
            drawdown_policy: DrawdownPolicy::Hard,
        }
    }
}

/// Cash account holding the simulation's single position
///
/// Every fill goes through one update sequence: position, commission,
/// realized P&L, margin, watermarks, drawdown, status, audit trail, trade
/// stats. Marks never touch cash; drawdown is measured on equity.
#[derive(Debug, Clone)]
pub struct Account {
    id: Uuid,
    config: AccountConfig,
    balance: Money,
    position: Position,
    realized_pnl: Money,
    commission_paid: Money,
    used_margin: Money,
    high_water_mark: Money,
    low_water_mark: Money,
    drawdown: Decimal,
    max_drawdown: Decimal,
    max_drawdown_amount: Money,
    status: AccountStatus,
    trade_stats: TradeStats,
    history: Vec<BalanceUpdate>,
    updated_at: Option<Timestamp>,
}

impl Account {
    /// Create a new account for an instrument with the given contract size
    pub fn new(config: AccountConfig, contract_size: Decimal) -> Self {
        let initial = config.initial_balance;
        Self {
            id: Uuid::new_v4(),
            balance: initial,
            position: Position::flat(contract_size),
            realized_pnl: Decimal::ZERO,
            commission_paid: Decimal::ZERO,
            used_margin: Decimal::ZERO,
            high_water_mark: initial,
            low_water_mark: initial,
            drawdown: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            max_drawdown_amount: Decimal::ZERO,
            status: AccountStatus::Active,
            trade_stats: TradeStats::default(),
            history: Vec::new(),
            updated_at: None,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    pub fn initial_balance(&self) -> Money {
        self.config.initial_balance
    }

    pub fn used_margin(&self) -> Money {
        self.used_margin
    }

    /// Balance times leverage
    pub fn buying_power(&self) -> Money {
        self.balance * self.config.leverage
    }

    pub fn commission_paid(&self) -> Money {
        self.commission_paid
    }

    pub fn realized_pnl(&self) -> Money {
        self.realized_pnl
    }

    pub fn unrealized_pnl(&self) -> Money {
        self.position.unrealized_pnl
    }

    pub fn high_water_mark(&self) -> Money {
        self.high_water_mark
    }

    /// Current drawdown as a fraction of the high-water mark
    pub fn drawdown(&self) -> Decimal {
        self.drawdown
    }

    pub fn max_drawdown(&self) -> Decimal {
        self.max_drawdown
    }

    pub fn trade_stats(&self) -> &TradeStats {
        &self.trade_stats
    }

    /// Audit trail of cash movements, oldest first
    pub fn history(&self) -> &[BalanceUpdate] {
        &self.history
    }

    pub fn is_blown(&self) -> bool {
        self.status == AccountStatus::Blown
    }

    /// Close the account; blown or already closed accounts are left as they are
    pub fn close(&mut self, timestamp: Timestamp) -> AccountStatus {
        if !self.status.is_terminal() {
            info!(
                "Account {} closed: balance={}, equity={}",
                self.id,
                self.balance,
                self.equity()
            );
            self.status = AccountStatus::Closed;
            self.updated_at = Some(timestamp);
        }
        self.status
    }

    fn post(&mut self, timestamp: Timestamp, delta: Money, reason: BalanceReason, order_id: OrderId) {
        let update = BalanceUpdate::new(timestamp, self.balance, delta, reason, Some(order_id));
        self.balance = update.balance_after;
        debug!(
            "Balance {} {} -> {} ({}) for {}",
            reason, update.balance_before, update.balance_after, delta, order_id
        );
        self.history.push(update);
    }

    fn recompute_margin(&mut self) {
        self.used_margin = if self.config.leverage > Decimal::ZERO {
            self.position.entry_notional() / self.config.leverage
        } else {
            self.position.entry_notional()
        };
    }

    fn recompute_drawdown(&mut self) {
        let equity = self.equity();
        self.high_water_mark = self.high_water_mark.max(equity);
        self.low_water_mark = self.low_water_mark.min(equity);

        let amount = (self.high_water_mark - equity).max(Decimal::ZERO);
        self.drawdown = if self.high_water_mark > Decimal::ZERO {
            amount / self.high_water_mark
        } else {
            Decimal::ZERO
        };
        self.max_drawdown = self.max_drawdown.max(self.drawdown);
        self.max_drawdown_amount = self.max_drawdown_amount.max(amount);
    }

    fn recompute_status(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        let previous = self.status;
        let drawdown_percent = self.drawdown * Decimal::ONE_HUNDRED;

        self.status = if self.balance <= Decimal::ZERO {
            AccountStatus::Blown
        } else if drawdown_percent > self.config.max_drawdown_percent {
            match self.config.drawdown_policy {
                DrawdownPolicy::Hard => AccountStatus::Blown,
                DrawdownPolicy::Soft => AccountStatus::AtLimit,
            }
        } else if self.available_margin() <= Decimal::ZERO {
            AccountStatus::AtLimit
        } else {
            AccountStatus::Active
        };

        if self.status != previous {
            match self.status {
                AccountStatus::Blown => warn!(
                    "Account {} blown: balance={}, equity={}, drawdown={}%",
                    self.id,
                    self.balance,
                    self.equity(),
                    drawdown_percent.round_dp(2)
                ),
                AccountStatus::AtLimit => warn!(
                    "Account {} at limit: available_margin={}, drawdown={}%",
                    self.id,
                    self.available_margin(),
                    drawdown_percent.round_dp(2)
                ),
                _ => info!("Account {} back to {}", self.id, self.status),
            }
        }
    }
}

impl Ledger for Account {
    fn balance(&self) -> Money {
        self.balance
    }

    fn equity(&self) -> Money {
        self.balance + self.position.unrealized_pnl
    }

    fn leverage(&self) -> Decimal {
        self.config.leverage
    }

    fn available_margin(&self) -> Money {
        self.buying_power() - self.used_margin
    }

    fn status(&self) -> AccountStatus {
        self.status
    }

    fn position(&self) -> &Position {
        &self.position
    }

    fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            initial_balance: self.config.initial_balance,
            balance: self.balance,
            equity: self.equity(),
            realized_pnl: self.realized_pnl,
            unrealized_pnl: self.position.unrealized_pnl,
            commission_paid: self.commission_paid,
            used_margin: self.used_margin,
            available_margin: self.available_margin(),
            buying_power: self.buying_power(),
            leverage: self.config.leverage,
            high_water_mark: self.high_water_mark,
            low_water_mark: self.low_water_mark,
            drawdown: self.drawdown,
            max_drawdown: self.max_drawdown,
            max_drawdown_amount: self.max_drawdown_amount,
            status: self.status,
            trade_stats: self.trade_stats.clone(),
            updated_at: self.updated_at,
        }
    }

    fn apply_execution(&mut self, execution: &Execution) -> LedgerUpdate {
        let balance_before = self.balance;
        let status_before = self.status;

        let fill_price = match execution.fill_price {
            Some(price) if execution.is_fill() => price,
            _ => {
                return LedgerUpdate {
                    outcome: FillOutcome::default(),
                    balance_before,
                    balance_after: balance_before,
                    status_before,
                    status_after: status_before,
                };
            }
        };
        let ts = execution.timestamp;

        let outcome = self
            .position
            .apply_fill(execution.side, execution.filled_size, fill_price, ts);

        if execution.commission > Decimal::ZERO {
            self.commission_paid += execution.commission;
            self.post(ts, -execution.commission, BalanceReason::Commission, execution.order_id);
        }

        if outcome.is_reducing() {
            self.realized_pnl += outcome.realized_pnl;
            if !outcome.realized_pnl.is_zero() {
                self.post(ts, outcome.realized_pnl, BalanceReason::RealizedPnl, execution.order_id);
            }
        }

        self.recompute_margin();
        self.recompute_drawdown();
        self.recompute_status();

        if outcome.is_reducing() {
            self.trade_stats.record(outcome.realized_pnl);
        }
        self.updated_at = Some(ts);

        debug!(
            "Posted {} {} {} @ {}: position={} {} entry={}, balance={}, realized={}",
            execution.order_id,
            execution.side,
            execution.filled_size,
            fill_price,
            self.position.side,
            self.position.size,
            self.position.entry_price,
            self.balance,
            outcome.realized_pnl
        );

        LedgerUpdate {
            outcome,
            balance_before,
            balance_after: self.balance,
            status_before,
            status_after: self.status,
        }
    }

    fn mark_to_market(&mut self, tick: &Tick) -> AccountStatus {
        if self.position.is_flat() {
            return self.status;
        }
        self.position.mark_to_market(tick);
        self.recompute_drawdown();
        self.recompute_status();
        self.updated_at = Some(tick.timestamp);
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use holodeck_core::{ExecutionStatus, Order, Side};
    use rust_decimal_macros::dec;

    const FX: Decimal = dec!(100000);

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn account(balance: Decimal, leverage: Decimal) -> Account {
        Account::new(
            AccountConfig {
                initial_balance: balance,
                leverage,
                ..AccountConfig::default()
            },
            FX,
        )
    }

    fn fill(id: u64, side: Side, size: Decimal, price: Decimal, commission: Decimal, at: i64) -> Execution {
        let mut order = Order::market(side, size);
        order.accept(OrderId(id), ts(at));
        Execution::fill(&order, price, size, Decimal::ZERO, commission, ts(at))
    }

    fn tick(bid: Decimal, ask: Decimal, at: i64) -> Tick {
        Tick::new(ts(at), bid, ask, dec!(1))
    }

    #[test]
    fn test_new_account_state() {
        let acct = account(dec!(10000), dec!(100));
        let snap = acct.snapshot();
        assert_eq!(snap.balance, dec!(10000));
        assert_eq!(snap.buying_power, dec!(1000000));
        assert_eq!(snap.available_margin, dec!(1000000));
        assert_eq!(snap.status, AccountStatus::Active);
        assert!(acct.position().is_flat());
    }

    #[test]
    fn test_round_trip_with_commission() {
        let mut acct = account(dec!(10000), dec!(100));
        acct.apply_execution(&fill(1, Side::Buy, dec!(1), dec!(1.1000), dec!(2.75), 0));

        assert_eq!(acct.balance(), dec!(9997.25));
        assert_eq!(acct.used_margin(), dec!(1100));
        assert_eq!(acct.available_margin(), dec!(999725) - dec!(1100));

        let update = acct.apply_execution(&fill(2, Side::Sell, dec!(1), dec!(1.1010), dec!(2.7525), 1));

        assert_eq!(update.outcome.realized_pnl, dec!(100));
        assert_eq!(acct.balance(), dec!(10094.4975));
        assert_eq!(acct.realized_pnl(), dec!(100));
        assert_eq!(acct.commission_paid(), dec!(5.5025));
        assert_eq!(acct.used_margin(), Decimal::ZERO);
        assert_eq!(acct.trade_stats().total, 1);
        assert_eq!(acct.trade_stats().winning, 1);
        assert!(acct.position().is_flat());
    }

    #[test]
    fn test_audit_trail_sums_to_balance_change() {
        let mut acct = account(dec!(10000), dec!(100));
        acct.apply_execution(&fill(1, Side::Buy, dec!(2), dec!(1.1000), dec!(5.5), 0));
        acct.apply_execution(&fill(2, Side::Sell, dec!(1), dec!(1.0950), dec!(2.7), 1));
        acct.apply_execution(&fill(3, Side::Sell, dec!(3), dec!(1.0990), dec!(8.2), 2));
        acct.mark_to_market(&tick(dec!(1.0900), dec!(1.0902), 3));

        let total: Decimal = acct.history().iter().map(|u| u.delta).sum();
        assert_eq!(total, acct.balance() - acct.initial_balance());
        for pair in acct.history().windows(2) {
            assert_eq!(pair[0].balance_after, pair[1].balance_before);
        }
    }

    #[test]
    fn test_mark_to_market_never_changes_cash() {
        let mut acct = account(dec!(10000), dec!(100));
        acct.apply_execution(&fill(1, Side::Buy, dec!(1), dec!(1.1000), Decimal::ZERO, 0));
        acct.mark_to_market(&tick(dec!(1.0950), dec!(1.0952), 1));

        assert_eq!(acct.balance(), dec!(10000));
        assert_eq!(acct.unrealized_pnl(), dec!(-500));
        assert_eq!(acct.equity(), dec!(9500));
        assert_eq!(acct.drawdown(), dec!(0.05));
        assert!(acct.history().is_empty());
    }

    #[test]
    fn test_drawdown_exactly_at_limit_does_not_blow() {
        let mut acct = account(dec!(10000), dec!(100));
        acct.apply_execution(&fill(1, Side::Buy, dec!(1), dec!(1.1000), Decimal::ZERO, 0));
        // -0.0200 * 100000 = -2000 = 20 % of 10000
        let status = acct.mark_to_market(&tick(dec!(1.0800), dec!(1.0802), 1));
        assert_eq!(status, AccountStatus::Active);
        assert_eq!(acct.drawdown(), dec!(0.2));

        let status = acct.mark_to_market(&tick(dec!(1.0799), dec!(1.0801), 2));
        assert_eq!(status, AccountStatus::Blown);
        assert!(acct.is_blown());
    }

    #[test]
    fn test_drawdown_breach_blows_account() {
        let mut acct = account(dec!(10000), dec!(100));
        acct.apply_execution(&fill(1, Side::Buy, dec!(1), dec!(1.1000), Decimal::ZERO, 0));
        acct.mark_to_market(&tick(dec!(1.0700), dec!(1.0702), 1));

        assert_eq!(acct.unrealized_pnl(), dec!(-3000));
        assert_eq!(acct.drawdown(), dec!(0.3));
        assert_eq!(acct.status(), AccountStatus::Blown);
        assert_eq!(acct.balance(), dec!(10000));

        // terminal: recovery does not revive it
        acct.mark_to_market(&tick(dec!(1.2000), dec!(1.2002), 2));
        assert_eq!(acct.status(), AccountStatus::Blown);
    }

    #[test]
    fn test_soft_policy_goes_at_limit_and_recovers() {
        let mut acct = Account::new(
            AccountConfig {
                leverage: dec!(100),
                drawdown_policy: DrawdownPolicy::Soft,
                ..AccountConfig::default()
            },
            FX,
        );
        acct.apply_execution(&fill(1, Side::Buy, dec!(1), dec!(1.1000), Decimal::ZERO, 0));
        acct.mark_to_market(&tick(dec!(1.0700), dec!(1.0702), 1));
        assert_eq!(acct.status(), AccountStatus::AtLimit);

        // closing at the high-water mark level again clears the breach
        acct.mark_to_market(&tick(dec!(1.1000), dec!(1.1002), 2));
        assert_eq!(acct.status(), AccountStatus::Active);
        assert_eq!(acct.max_drawdown(), dec!(0.3));
    }

    #[test]
    fn test_losing_balance_to_zero_blows_account() {
        let mut acct = account(dec!(1000), dec!(100));
        acct.apply_execution(&fill(1, Side::Buy, dec!(1), dec!(1.1000), Decimal::ZERO, 0));
        acct.apply_execution(&fill(2, Side::Sell, dec!(1), dec!(1.0890), Decimal::ZERO, 1));

        assert_eq!(acct.balance(), dec!(-100));
        assert_eq!(acct.status(), AccountStatus::Blown);
        assert_eq!(acct.trade_stats().losing, 1);
    }

    #[test]
    fn test_high_water_mark_is_monotone() {
        let mut acct = account(dec!(10000), dec!(100));
        acct.apply_execution(&fill(1, Side::Buy, dec!(1), dec!(1.1000), Decimal::ZERO, 0));
        let mut last = acct.high_water_mark();
        for (i, bid) in [dec!(1.1050), dec!(1.0980), dec!(1.1100), dec!(1.1000)].into_iter().enumerate() {
            acct.mark_to_market(&tick(bid, bid, i as i64 + 1));
            assert!(acct.high_water_mark() >= last);
            last = acct.high_water_mark();
        }
        assert_eq!(acct.high_water_mark(), dec!(11000));
    }

    #[test]
    fn test_available_margin_identity() {
        let mut acct = account(dec!(10000), dec!(50));
        acct.apply_execution(&fill(1, Side::Sell, dec!(2), dec!(1.2500), dec!(6.25), 0));
        let snap = acct.snapshot();
        assert_eq!(snap.available_margin, snap.leverage * snap.balance - snap.used_margin);
        assert_eq!(snap.used_margin, dec!(5000));
    }

    #[test]
    fn test_non_fill_execution_is_ignored() {
        let mut acct = account(dec!(10000), dec!(1));
        let order = Order::market(Side::Buy, dec!(1));
        let exec = Execution::pending(&order, ts(0));
        assert_eq!(exec.status, ExecutionStatus::Pending);

        let update = acct.apply_execution(&exec);
        assert_eq!(update.balance_after, dec!(10000));
        assert!(acct.position().is_flat());
        assert!(acct.history().is_empty());
    }

    #[test]
    fn test_close_is_terminal_and_idempotent() {
        let mut acct = account(dec!(10000), dec!(1));
        assert_eq!(acct.close(ts(5)), AccountStatus::Closed);
        assert_eq!(acct.close(ts(6)), AccountStatus::Closed);
        assert!(acct.status().is_terminal());
    }
}
