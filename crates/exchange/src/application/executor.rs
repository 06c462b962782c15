use chrono::Duration;
use holodeck_core::{
    Execution, Instrument, InstrumentSpec, Order, OrderId, OrderStatus, OrderType, Price,
    RejectReason, Tick, TimeInForce, Timestamp,
};
use holodeck_ports::{Ledger, RiskConfig, RiskManager};
use holodeck_risk::BasicRiskManager;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::validate_order;
use crate::error::{ExchangeError, Result};
use crate::infrastructure::{InflightQueue, RestingBook, RestingOrder};
use crate::pricing::{CommissionCalculator, CommissionModel, PartialFillPolicy, SlippageModel};
use crate::stats::ExecutionStats;

/// Friction and limits applied by the executor
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    /// `None` charges no commission
    pub commission: Option<CommissionModel>,
    pub slippage: SlippageModel,
    pub partial_fill: PartialFillPolicy,
    /// Delay between submission and execution; zero executes immediately
    pub latency_ms: u64,
    pub risk: RiskConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            commission: None,
            slippage: SlippageModel::None,
            partial_fill: PartialFillPolicy::None,
            latency_ms: 0,
            risk: RiskConfig::default(),
        }
    }
}

/// Turns agent orders plus the current tick into executions
///
/// Owns the resting limit orders and the in-flight (latency) queue. The
/// instrument and the ledger are borrowed per call; fills are posted to
/// the ledger through the `Ledger` port.
pub struct OrderExecutor {
    config: ExecutorConfig,
    commission: CommissionCalculator,
    risk_manager: Box<dyn RiskManager>,
    resting: RestingBook,
    inflight: InflightQueue,
    next_id: u64,
    stats: ExecutionStats,
}

impl OrderExecutor {
    pub fn new(config: ExecutorConfig, instrument: &Instrument) -> Self {
        let commission = match config.commission {
            Some(model) => CommissionCalculator::for_instrument(instrument).with_model(model),
            None => CommissionCalculator::disabled(instrument),
        };
        let risk_manager = Box::new(BasicRiskManager::with_config(config.risk.clone()));
        Self {
            config,
            commission,
            risk_manager,
            resting: RestingBook::new(),
            inflight: InflightQueue::new(),
            next_id: 0,
            stats: ExecutionStats::default(),
        }
    }

    /// Replace the default `BasicRiskManager`
    pub fn with_risk_manager(mut self, risk_manager: Box<dyn RiskManager>) -> Self {
        self.risk_manager = risk_manager;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn commission_calculator(&self) -> &CommissionCalculator {
        &self.commission
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Working limit orders in insertion order
    pub fn resting_orders(&self) -> Vec<Order> {
        self.resting.iter().map(|r| r.order.clone()).collect()
    }

    /// Orders still waiting out their latency
    pub fn inflight_orders(&self) -> Vec<Order> {
        self.inflight.iter().cloned().collect()
    }

    pub fn resting_order(&self, id: OrderId) -> Option<&Order> {
        self.resting.get(id)
    }

    /// Accept an order against the current tick
    ///
    /// Returns the fill, a rejection, a HOLD acknowledgement, or a PENDING
    /// acknowledgement for resting limits and in-flight orders.
    pub fn submit(
        &mut self,
        mut order: Order,
        tick: &Tick,
        instrument: &Instrument,
        ledger: &mut dyn Ledger,
    ) -> Execution {
        let now = tick.timestamp;
        self.next_id += 1;
        order.accept(OrderId(self.next_id), now);
        self.stats.record_submission(order.order_type, order.side.is_hold());

        if let Err(err) = validate_order(&order, instrument, ledger.position()) {
            return self.reject(&mut order, err, now, 0);
        }

        if order.side.is_hold() {
            debug!("{} HOLD at {}", order.id, now);
            return Execution::hold(&order, now);
        }

        let latency_ms = self.config.latency_ms;
        if latency_ms > 0 {
            let due = i64::try_from(latency_ms)
                .ok()
                .and_then(Duration::try_milliseconds)
                .and_then(|delay| now.checked_add_signed(delay));
            let Some(due) = due else {
                let err = ExchangeError::LatencyOutOfRange(latency_ms);
                return self.reject(&mut order, err, now, 0);
            };
            order.set_status(OrderStatus::Pending, now);
            debug!("{} in flight until {}", order.id, due);
            let execution = Execution::pending(&order, now).with_latency(latency_ms);
            self.inflight.push(due, order);
            return execution;
        }

        self.execute(order, tick, instrument, ledger, 0)
    }

    /// Process a new tick: latency arrivals, DAY expiry, then the resting sweep
    ///
    /// Returns every execution produced, in processing order.
    pub fn on_tick(
        &mut self,
        tick: &Tick,
        instrument: &Instrument,
        ledger: &mut dyn Ledger,
    ) -> Vec<Execution> {
        let now = tick.timestamp;
        let mut executions = Vec::new();

        // Orders that arrived this tick have already had their chance
        let mut arrived = HashSet::new();
        for mut order in self.inflight.pop_due(now) {
            arrived.insert(order.id);
            let latency_ms = self.config.latency_ms;
            if ledger.status().is_terminal() {
                order.set_status(OrderStatus::Canceled, now);
                let execution = Execution::canceled(&order, now).with_latency(latency_ms);
                self.stats.record(&execution);
                warn!("{} canceled on arrival: account is {}", order.id, ledger.status());
                executions.push(execution);
                continue;
            }
            executions.push(self.execute(order, tick, instrument, ledger, latency_ms));
        }

        for expired in self.resting.take_expired(now) {
            let mut order = expired.order;
            order.set_status(OrderStatus::Canceled, now);
            let execution = Execution::canceled(&order, now);
            self.stats.expired += 1;
            self.stats.record(&execution);
            info!("{} expired at session close {}", order.id, now);
            executions.push(execution);
        }

        for RestingOrder { mut order, expires_at } in self.resting.drain() {
            let skip = arrived.contains(&order.id)
                || ledger.status().is_terminal()
                || !order.is_marketable(tick);
            if skip {
                self.resting.insert(order, expires_at);
                continue;
            }

            let price = order.limit_price.unwrap_or(Decimal::ZERO);
            if let Err(err) = self.check_risk(&order, instrument, &*ledger, price) {
                executions.push(self.reject(&mut order, err, now, 0));
                continue;
            }

            match self.try_fill_limit(&mut order, tick, instrument, ledger, 0) {
                Some(execution) => {
                    executions.push(execution);
                    if !order.is_filled() {
                        self.resting.insert(order, expires_at);
                    }
                }
                None => self.resting.insert(order, expires_at),
            }
        }

        executions
    }

    /// Cancel a resting or in-flight order
    pub fn cancel(&mut self, id: OrderId, now: Timestamp) -> Result<Execution> {
        let mut order = match self.resting.remove(id) {
            Some(entry) => entry.order,
            None => self.inflight.cancel(id).ok_or(ExchangeError::OrderNotFound(id))?,
        };
        order.set_status(OrderStatus::Canceled, now);
        let execution = Execution::canceled(&order, now);
        self.stats.record(&execution);
        info!("{} canceled with {} remaining", id, order.remaining_size());
        Ok(execution)
    }

    fn execute(
        &mut self,
        mut order: Order,
        tick: &Tick,
        instrument: &Instrument,
        ledger: &mut dyn Ledger,
        latency_ms: u64,
    ) -> Execution {
        let now = tick.timestamp;
        let price = match order.order_type {
            OrderType::Market => tick.touch(order.side),
            OrderType::Limit => order.limit_price.unwrap_or(Decimal::ZERO),
        };
        if let Err(err) = self.check_risk(&order, instrument, &*ledger, price) {
            return self.reject(&mut order, err, now, latency_ms);
        }

        match order.order_type {
            OrderType::Market => self.fill_market(order, tick, instrument, ledger, latency_ms),
            OrderType::Limit => {
                let execution = if order.is_marketable(tick) {
                    self.try_fill_limit(&mut order, tick, instrument, ledger, latency_ms)
                } else {
                    None
                };
                match execution {
                    Some(execution) => {
                        if !order.is_filled() {
                            self.rest(order, instrument, now);
                        }
                        execution
                    }
                    None => {
                        order.set_status(OrderStatus::Pending, now);
                        let execution = Execution::pending(&order, now).with_latency(latency_ms);
                        debug!(
                            "{} resting: {} {} @ {}",
                            order.id, order.side, order.size, price
                        );
                        self.rest(order, instrument, now);
                        execution
                    }
                }
            }
        }
    }

    fn fill_market(
        &mut self,
        mut order: Order,
        tick: &Tick,
        instrument: &Instrument,
        ledger: &mut dyn Ledger,
        latency_ms: u64,
    ) -> Execution {
        let now = tick.timestamp;
        let remaining = order.remaining_size();
        let fillable = self.config.partial_fill.fillable(order.side, remaining, tick);

        if fillable <= Decimal::ZERO || (fillable < instrument.min_volume() && fillable < remaining) {
            let err = ExchangeError::rejected(
                RejectReason::SizeOutOfRange,
                format!(
                    "Fillable size {} below minimum volume {}",
                    fillable,
                    instrument.min_volume()
                ),
            );
            return self.reject(&mut order, err, now, latency_ms);
        }

        let quote = self.config.slippage.quote(order.side, fillable, tick, instrument);
        if quote.unfilled > Decimal::ZERO {
            debug!(
                "{}: {} lots beyond visible depth priced at worst level",
                order.id, quote.unfilled
            );
        }
        let commission = self.commission.compute(quote.price, fillable);
        let execution = Execution::fill(&order, quote.price, fillable, quote.slippage, commission, now)
            .with_latency(latency_ms);

        order.record_fill(fillable, now);
        let status = if order.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        order.set_status(status, now);

        self.post(&execution, instrument, ledger);
        execution
    }

    /// Fill a marketable limit at its limit price
    ///
    /// `None` when this tick cannot absorb at least the minimum volume; the
    /// order keeps resting.
    fn try_fill_limit(
        &mut self,
        order: &mut Order,
        tick: &Tick,
        instrument: &Instrument,
        ledger: &mut dyn Ledger,
        latency_ms: u64,
    ) -> Option<Execution> {
        let now = tick.timestamp;
        let price = order.limit_price?;
        let remaining = order.remaining_size();
        let fillable = self.config.partial_fill.fillable(order.side, remaining, tick);

        if fillable <= Decimal::ZERO || (fillable < instrument.min_volume() && fillable < remaining) {
            debug!("{}: only {} fillable, keeps resting", order.id, fillable);
            return None;
        }

        let commission = self.commission.compute(price, fillable);
        let execution = Execution::fill(order, price, fillable, Decimal::ZERO, commission, now)
            .with_latency(latency_ms);

        order.record_fill(fillable, now);
        let status = if order.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::Pending
        };
        order.set_status(status, now);

        self.post(&execution, instrument, ledger);
        Some(execution)
    }

    fn rest(&mut self, order: Order, instrument: &Instrument, now: Timestamp) {
        let expires_at = match order.time_in_force {
            TimeInForce::DAY => Some(instrument.session_close_after(order.submitted_at.unwrap_or(now))),
            TimeInForce::GTC => None,
        };
        self.resting.insert(order, expires_at);
    }

    fn post(&mut self, execution: &Execution, instrument: &Instrument, ledger: &mut dyn Ledger) {
        let update = ledger.apply_execution(execution);
        self.stats.record(execution);
        self.stats.record_fill_costs(execution, instrument.contract_size());
        if self.commission.is_enabled() {
            if let Some(price) = execution.fill_price {
                self.stats.commission.record(
                    instrument.asset_class,
                    execution.commission,
                    price,
                    execution.filled_size,
                    instrument.contract_size(),
                );
            }
        }

        debug!(
            "{} {} {} {}/{} @ {:?} slippage={} commission={} balance {} -> {}",
            execution.order_id,
            execution.status,
            execution.side,
            execution.filled_size,
            execution.requested_size,
            execution.fill_price,
            execution.slippage,
            execution.commission,
            update.balance_before,
            update.balance_after
        );
    }

    fn check_risk(
        &self,
        order: &Order,
        instrument: &Instrument,
        ledger: &dyn Ledger,
        price: Price,
    ) -> Result<()> {
        let result = self.risk_manager.validate_order(ledger, instrument, order, price);
        if !result.approved {
            return Err(ExchangeError::rejected(
                result.rejection.unwrap_or(RejectReason::InsufficientMargin),
                result
                    .reason
                    .unwrap_or_else(|| "Order rejected by risk check".to_string()),
            ));
        }
        for warning in &result.warnings {
            warn!("Order risk warning for {}: {}", order.id, warning);
        }
        Ok(())
    }

    fn reject(
        &mut self,
        order: &mut Order,
        err: ExchangeError,
        now: Timestamp,
        latency_ms: u64,
    ) -> Execution {
        let (reason, message) = match err {
            ExchangeError::OrderRejected { reason, message } => (reason, message),
            other => (RejectReason::UnsupportedSide, other.to_string()),
        };
        order.set_status(OrderStatus::Rejected, now);
        warn!("{} rejected ({}): {}", order.id, reason, message);
        let execution = Execution::rejected(order, reason, message, now).with_latency(latency_ms);
        self.stats.record(&execution);
        execution
    }
}
