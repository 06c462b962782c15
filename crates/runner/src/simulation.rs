//! Simulation - the single-threaded replay driver
//!
//! Owns every piece of mutable state:
//! - Tick source and simulated clock
//! - Speed throttle against the wall clock
//! - Account (ledger) and order executor
//!
//! Within one tick the order of work is fixed: latency arrivals and the
//! resting sweep, then mark-to-market, then control returns to the caller
//! whose submissions apply in call order.

use holodeck_clock::{Clock, SimulationClock, SpeedThrottle, SystemClock, TimeScale};
use holodeck_core::{
    BalanceSnapshot, Execution, Instrument, InstrumentSpec, Money, Order, OrderId, Position,
    Tick, Timestamp,
};
use holodeck_exchange::{ExecutorConfig, OrderExecutor};
use holodeck_ledger::{Account, AccountConfig};
use holodeck_ports::{Ledger, TickSource};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;

use crate::agent::{Agent, AgentContext};
use crate::config::SimulationConfig;
use crate::error::{ConfigError, Result, SimulationError};
use crate::feed::CsvTickReader;
use crate::metrics::SimulationMetrics;
use crate::report::SimulationReport;

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationStatus {
    Idle,
    Running,
    Paused,
    Stopped,
    Blown,
}

impl SimulationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationStatus::Stopped | SimulationStatus::Blown)
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationStatus::Idle => "IDLE",
            SimulationStatus::Running => "RUNNING",
            SimulationStatus::Paused => "PAUSED",
            SimulationStatus::Stopped => "STOPPED",
            SimulationStatus::Blown => "BLOWN",
        };
        f.write_str(name)
    }
}

/// Copy of the driver state for observers on other threads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub status: SimulationStatus,
    pub last_tick: Option<Tick>,
    pub account: BalanceSnapshot,
    pub position: Position,
    pub resting_orders: Vec<Order>,
    pub metrics: SimulationMetrics,
}

/// Replays one tick stream against one account
pub struct Simulation<S: TickSource> {
    instrument: Instrument,
    account: Account,
    executor: OrderExecutor,
    source: S,
    clock: SimulationClock,
    throttle: SpeedThrottle,
    wall: SystemClock,
    status: SimulationStatus,
    last_tick: Option<Tick>,
    started_at: Option<Timestamp>,
    stopped_at: Option<Timestamp>,
    /// Executions produced inside `next_tick`, waiting for the agent
    unreported: Vec<Execution>,
}

impl Simulation<CsvTickReader<File>> {
    /// Simulation reading ticks from `csv.filepath`
    pub fn from_csv(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let source = CsvTickReader::from_path(&config.csv.filepath, config.csv.has_header)?;
        Self::from_config(config, source)
    }
}

impl<S: TickSource> Simulation<S> {
    pub fn new(
        instrument: Instrument,
        account: AccountConfig,
        executor: ExecutorConfig,
        scale: TimeScale,
        source: S,
    ) -> Self {
        let account = Account::new(account, instrument.contract_size());
        let executor = OrderExecutor::new(executor, &instrument);
        Self {
            instrument,
            account,
            executor,
            source,
            clock: SimulationClock::new(),
            throttle: SpeedThrottle::new(scale),
            wall: SystemClock::new(),
            status: SimulationStatus::Idle,
            last_tick: None,
            started_at: None,
            stopped_at: None,
            unreported: Vec::new(),
        }
    }

    /// Build every component from a validated configuration
    pub fn from_config(config: &SimulationConfig, source: S) -> Result<Self> {
        config.validate()?;
        let instrument = config.instrument()?;
        Ok(Self::new(
            instrument,
            config.account_config(),
            config.executor_config()?,
            config.time_scale(),
            source,
        ))
    }

    /// IDLE -> RUNNING
    pub fn start(&mut self) -> Result<()> {
        if self.status != SimulationStatus::Idle {
            return Err(self.invalid_state("start"));
        }
        self.status = SimulationStatus::Running;
        self.started_at = Some(self.wall.now());
        self.throttle.reset();
        info!(
            "Simulation started: {} {} from {}, balance {} {}, leverage {}, speed {}x",
            self.instrument.asset_class,
            self.instrument.symbol,
            self.source.name(),
            self.account.balance(),
            self.account.config().currency,
            self.account.leverage(),
            self.throttle.scale().multiplier()
        );
        Ok(())
    }

    /// Stop the run and close the account
    ///
    /// Idempotent; a blown simulation stays BLOWN. Returns the final metrics.
    pub fn stop(&mut self) -> SimulationMetrics {
        if !self.status.is_terminal() {
            self.status = SimulationStatus::Stopped;
        }
        if self.stopped_at.is_none() {
            let now = self.last_tick.as_ref().map(|t| t.timestamp).unwrap_or_else(|| self.wall.now());
            self.account.close(now);
            self.stopped_at = Some(self.wall.now());

            let metrics = self.metrics();
            info!(
                "Simulation {}: {} ticks, {} trades, balance {}, return {}%, max drawdown {}%",
                self.status,
                metrics.ticks_processed,
                metrics.trades,
                metrics.final_balance,
                metrics.return_percent.round_dp(2),
                metrics.max_drawdown_percent.round_dp(2)
            );
            return metrics;
        }
        self.metrics()
    }

    /// RUNNING -> PAUSED
    pub fn pause(&mut self) -> Result<()> {
        if self.status != SimulationStatus::Running {
            return Err(self.invalid_state("pause"));
        }
        self.status = SimulationStatus::Paused;
        info!("Simulation paused at {:?}", self.clock.current());
        Ok(())
    }

    /// PAUSED -> RUNNING; pacing restarts from the next tick
    pub fn resume(&mut self) -> Result<()> {
        if self.status != SimulationStatus::Paused {
            return Err(self.invalid_state("resume"));
        }
        self.status = SimulationStatus::Running;
        self.throttle.reset();
        info!("Simulation resumed");
        Ok(())
    }

    /// Advance by one tick
    ///
    /// Reads the next tick, paces it against the wall clock, runs latency
    /// arrivals, DAY expiry and the resting sweep, then marks the position.
    /// Fails with `StreamExhausted` (and stops) once the source is drained.
    pub fn next_tick(&mut self) -> Result<Tick> {
        match self.status {
            SimulationStatus::Running => {}
            SimulationStatus::Blown => return Err(SimulationError::AccountBlown),
            _ => return Err(self.invalid_state("advance")),
        }

        let tick = match self.source.next_tick() {
            Ok(Some(tick)) => tick,
            Ok(None) => {
                info!("Tick stream {} exhausted", self.source.name());
                self.stop();
                return Err(SimulationError::StreamExhausted);
            }
            Err(err) => {
                warn!("Tick source {} failed: {}", self.source.name(), err);
                self.stop();
                return Err(err.into());
            }
        };

        if !tick.is_valid() {
            warn!("Invalid tick at {}: bid={} ask={}", tick.timestamp, tick.bid, tick.ask);
            self.stop();
            return Err(SimulationError::InvalidTick {
                timestamp: tick.timestamp,
                bid: tick.bid,
                ask: tick.ask,
            });
        }

        if let Err(err) = self.clock.advance(tick.timestamp) {
            warn!("Tick order violation: {}", err);
            self.stop();
            return Err(err.into());
        }
        self.throttle.pace(tick.timestamp);

        let executions = self.executor.on_tick(&tick, &self.instrument, &mut self.account);
        self.account.mark_to_market(&tick);
        self.unreported.extend(executions);
        self.last_tick = Some(tick.clone());
        self.sync_status();

        Ok(tick)
    }

    /// Submit an order against the most recent tick
    ///
    /// Validation and risk failures come back as a REJECTED execution; only
    /// lifecycle problems are errors.
    pub fn submit_order(&mut self, order: Order) -> Result<Execution> {
        match self.status {
            SimulationStatus::Running => {}
            SimulationStatus::Blown => return Err(SimulationError::AccountBlown),
            _ => return Err(self.invalid_state("submit an order")),
        }
        if self.account.is_blown() {
            return Err(SimulationError::AccountBlown);
        }
        let Some(tick) = self.last_tick.as_ref() else {
            return Err(self.invalid_state("submit an order before the first tick"));
        };

        let execution = self
            .executor
            .submit(order, tick, &self.instrument, &mut self.account);
        self.sync_status();
        Ok(execution)
    }

    /// Cancel a resting or in-flight order
    pub fn cancel_order(&mut self, id: OrderId) -> Result<Execution> {
        if !matches!(
            self.status,
            SimulationStatus::Running | SimulationStatus::Paused
        ) {
            return Err(self.invalid_state("cancel an order"));
        }
        let now = match &self.last_tick {
            Some(tick) => tick.timestamp,
            None => self.wall.now(),
        };
        Ok(self.executor.cancel(id, now)?)
    }

    /// Change the replay speed; must be > 0
    pub fn set_speed(&mut self, multiplier: f64) -> Result<()> {
        if multiplier.is_nan() || multiplier <= 0.0 {
            return Err(ConfigError::invalid(
                "speed.multiplier",
                format!("{} must be > 0", multiplier),
            )
            .into());
        }
        self.throttle.set_scale(TimeScale::from_multiplier(multiplier));
        info!("Speed set to {}x", multiplier);
        Ok(())
    }

    /// Drive the tick loop with `agent` until the stream ends or the account blows
    pub fn run(&mut self, agent: &mut dyn Agent) -> Result<SimulationMetrics> {
        if self.status == SimulationStatus::Idle {
            self.start()?;
        }
        info!("Running agent {}", agent.name());

        loop {
            let tick = match self.next_tick() {
                Ok(tick) => tick,
                Err(SimulationError::StreamExhausted) | Err(SimulationError::AccountBlown) => break,
                Err(err) => return Err(err),
            };

            for execution in self.drain_executions() {
                agent.on_execution(&execution);
            }
            if self.is_blown() {
                break;
            }

            let account = self.account.snapshot();
            let resting = self.executor.resting_orders();
            let orders = agent.on_tick(&AgentContext {
                tick: &tick,
                account: &account,
                position: self.account.position(),
                resting: &resting,
            });

            for order in orders {
                match self.submit_order(order) {
                    Ok(execution) => agent.on_execution(&execution),
                    Err(SimulationError::AccountBlown) => break,
                    Err(err) => return Err(err),
                }
            }
            if self.is_blown() {
                break;
            }
        }

        Ok(self.stop())
    }

    /// Executions produced inside `next_tick` since the last drain
    pub fn drain_executions(&mut self) -> Vec<Execution> {
        std::mem::take(&mut self.unreported)
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SimulationStatus::Running
    }

    pub fn is_blown(&self) -> bool {
        self.status == SimulationStatus::Blown || self.account.is_blown()
    }

    pub fn balance(&self) -> Money {
        self.account.balance()
    }

    pub fn position(&self) -> &Position {
        self.account.position()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn executor(&self) -> &OrderExecutor {
        &self.executor
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn last_tick(&self) -> Option<&Tick> {
        self.last_tick.as_ref()
    }

    /// Live metrics; frozen session duration once stopped
    pub fn metrics(&self) -> SimulationMetrics {
        let session_duration_ms = match self.started_at {
            Some(started) => {
                let until = self.stopped_at.unwrap_or_else(|| self.wall.now());
                (until - started).num_milliseconds().max(0)
            }
            None => 0,
        };
        SimulationMetrics::collect(
            self.clock.ticks(),
            &self.account.snapshot(),
            self.executor.stats(),
            self.clock.elapsed().num_milliseconds(),
            session_duration_ms,
        )
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            status: self.status,
            last_tick: self.last_tick.clone(),
            account: self.account.snapshot(),
            position: self.account.position().clone(),
            resting_orders: self.executor.resting_orders(),
            metrics: self.metrics(),
        }
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport::new(
            &self.instrument,
            &self.account.config().currency,
            self.status,
            self.metrics(),
        )
    }

    fn sync_status(&mut self) {
        if self.account.is_blown() && self.status != SimulationStatus::Blown {
            let snapshot = self.account.snapshot();
            warn!(
                "Account blown: balance {}, equity {}, drawdown {}%",
                snapshot.balance,
                snapshot.equity,
                snapshot.drawdown_percent().round_dp(2)
            );
            self.status = SimulationStatus::Blown;
        }
    }

    fn invalid_state(&self, operation: &'static str) -> SimulationError {
        SimulationError::InvalidState {
            operation,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MemoryTickSource;
    use chrono::{TimeZone, Utc};
    use holodeck_core::{OrderStatus, Side};
    use rust_decimal_macros::dec;

    fn tick(ms: i64, bid: rust_decimal::Decimal, ask: rust_decimal::Decimal) -> Tick {
        Tick::new(Utc.timestamp_millis_opt(ms).unwrap(), bid, ask, dec!(10))
    }

    fn simulation(ticks: Vec<Tick>) -> Simulation<MemoryTickSource> {
        Simulation::new(
            Instrument::forex("EUR/USD"),
            AccountConfig {
                leverage: dec!(100),
                ..AccountConfig::default()
            },
            ExecutorConfig::default(),
            TimeScale::Unbounded,
            MemoryTickSource::new(ticks),
        )
    }

    #[test]
    fn test_next_tick_before_start_is_invalid() {
        let mut sim = simulation(vec![tick(0, dec!(1.1), dec!(1.1))]);
        assert!(matches!(
            sim.next_tick(),
            Err(SimulationError::InvalidState { status: SimulationStatus::Idle, .. })
        ));
    }

    #[test]
    fn test_start_twice_is_invalid() {
        let mut sim = simulation(Vec::new());
        sim.start().unwrap();
        assert!(matches!(sim.start(), Err(SimulationError::InvalidState { .. })));
    }

    #[test]
    fn test_pause_blocks_ticks_until_resume() {
        let mut sim = simulation(vec![tick(0, dec!(1.1), dec!(1.1))]);
        sim.start().unwrap();
        sim.pause().unwrap();
        assert!(matches!(
            sim.next_tick(),
            Err(SimulationError::InvalidState { status: SimulationStatus::Paused, .. })
        ));
        sim.resume().unwrap();
        assert!(sim.next_tick().is_ok());
    }

    #[test]
    fn test_out_of_order_tick_is_fatal() {
        let mut sim = simulation(vec![
            tick(1000, dec!(1.1), dec!(1.1)),
            tick(500, dec!(1.1), dec!(1.1)),
        ]);
        sim.start().unwrap();
        sim.next_tick().unwrap();
        let err = sim.next_tick().unwrap_err();
        assert!(matches!(err, SimulationError::TickOrderViolation { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(sim.status(), SimulationStatus::Stopped);
    }

    #[test]
    fn test_crossed_tick_is_fatal() {
        let mut sim = simulation(vec![
            tick(0, dec!(1.1000), dec!(1.1001)),
            tick(1000, dec!(1.1005), dec!(1.1001)),
        ]);
        sim.start().unwrap();
        sim.next_tick().unwrap();

        let err = sim.next_tick().unwrap_err();
        assert!(matches!(err, SimulationError::InvalidTick { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(sim.status(), SimulationStatus::Stopped);
        assert_eq!(sim.last_tick().map(|t| t.ask), Some(dec!(1.1001)));
        assert_eq!(sim.metrics().ticks_processed, 1);
    }

    #[test]
    fn test_submit_before_first_tick_is_invalid() {
        let mut sim = simulation(vec![tick(0, dec!(1.1), dec!(1.1))]);
        sim.start().unwrap();
        assert!(matches!(
            sim.submit_order(Order::market(Side::Buy, dec!(1))),
            Err(SimulationError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_set_speed_validates() {
        let mut sim = simulation(Vec::new());
        assert!(sim.set_speed(0.0).is_err());
        assert!(sim.set_speed(-3.0).is_err());
        assert!(sim.set_speed(f64::NAN).is_err());
        assert!(sim.set_speed(250.0).is_ok());
        assert!(sim.set_speed(f64::INFINITY).is_ok());
    }

    #[test]
    fn test_cancel_resting_order() {
        let mut sim = simulation(vec![tick(0, dec!(1.0999), dec!(1.1001))]);
        sim.start().unwrap();
        sim.next_tick().unwrap();

        let ack = sim
            .submit_order(Order::limit(Side::Buy, dec!(1), dec!(1.0900)))
            .unwrap();
        assert_eq!(sim.snapshot().resting_orders.len(), 1);

        let canceled = sim.cancel_order(ack.order_id).unwrap();
        assert_eq!(canceled.order_id, ack.order_id);
        assert!(sim.snapshot().resting_orders.is_empty());
        assert!(matches!(
            sim.cancel_order(ack.order_id),
            Err(SimulationError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_stop_is_idempotent_and_closes_account() {
        let mut sim = simulation(vec![tick(0, dec!(1.1), dec!(1.1))]);
        sim.start().unwrap();
        sim.next_tick().unwrap();
        let first = sim.stop();
        let second = sim.stop();
        assert_eq!(first.ticks_processed, second.ticks_processed);
        assert_eq!(sim.status(), SimulationStatus::Stopped);
        assert_eq!(sim.account().status(), holodeck_core::AccountStatus::Closed);
        assert!(matches!(sim.next_tick(), Err(SimulationError::InvalidState { .. })));
    }

    #[test]
    fn test_resting_order_stays_pending_at_stream_end() {
        let mut sim = simulation(vec![
            tick(0, dec!(1.0999), dec!(1.1001)),
            tick(1000, dec!(1.0998), dec!(1.1000)),
        ]);
        sim.start().unwrap();
        sim.next_tick().unwrap();
        sim.submit_order(Order::limit(Side::Sell, dec!(1), dec!(1.2000)))
            .unwrap();
        sim.next_tick().unwrap();
        assert!(matches!(sim.next_tick(), Err(SimulationError::StreamExhausted)));

        let resting = sim.snapshot().resting_orders;
        assert_eq!(resting.len(), 1);
        assert_eq!(resting[0].status, OrderStatus::Pending);
    }
}
