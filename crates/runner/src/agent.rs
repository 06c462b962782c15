//! Agent harness - decision makers driven by `Simulation::run`
//!
//! Each tick the driver sweeps resting orders and marks the position,
//! then hands the agent a read-only context. Orders the agent returns are
//! submitted in order against that same tick.

use holodeck_core::{
    BalanceSnapshot, Execution, Order, OrderType, Position, Price, Quantity, Side, Tick,
    TimeInForce, Timestamp,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::feed::parse_timestamp;

/// Read-only state handed to an agent on every tick
pub struct AgentContext<'a> {
    pub tick: &'a Tick,
    pub account: &'a BalanceSnapshot,
    pub position: &'a Position,
    /// Working limit orders, oldest first
    pub resting: &'a [Order],
}

/// Trading logic plugged into the tick loop
pub trait Agent {
    /// Orders to submit against the current tick
    fn on_tick(&mut self, ctx: &AgentContext<'_>) -> Vec<Order>;

    /// Every execution that concerns the agent: its own submissions plus
    /// fills, expiries and latency arrivals produced inside the tick loop
    fn on_execution(&mut self, _execution: &Execution) {}

    fn name(&self) -> &str {
        "agent"
    }
}

/// Never trades
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldAgent;

impl Agent for HoldAgent {
    fn on_tick(&mut self, _ctx: &AgentContext<'_>) -> Vec<Order> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "hold"
    }
}

/// Point in time of a scheduled order: epoch milliseconds or RFC 3339
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleTime {
    Millis(i64),
    Text(String),
}

impl ScheduleTime {
    pub fn resolve(&self) -> Result<Timestamp, String> {
        match self {
            ScheduleTime::Millis(ms) => parse_timestamp(&ms.to_string()),
            ScheduleTime::Text(raw) => parse_timestamp(raw),
        }
    }
}

fn default_order_type() -> OrderType {
    OrderType::Market
}

/// One entry of an order schedule file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduledOrder {
    pub at: ScheduleTime,
    pub side: Side,
    #[serde(rename = "type", default = "default_order_type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub size: Quantity,
    #[serde(default)]
    pub limit_price: Option<Price>,
    #[serde(default)]
    pub time_in_force: TimeInForce,
}

impl ScheduledOrder {
    pub fn to_order(&self) -> Order {
        Order::new(
            self.side,
            self.order_type,
            self.size,
            self.limit_price,
            self.time_in_force,
        )
    }
}

/// Replays a fixed schedule: every order is submitted on the first tick at
/// or after its time, in schedule order
#[derive(Debug, Clone, Default)]
pub struct ScheduledAgent {
    schedule: VecDeque<(Timestamp, Order)>,
    executions: Vec<Execution>,
}

impl ScheduledAgent {
    pub fn new(mut schedule: Vec<(Timestamp, Order)>) -> Self {
        // Stable: orders sharing a time keep their relative order
        schedule.sort_by_key(|(at, _)| *at);
        Self {
            schedule: schedule.into(),
            executions: Vec::new(),
        }
    }

    /// Parse a JSON array of scheduled orders
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let entries: Vec<ScheduledOrder> = serde_json::from_str(raw)?;
        let schedule = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let at = entry
                    .at
                    .resolve()
                    .map_err(|reason| ConfigError::invalid(format!("orders[{}].at", index), reason))?;
                Ok((at, entry.to_order()))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self::new(schedule))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Orders not yet submitted
    pub fn remaining(&self) -> usize {
        self.schedule.len()
    }

    /// Every execution observed so far
    pub fn executions(&self) -> &[Execution] {
        &self.executions
    }
}

impl Agent for ScheduledAgent {
    fn on_tick(&mut self, ctx: &AgentContext<'_>) -> Vec<Order> {
        let mut due = Vec::new();
        while let Some((at, _)) = self.schedule.front() {
            if *at > ctx.tick.timestamp {
                break;
            }
            if let Some((_, order)) = self.schedule.pop_front() {
                due.push(order);
            }
        }
        if !due.is_empty() {
            debug!("{} scheduled orders due at {}", due.len(), ctx.tick.timestamp);
        }
        due
    }

    fn on_execution(&mut self, execution: &Execution) {
        self.executions.push(execution.clone());
    }

    fn name(&self) -> &str {
        "scheduled"
    }
}
