//! Holodeck Runner - historical market replay
//!
//! Drives one agent against one account over a recorded tick stream:
//!
//! - **Config**: JSON run configuration and validation
//! - **Feed**: CSV and in-memory tick sources
//! - **Agent**: the decision-maker harness
//! - **Simulation**: the tick loop, lifecycle and account ownership
//! - **Metrics / Report**: end-of-run figures
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────┐   ticks    ┌──────────────────────────────┐
//!   │  TickSource  │──────────▶│          Simulation           │
//!   │ (CSV/memory) │            │  clock · throttle · status   │
//!   └──────────────┘            └──────┬───────────────▲───────┘
//!                                      │ orders        │ context
//!                                      ▼               │
//!                               ┌──────────────┐  ┌────┴─────┐
//!                               │ OrderExecutor│  │  Agent   │
//!                               └──────┬───────┘  └──────────┘
//!                                      │ executions
//!                                      ▼
//!                               ┌──────────────┐
//!                               │   Account    │
//!                               └──────────────┘
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod report;
pub mod simulation;

// Re-export main types
pub use agent::{Agent, AgentContext, HoldAgent, ScheduleTime, ScheduledAgent, ScheduledOrder};
pub use config::{
    AccountSettings, CsvSettings, ExecutionSettings, InstrumentSettings, PartialFillMode,
    SimulationConfig, SlippageKind, SpeedSettings,
};
pub use error::{ConfigError, Result, SimulationError};
pub use feed::{CsvTickReader, MemoryTickSource};
pub use metrics::SimulationMetrics;
pub use report::SimulationReport;
pub use simulation::{Simulation, SimulationSnapshot, SimulationStatus};
