use holodeck_core::{OrderId, Price, RejectReason, Timestamp};
use holodeck_exchange::ExchangeError;
use holodeck_ports::{ClockError, TickSourceError};
use std::path::PathBuf;
use thiserror::Error;

use crate::simulation::SimulationStatus;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// serde's message names the offending or unknown field
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Unsupported instrument type: {0}")]
    UnsupportedInstrument(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Everything the driver can fail with
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Configuration invalid: {0}")]
    ConfigInvalid(#[from] ConfigError),

    #[error("Tick at {current} arrived after {previous}")]
    TickOrderViolation {
        previous: Timestamp,
        current: Timestamp,
    },

    #[error("Crossed tick at {timestamp}: bid {bid} above ask {ask}")]
    InvalidTick {
        timestamp: Timestamp,
        bid: Price,
        ask: Price,
    },

    #[error("Cannot {operation} while {status}")]
    InvalidState {
        operation: &'static str,
        status: SimulationStatus,
    },

    #[error("Order rejected ({reason}): {message}")]
    OrderRejected {
        reason: RejectReason,
        message: String,
    },

    #[error("Account blown")]
    AccountBlown,

    #[error("Tick stream exhausted")]
    StreamExhausted,

    #[error("Unsupported instrument: {0}")]
    UnsupportedInstrument(String),

    #[error("Order {0} is not working")]
    OrderNotFound(OrderId),

    #[error("Tick source error: {0}")]
    TickSource(#[from] TickSourceError),
}

impl SimulationError {
    /// Process exit code for the CLI
    pub fn exit_code(&self) -> u8 {
        match self {
            SimulationError::StreamExhausted => 0,
            SimulationError::ConfigInvalid(_)
            | SimulationError::UnsupportedInstrument(_)
            | SimulationError::InvalidState { .. }
            | SimulationError::OrderRejected { .. }
            | SimulationError::OrderNotFound(_) => 1,
            SimulationError::TickSource(_)
            | SimulationError::TickOrderViolation { .. }
            | SimulationError::InvalidTick { .. } => 2,
            SimulationError::AccountBlown => 3,
        }
    }
}

impl From<ClockError> for SimulationError {
    fn from(err: ClockError) -> Self {
        match err {
            ClockError::Backwards { previous, current } => {
                SimulationError::TickOrderViolation { previous, current }
            }
        }
    }
}

impl From<ExchangeError> for SimulationError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::OrderRejected { reason, message } => {
                SimulationError::OrderRejected { reason, message }
            }
            ExchangeError::OrderNotFound(id) => SimulationError::OrderNotFound(id),
            ExchangeError::UnsupportedInstrument(name) => {
                SimulationError::UnsupportedInstrument(name)
            }
            err @ ExchangeError::LatencyOutOfRange(_) => SimulationError::OrderRejected {
                reason: RejectReason::UnsupportedSide,
                message: err.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
