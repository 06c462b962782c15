use holodeck_core::{InstrumentError, OrderId, RejectReason};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Order rejected ({reason}): {message}")]
    OrderRejected {
        reason: RejectReason,
        message: String,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Latency of {0} ms cannot be scheduled")]
    LatencyOutOfRange(u64),

    #[error("Unsupported instrument type: {0}")]
    UnsupportedInstrument(String),
}

impl ExchangeError {
    pub fn rejected(reason: RejectReason, message: impl Into<String>) -> Self {
        ExchangeError::OrderRejected {
            reason,
            message: message.into(),
        }
    }
}

impl From<InstrumentError> for ExchangeError {
    fn from(err: InstrumentError) -> Self {
        match err {
            InstrumentError::UnsupportedInstrument(name) => ExchangeError::UnsupportedInstrument(name),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
