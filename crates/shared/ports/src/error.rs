use holodeck_core::Timestamp;
use thiserror::Error;

/// Errors raised by tick producers
#[derive(Error, Debug)]
pub enum TickSourceError {
    #[error("Tick source I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed tick at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("Invalid tick at line {line}: {reason}")]
    InvalidTick { line: u64, reason: String },
}

pub type TickSourceResult<T> = std::result::Result<T, TickSourceError>;

/// Errors raised by the simulated clock
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Clock cannot move backwards: {current} is before {previous}")]
    Backwards {
        previous: Timestamp,
        current: Timestamp,
    },
}

pub type ClockResult<T> = std::result::Result<T, ClockError>;
