use chrono::{DateTime, Utc};
use holodeck_core::Timestamp;
use holodeck_ports::{Clock, ClockError, ClockResult};

/// Simulated clock driven by tick timestamps
///
/// Only moves when a tick is processed and never moves backwards. Before
/// the first tick it reads the Unix epoch.
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    start: Option<Timestamp>,
    current: Option<Timestamp>,
    advances: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move simulated time to `timestamp`
    ///
    /// Equal timestamps are accepted; earlier ones fail with
    /// `ClockError::Backwards` and leave the clock untouched.
    pub fn advance(&mut self, timestamp: Timestamp) -> ClockResult<()> {
        if let Some(previous) = self.current {
            if timestamp < previous {
                return Err(ClockError::Backwards {
                    previous,
                    current: timestamp,
                });
            }
        }
        if self.start.is_none() {
            self.start = Some(timestamp);
        }
        self.current = Some(timestamp);
        self.advances += 1;
        Ok(())
    }

    /// Timestamp of the last processed tick
    pub fn current(&self) -> Option<Timestamp> {
        self.current
    }

    /// Timestamp of the first processed tick
    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    /// Simulated time covered so far
    pub fn elapsed(&self) -> chrono::Duration {
        match (self.start, self.current) {
            (Some(start), Some(current)) => current - start,
            _ => chrono::Duration::zero(),
        }
    }

    /// Number of accepted advances
    pub fn ticks(&self) -> u64 {
        self.advances
    }
}

impl Clock for SimulationClock {
    fn now(&self) -> Timestamp {
        self.current.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn name(&self) -> &str {
        "SimulationClock"
    }
}
