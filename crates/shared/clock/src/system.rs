use chrono::Utc;
use holodeck_core::Timestamp;
use holodeck_ports::Clock;

/// Real system clock
///
/// Returns the current wall-clock time. Used to measure session
/// duration; simulated time comes from `SimulationClock`.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}
