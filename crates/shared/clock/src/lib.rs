//! Holodeck Clock Infrastructure
//!
//! Provides time abstractions for replay:
//!
//! ## Clock Roles
//!
//! ```text
//! SimulationClock (tick-driven simulated time, monotonic)
//!     │
//!     └── SpeedThrottle (paces simulated time against the wall clock)
//!             │
//!             └── SystemClock (wall time, session duration)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use holodeck_clock::{SimulationClock, SpeedThrottle, TimeScale};
//!
//! let mut clock = SimulationClock::new();
//! let mut throttle = SpeedThrottle::new(TimeScale::from_multiplier(100.0));
//!
//! for tick in ticks {
//!     clock.advance(tick.timestamp)?;   // fails if time would go backwards
//!     throttle.pace(tick.timestamp);    // sleeps so replay runs at 100x
//! }
//! ```

mod simulation;
mod system;
mod throttle;

pub use simulation::SimulationClock;
pub use system::SystemClock;
pub use throttle::{SpeedThrottle, TimeScale, UNTHROTTLED_THRESHOLD, required_sleep};

// Re-export the Clock trait for convenience
pub use holodeck_ports::Clock;
