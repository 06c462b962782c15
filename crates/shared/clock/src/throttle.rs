use holodeck_core::Timestamp;
use log::debug;
use std::thread;
use std::time::{Duration, Instant};

/// Multipliers above this replay as fast as ticks can be supplied
pub const UNTHROTTLED_THRESHOLD: f64 = 10_000.0;

/// Replay speed relative to the wall clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeScale {
    /// Simulated seconds per wall second (1.0 = real time)
    Multiplier(f64),
    /// No sleeping at all
    Unbounded,
}

impl TimeScale {
    /// Scale for a speed multiplier; infinite or very large values are unbounded
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier.is_infinite() || multiplier > UNTHROTTLED_THRESHOLD {
            TimeScale::Unbounded
        } else {
            TimeScale::Multiplier(multiplier)
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            TimeScale::Multiplier(m) => *m,
            TimeScale::Unbounded => f64::INFINITY,
        }
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        TimeScale::Multiplier(1.0)
    }
}

/// Paces replay so wall time keeps up with scaled simulated time
///
/// Anchored on the first paced tick: every later tick waits until
/// `wall_elapsed >= sim_elapsed / multiplier`. Sleeps are whole
/// milliseconds, so sub-millisecond gaps coalesce to no sleep.
#[derive(Debug, Clone)]
pub struct SpeedThrottle {
    scale: TimeScale,
    anchor: Option<(Instant, Timestamp)>,
    slept: Duration,
}

impl SpeedThrottle {
    pub fn new(scale: TimeScale) -> Self {
        Self {
            scale,
            anchor: None,
            slept: Duration::ZERO,
        }
    }

    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    /// Change speed; the next paced tick re-anchors
    pub fn set_scale(&mut self, scale: TimeScale) {
        self.scale = scale;
        self.anchor = None;
    }

    /// Forget the anchor, e.g. after a pause
    pub fn reset(&mut self) {
        self.anchor = None;
    }

    /// Total time spent sleeping
    pub fn total_sleep(&self) -> Duration {
        self.slept
    }

    /// Block until `tick_time` is due on the wall clock
    pub fn pace(&mut self, tick_time: Timestamp) {
        let TimeScale::Multiplier(multiplier) = self.scale else {
            return;
        };
        let Some((wall_anchor, sim_anchor)) = self.anchor else {
            self.anchor = Some((Instant::now(), tick_time));
            return;
        };

        let sim_elapsed = (tick_time - sim_anchor).to_std().unwrap_or(Duration::ZERO);
        let sleep = required_sleep(sim_elapsed, wall_anchor.elapsed(), multiplier);
        if !sleep.is_zero() {
            debug!("Throttle sleeping {}ms at {}x", sleep.as_millis(), multiplier);
            thread::sleep(sleep);
            self.slept += sleep;
        }
    }
}

/// Wall time still owed before a tick `sim_elapsed` after the anchor is due
///
/// Truncated to whole milliseconds.
pub fn required_sleep(sim_elapsed: Duration, wall_elapsed: Duration, multiplier: f64) -> Duration {
    if multiplier.is_nan()
        || multiplier <= 0.0
        || multiplier.is_infinite()
        || multiplier > UNTHROTTLED_THRESHOLD
    {
        return Duration::ZERO;
    }
    let target = sim_elapsed.as_secs_f64() / multiplier;
    let owed = target - wall_elapsed.as_secs_f64();
    if owed <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((owed * 1000.0).floor() as u64)
}
