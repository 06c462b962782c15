use chrono::{Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// Daily trading window in UTC hours
///
/// `open_hour == 0 && close_hour == 24` is a round-the-clock market.
/// A window with `close_hour <= open_hour` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSession {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl TradingSession {
    pub fn new(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open_hour: open_hour.min(24),
            close_hour: close_hour.min(24),
        }
    }

    /// Market that never closes
    pub fn around_the_clock() -> Self {
        Self::new(0, 24)
    }

    pub fn is_around_the_clock(&self) -> bool {
        self.open_hour == 0 && self.close_hour == 24
    }

    /// Whether `ts` falls inside the trading window
    pub fn contains(&self, ts: Timestamp) -> bool {
        if self.is_around_the_clock() {
            return true;
        }
        let hour = ts.hour();
        if self.open_hour < self.close_hour {
            hour >= self.open_hour && hour < self.close_hour
        } else {
            hour >= self.open_hour || hour < self.close_hour
        }
    }

    /// First session close strictly after `ts`
    ///
    /// Used to expire DAY orders: an order submitted at `ts` lives until this instant.
    pub fn close_after(&self, ts: Timestamp) -> Timestamp {
        let midnight = ts
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(ts);
        let close = midnight + Duration::hours(i64::from(self.close_hour));
        if close > ts { close } else { close + Duration::days(1) }
    }
}

impl Default for TradingSession {
    fn default() -> Self {
        Self::around_the_clock()
    }
}
