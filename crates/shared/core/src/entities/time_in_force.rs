use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// Lifetime policy of a limit order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good Till Canceled: order remains active until explicitly canceled
    #[default]
    GTC,

    /// Day order: canceled at the close of the instrument's session
    DAY,
}

impl TimeInForce {
    /// Check if the order has expired based on current time
    pub fn is_expired(&self, current_time: Timestamp, day_end: Option<Timestamp>) -> bool {
        match self {
            TimeInForce::GTC => false,
            TimeInForce::DAY => day_end.is_some_and(|end| current_time >= end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_gtc_never_expires() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        assert!(!TimeInForce::GTC.is_expired(now, Some(now - Duration::hours(1))));
    }

    #[test]
    fn test_day_expires_at_session_end() {
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        assert!(!TimeInForce::DAY.is_expired(end - Duration::seconds(1), Some(end)));
        assert!(TimeInForce::DAY.is_expired(end, Some(end)));
        assert!(!TimeInForce::DAY.is_expired(end, None));
    }
}
