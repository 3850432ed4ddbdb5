//! Tunable redemption rules.

use chrono::TimeDelta;
use thiserror::Error;

/// Default minimum gap between two regular redemptions on the same day.
pub const DEFAULT_MIN_INTERVAL_MINUTES: u32 = 60;
/// Longest accepted minimum interval (a full day).
pub const MAX_MIN_INTERVAL_MINUTES: u32 = 24 * 60;

/// Errors raised when building a [`RedemptionPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedemptionPolicyError {
    #[error("minimum interval must be between 1 and {MAX_MIN_INTERVAL_MINUTES} minutes, got {minutes}")]
    IntervalOutOfRange { minutes: u32 },
}

/// Rules applied to regular vouchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionPolicy {
    min_interval: TimeDelta,
}

impl RedemptionPolicy {
    /// Build a policy with a minimum interval in minutes.
    pub fn with_min_interval_minutes(minutes: u32) -> Result<Self, RedemptionPolicyError> {
        if minutes == 0 || minutes > MAX_MIN_INTERVAL_MINUTES {
            return Err(RedemptionPolicyError::IntervalOutOfRange { minutes });
        }
        Ok(Self {
            min_interval: TimeDelta::minutes(i64::from(minutes)),
        })
    }

    /// Minimum gap between a user's redemptions on the same local day.
    pub const fn min_interval(&self) -> TimeDelta {
        self.min_interval
    }
}

impl Default for RedemptionPolicy {
    fn default() -> Self {
        Self {
            min_interval: TimeDelta::minutes(i64::from(DEFAULT_MIN_INTERVAL_MINUTES)),
        }
    }
}
