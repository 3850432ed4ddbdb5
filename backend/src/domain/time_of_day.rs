//! Minute-resolution wall-clock time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: u16 = 60;
const MINUTES_PER_DAY: u16 = 24 * MINUTES_PER_HOUR;

/// Validation errors raised when building a [`TimeOfDay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeOfDayError {
    HourOutOfRange { hour: u32 },
    MinuteOutOfRange { minute: u32 },
    Malformed { value: String },
}

impl fmt::Display for TimeOfDayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HourOutOfRange { hour } => write!(f, "hour {hour} is outside 0..=23"),
            Self::MinuteOutOfRange { minute } => {
                write!(f, "minute {minute} is outside 0..=59")
            }
            Self::Malformed { value } => {
                write!(f, "time of day must be formatted as HH:MM, got {value:?}")
            }
        }
    }
}

impl std::error::Error for TimeOfDayError {}

/// A time of day truncated to the minute.
///
/// Stored as minutes since midnight, so ordering and window arithmetic are
/// plain integer comparisons. Serialises as `HH:MM`; parsing also accepts
/// `HH:MM:SS` and discards the seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight, the first minute of the day.
    pub const MIDNIGHT: Self = Self(0);
    /// 23:59, the last minute of the day.
    pub const LAST_MINUTE: Self = Self(MINUTES_PER_DAY - 1);

    /// Build a time of day from an hour and minute.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeOfDayError> {
        let hour_value = u16::try_from(hour)
            .ok()
            .filter(|value| *value < 24)
            .ok_or(TimeOfDayError::HourOutOfRange { hour })?;
        let minute_value = u16::try_from(minute)
            .ok()
            .filter(|value| *value < MINUTES_PER_HOUR)
            .ok_or(TimeOfDayError::MinuteOutOfRange { minute })?;
        Ok(Self(hour_value * MINUTES_PER_HOUR + minute_value))
    }

    /// Wall-clock minute of the given instant in its own time zone.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from(instant.time())
    }

    /// Minutes elapsed since midnight.
    pub const fn minute_of_day(self) -> u16 {
        self.0
    }

    /// Hour component (0-23).
    pub const fn hour(self) -> u16 {
        self.0 / MINUTES_PER_HOUR
    }

    /// Minute component (0-59).
    pub const fn minute(self) -> u16 {
        self.0 % MINUTES_PER_HOUR
    }

    /// Add minutes, stopping at 23:59 rather than wrapping into the next day.
    pub fn saturating_add_minutes(self, minutes: u16) -> Self {
        Self(self.0.saturating_add(minutes).min(Self::LAST_MINUTE.0))
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        // chrono guarantees hour < 24 and minute < 60.
        let minutes = time.hour() * u32::from(MINUTES_PER_HOUR) + time.minute();
        Self(u16::try_from(minutes).unwrap_or(Self::LAST_MINUTE.0))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeOfDayError::Malformed {
            value: value.to_owned(),
        };
        let mut parts = value.trim().split(':');
        let (Some(hour), Some(minute)) = (parts.next(), parts.next()) else {
            return Err(malformed());
        };
        if let Some(second) = parts.next() {
            let in_range = second.len() == 2 && second.parse::<u8>().is_ok_and(|s| s < 60);
            if !in_range || parts.next().is_some() {
                return Err(malformed());
            }
        }
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(malformed());
        }
        let hour_value = hour.parse::<u32>().map_err(|_| malformed())?;
        let minute_value = minute.parse::<u32>().map_err(|_| malformed())?;
        Self::new(hour_value, minute_value)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeOfDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}
