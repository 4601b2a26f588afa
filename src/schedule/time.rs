//! Time-of-day parsing and formatting.
//!
//! Prayer times arrive as 24-hour `"HH:MM"` strings and are displayed on a
//! 12-hour clock with an AM/PM suffix. Nothing here reads the clock.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::error::ScheduleError;

/// Number of seconds in a local day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// A validated wall-clock time with minute precision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeOfDay {
    hours: u8,
    minutes: u8,
}

impl TimeOfDay {
    /// Creates a time of day, rejecting out-of-range fields.
    pub fn new(hours: u8, minutes: u8) -> Result<Self, ScheduleError> {
        if hours > 23 || minutes > 59 {
            return Err(ScheduleError::MalformedTime(format!("{hours}:{minutes}")));
        }
        Ok(Self { hours, minutes })
    }

    /// Rebuilds a time of day from a second offset, dropping the seconds.
    ///
    /// Returns `None` for offsets of a full day or more.
    pub fn from_seconds_of_day(seconds: u32) -> Option<Self> {
        if seconds >= SECONDS_PER_DAY {
            return None;
        }
        Some(Self {
            hours: (seconds / 3600) as u8,
            minutes: ((seconds % 3600) / 60) as u8,
        })
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

/// Parses a 24-hour `"HH:MM"` string.
///
/// Exactly one `:` separator, one or two ASCII digits on each side, and
/// in-range values. Anything else is `MalformedTime`; there is no default.
pub fn parse(raw: &str) -> Result<TimeOfDay, ScheduleError> {
    let malformed = || ScheduleError::MalformedTime(raw.to_string());

    let mut tokens = raw.trim().split(':');
    let (Some(hours), Some(minutes), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed());
    };

    let hours = parse_unit(hours).ok_or_else(malformed)?;
    let minutes = parse_unit(minutes).ok_or_else(malformed)?;

    TimeOfDay::new(hours, minutes).map_err(|_| malformed())
}

fn parse_unit(token: &str) -> Option<u8> {
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Seconds elapsed since local midnight, in `[0, 86400)`.
pub fn to_seconds_of_day(t: TimeOfDay) -> u32 {
    u32::from(t.hours) * 3600 + u32::from(t.minutes) * 60
}

/// Renders a prayer time on the 12-hour clock, e.g. `"5:12 AM"`.
///
/// With `with_seconds` the seconds field is always `00`.
pub fn format_12_hour(t: TimeOfDay, with_seconds: bool) -> String {
    render_12_hour(
        u32::from(t.hours),
        u32::from(t.minutes),
        with_seconds.then_some(0),
    )
}

/// Renders the live wall clock with seconds, e.g. `"7:05:10 PM"`.
pub fn format_clock(now: NaiveTime) -> String {
    render_12_hour(now.hour(), now.minute(), Some(now.second()))
}

fn render_12_hour(hours: u32, minutes: u32, seconds: Option<u32>) -> String {
    let suffix = if hours >= 12 { "PM" } else { "AM" };
    let hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    match seconds {
        Some(seconds) => format!("{hours}:{minutes:02}:{seconds:02} {suffix}"),
        None => format!("{hours}:{minutes:02} {suffix}"),
    }
}
