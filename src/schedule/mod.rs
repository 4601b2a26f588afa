//! Daily prayer schedule.
//!
//! This module turns raw `"HH:MM"` strings into a canonical schedule and
//! answers "which prayer is next, and how long until it":
//! - `time`: parsing and 12-hour formatting of time-of-day values
//! - `builder`: all-or-nothing construction of a `DailySchedule`
//! - `resolver`: the upcoming prayer and countdown for a given instant
//!
//! Everything here is pure and deterministic; the clock is always passed in.

pub mod builder;
pub mod error;
pub mod resolver;
pub mod time;

pub use builder::{build, DailySchedule, RawTimings, ScheduleSlot};
pub use error::ScheduleError;
pub use resolver::{resolve, resolve_at, Countdown, UpcomingPrayer};
pub use time::{format_12_hour, format_clock, parse, to_seconds_of_day, TimeOfDay, SECONDS_PER_DAY};
