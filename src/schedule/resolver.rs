//! Upcoming prayer and countdown.
//!
//! Both values are recomputed from `(schedule, now)` on every call; nothing
//! is carried between ticks.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::builder::DailySchedule;
use super::time::SECONDS_PER_DAY;
use crate::types::PrayerKey;

/// Time left until the upcoming prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    pub fn from_seconds(total: u32) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// The next prayer to begin after `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingPrayer {
    pub key: PrayerKey,
    pub seconds_until: u32,
    /// True when every prayer today has begun and this is tomorrow's Fajr
    pub wraps_to_tomorrow: bool,
}

/// Resolves the upcoming prayer at wall-clock time `now`.
pub fn resolve(schedule: &DailySchedule, now: NaiveTime) -> (UpcomingPrayer, Countdown) {
    resolve_at(schedule, now.num_seconds_from_midnight())
}

/// Resolves the upcoming prayer at `second_of_day`.
///
/// Picks the earliest time strictly after `second_of_day`, so a prayer
/// stops being "upcoming" at the very second it begins. Equal times resolve
/// to the earlier key. With nothing left today, wraps to tomorrow's Fajr.
///
/// `second_of_day` is taken modulo one day. The delta is always in
/// `[0, 86400)`: a wrap onto Fajr at the same second gives zero.
pub fn resolve_at(schedule: &DailySchedule, second_of_day: u32) -> (UpcomingPrayer, Countdown) {
    let second_of_day = second_of_day % SECONDS_PER_DAY;
    let mut candidate: Option<(PrayerKey, u32)> = None;
    for (key, _) in schedule.iter() {
        let at = schedule.seconds(key);
        if at <= second_of_day {
            continue;
        }
        match candidate {
            Some((_, best)) if best <= at => {}
            _ => candidate = Some((key, at)),
        }
    }

    let upcoming = match candidate {
        Some((key, at)) => UpcomingPrayer {
            key,
            seconds_until: at - second_of_day,
            wraps_to_tomorrow: false,
        },
        None => UpcomingPrayer {
            key: PrayerKey::Fajr,
            seconds_until: (SECONDS_PER_DAY - second_of_day + schedule.seconds(PrayerKey::Fajr))
                % SECONDS_PER_DAY,
            wraps_to_tomorrow: true,
        },
    };

    (upcoming, Countdown::from_seconds(upcoming.seconds_until))
}
