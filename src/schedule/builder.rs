//! Schedule construction.
//!
//! A `DailySchedule` is built wholesale from raw strings or not at all.
//! Replacing the active schedule goes through `ScheduleSlot`, which swaps a
//! whole `Arc<DailySchedule>` so readers see either the old schedule or the
//! new one, never a mixture.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::error::ScheduleError;
use super::time::{parse, to_seconds_of_day, TimeOfDay};
use crate::types::PrayerKey;

/// Raw `"HH:MM"` strings keyed by prayer, as delivered by the data source.
pub type RawTimings = BTreeMap<PrayerKey, String>;

// ============================================================================
// DailySchedule
// ============================================================================

/// All five prayer times for one day, indexed by `PrayerKey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySchedule {
    times: [TimeOfDay; 5],
}

impl DailySchedule {
    /// Creates a schedule from times given in `PrayerKey::ALL` order.
    pub fn from_times(times: [TimeOfDay; 5]) -> Self {
        Self { times }
    }

    pub fn time(&self, key: PrayerKey) -> TimeOfDay {
        self.times[key.index()]
    }

    /// Seconds since midnight at which `key` begins.
    pub fn seconds(&self, key: PrayerKey) -> u32 {
        to_seconds_of_day(self.time(key))
    }

    /// Iterates entries in fixed prayer order.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerKey, TimeOfDay)> + '_ {
        PrayerKey::ALL.into_iter().map(move |key| (key, self.time(key)))
    }

    /// Returns true if times never decrease through the fixed order.
    pub fn is_chronological(&self) -> bool {
        self.times.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// Builds a schedule from raw timings.
///
/// Every prayer must be present and parse; the first failure rejects the
/// whole payload as `IncompleteSchedule`.
pub fn build(raw: &RawTimings) -> Result<DailySchedule, ScheduleError> {
    let mut times = [TimeOfDay::default(); 5];

    for key in PrayerKey::ALL {
        let value = raw.get(&key).ok_or_else(|| ScheduleError::IncompleteSchedule {
            key,
            reason: "is missing".to_string(),
        })?;
        times[key.index()] = parse(value).map_err(|err| ScheduleError::IncompleteSchedule {
            key,
            reason: err.to_string(),
        })?;
    }

    let schedule = DailySchedule::from_times(times);
    if !schedule.is_chronological() {
        // Tie-breaking in the resolver still makes this usable.
        warn!("Prayer times are not in chronological order: {:?}", schedule);
    }
    Ok(schedule)
}

// ============================================================================
// ScheduleSlot
// ============================================================================

/// Holder of the schedule currently in effect.
#[derive(Debug, Default)]
pub struct ScheduleSlot {
    current: Option<Arc<DailySchedule>>,
}

impl ScheduleSlot {
    /// Creates an empty slot; nothing is resolvable until the first build.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared handle to the active schedule.
    pub fn current(&self) -> Option<Arc<DailySchedule>> {
        self.current.clone()
    }

    pub fn get(&self) -> Option<&DailySchedule> {
        self.current.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Supersedes the active schedule, returning the previous one.
    pub fn replace(&mut self, schedule: DailySchedule) -> Option<Arc<DailySchedule>> {
        self.current.replace(Arc::new(schedule))
    }

    /// Builds from raw timings and swaps on success.
    ///
    /// On failure the active schedule is left untouched.
    pub fn apply(&mut self, raw: &RawTimings) -> Result<(), ScheduleError> {
        let schedule = build(raw)?;
        debug!("Schedule superseded: {:?}", schedule);
        self.replace(schedule);
        Ok(())
    }
}
