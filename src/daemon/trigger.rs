//! Once-per-day athan trigger detection.
//!
//! Each prayer is `Pending` until the tick that first lands inside its
//! trigger window, then `Fired` for the rest of the calendar day. The fired
//! set is cleared only when the observed date changes.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::schedule::DailySchedule;
use crate::types::PrayerKey;

// ============================================================================
// TriggerReason / TriggerEvent
// ============================================================================

/// Why a playback was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerReason {
    /// A prayer's trigger window opened
    AutoSchedule,
    /// The user asked to hear the athan now
    ManualButton,
}

impl TriggerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerReason::AutoSchedule => "auto-schedule",
            TriggerReason::ManualButton => "manual-button",
        }
    }
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted exactly once per (date, prayer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub key: PrayerKey,
    pub reason: TriggerReason,
    pub date: NaiveDate,
}

/// Per-prayer detector state within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrayerState {
    Pending,
    Fired,
}

// ============================================================================
// FiredSet
// ============================================================================

/// Prayers already triggered on `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiredSet {
    date: Option<NaiveDate>,
    fired: [bool; 5],
}

impl FiredSet {
    /// Moves the set to `date`, clearing it if the date changed.
    ///
    /// Returns true if entries from a previous date were discarded.
    fn roll_to(&mut self, date: NaiveDate) -> bool {
        match self.date {
            Some(current) if current == date => false,
            previous => {
                let had_entries = self.fired.iter().any(|f| *f);
                self.date = Some(date);
                self.fired = [false; 5];
                previous.is_some() && had_entries
            }
        }
    }

    fn insert(&mut self, key: PrayerKey) {
        self.fired[key.index()] = true;
    }

    pub fn contains(&self, key: PrayerKey) -> bool {
        self.fired[key.index()]
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn len(&self) -> usize {
        self.fired.iter().filter(|f| **f).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// TriggerDetector
// ============================================================================

/// Returns true if `now_second` lies in `[prayer_second, prayer_second + window)`.
pub fn is_due(prayer_second: u32, now_second: u32, window_seconds: u32) -> bool {
    now_second >= prayer_second && now_second < prayer_second.saturating_add(window_seconds)
}

/// Detects the opening of each prayer's trigger window, once per day.
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    window_seconds: u32,
    fired: FiredSet,
}

impl TriggerDetector {
    pub fn new(window_seconds: u32) -> Self {
        Self {
            window_seconds,
            fired: FiredSet::default(),
        }
    }

    pub fn window_seconds(&self) -> u32 {
        self.window_seconds
    }

    pub fn fired(&self) -> &FiredSet {
        &self.fired
    }

    pub fn state(&self, key: PrayerKey) -> PrayerState {
        if self.fired.contains(key) {
            PrayerState::Fired
        } else {
            PrayerState::Pending
        }
    }

    /// Evaluates one tick.
    ///
    /// The date rollover is applied before due-ness is checked, so a tick
    /// just after midnight never fires against yesterday's set. Without a
    /// schedule nothing can be due, but the date still advances.
    pub fn observe(
        &mut self,
        schedule: Option<&DailySchedule>,
        now: NaiveDateTime,
    ) -> Vec<TriggerEvent> {
        let date = now.date();
        if self.fired.roll_to(date) {
            info!("Day changed to {}, all prayers pending again", date);
        }

        let Some(schedule) = schedule else {
            return Vec::new();
        };

        let now_second = now.time().num_seconds_from_midnight();
        let mut events = Vec::new();

        for key in PrayerKey::ALL {
            if self.fired.contains(key) {
                continue;
            }
            if !is_due(schedule.seconds(key), now_second, self.window_seconds) {
                continue;
            }

            self.fired.insert(key);
            debug!("{} window open at second {}", key, now_second);
            events.push(TriggerEvent {
                key,
                reason: TriggerReason::AutoSchedule,
                date,
            });
        }

        events
    }
}
