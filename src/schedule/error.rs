//! Schedule error types.

use thiserror::Error;

use crate::types::PrayerKey;

/// Errors raised while turning raw timings into a schedule.
///
/// Neither is fatal: the caller keeps whatever schedule it already had.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A time string was empty, non-numeric, or out of range.
    #[error("malformed time '{0}': expected HH:MM in 24-hour form")]
    MalformedTime(String),

    /// A prayer was missing or its time could not be parsed.
    #[error("incomplete schedule: {key} {reason}")]
    IncompleteSchedule {
        /// First prayer that could not be filled
        key: PrayerKey,
        /// What was wrong with it
        reason: String,
    },
}

impl ScheduleError {
    /// Returns true if this error came from a single malformed string.
    #[must_use]
    pub fn is_malformed_time(&self) -> bool {
        matches!(self, Self::MalformedTime(_))
    }

    /// Returns true if a whole schedule build was rejected.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::IncompleteSchedule { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::MalformedTime(_) => "check the time format returned by the prayer-time service",
            Self::IncompleteSchedule { .. } => {
                "the previous schedule stays in effect until the next refresh"
            }
        }
    }
}
