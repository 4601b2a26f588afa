//! Athan Library
//!
//! This library provides the prayer schedule and trigger engine behind the
//! athan CLI. It includes:
//! - Time parsing, schedule construction and upcoming-prayer resolution
//! - Once-per-day trigger detection and the tick-driven engine
//! - Cached, retryable athan playback per sound class
//! - Prayer timings and Hijri date fetching from the Aladhan API
//! - CLI command parsing and display utilities

pub mod cli;
pub mod daemon;
pub mod schedule;
pub mod sound;
pub mod source;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    AthanConfig, HijriDate, Location, PrayerKey, PrayerRow, Snapshot, SoundClass, UpcomingView,
};

// Re-export schedule types
pub use schedule::{
    build, format_12_hour, format_clock, parse, resolve, resolve_at, to_seconds_of_day,
    Countdown, DailySchedule, RawTimings, ScheduleError, ScheduleSlot, TimeOfDay,
    UpcomingPrayer,
};

// Re-export engine types
pub use daemon::{
    build_snapshot, spawn_wall_clock, AthanEngine, EngineCommand, EngineEvent, FiredSet,
    PrayerState, TriggerDetector, TriggerEvent, TriggerReason,
};

// Re-export sound types
pub use sound::{
    AudioBackend, MockAudioBackend, PlaybackController, PlaybackHandle, PlaybackOutcome,
    RodioBackend, SilentBackend, SoundAssets, SoundError,
};

// Re-export data source types
pub use source::{fetch_day, AladhanClient, DayData, MockTimingsSource, SourceError, TimingsSource};
