//! Core data types for the athan clock.
//!
//! This module defines the data structures used for:
//! - The closed set of prayers and the two sound classes
//! - Engine configuration with validation
//! - The snapshot handed to presentation layers on every tick

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schedule::Countdown;

/// Placeholder for a prayer time that is not known yet.
pub const FALLBACK_TIME: &str = "--:--";

/// Placeholder for a countdown that cannot be computed yet.
pub const FALLBACK_COUNTDOWN: &str = "--:--:--";

// ============================================================================
// PrayerKey
// ============================================================================

/// One of the five daily prayers.
///
/// Declaration order is the chronological order through the day, and the
/// derived `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerKey {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerKey {
    /// All prayers in fixed order.
    pub const ALL: [PrayerKey; 5] = [
        PrayerKey::Fajr,
        PrayerKey::Dhuhr,
        PrayerKey::Asr,
        PrayerKey::Maghrib,
        PrayerKey::Isha,
    ];

    /// Returns the lowercase key.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerKey::Fajr => "fajr",
            PrayerKey::Dhuhr => "dhuhr",
            PrayerKey::Asr => "asr",
            PrayerKey::Maghrib => "maghrib",
            PrayerKey::Isha => "isha",
        }
    }

    /// Returns the display label, which is also the API field name.
    pub fn label(&self) -> &'static str {
        match self {
            PrayerKey::Fajr => "Fajr",
            PrayerKey::Dhuhr => "Dhuhr",
            PrayerKey::Asr => "Asr",
            PrayerKey::Maghrib => "Maghrib",
            PrayerKey::Isha => "Isha",
        }
    }

    /// Position in the fixed order (0 for Fajr).
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PrayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrayerKey {
    type Err = String;

    /// Accepts the lowercase key or the capitalized label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrayerKey::ALL
            .into_iter()
            .find(|key| s == key.as_str() || s == key.label())
            .ok_or_else(|| format!("unknown prayer: {s}"))
    }
}

// ============================================================================
// SoundClass
// ============================================================================

/// The two athan recordings. Fajr has its own; every other prayer shares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundClass {
    Regular,
    Fajr,
}

impl SoundClass {
    /// Both classes, in slot order.
    pub const ALL: [SoundClass; 2] = [SoundClass::Regular, SoundClass::Fajr];

    /// Returns the sound class used for the given prayer.
    pub fn for_prayer(key: PrayerKey) -> Self {
        if key == PrayerKey::Fajr {
            SoundClass::Fajr
        } else {
            SoundClass::Regular
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundClass::Regular => "regular",
            SoundClass::Fajr => "fajr",
        }
    }

    /// File name of the class's asset inside the sounds directory.
    pub fn asset_file_name(&self) -> &'static str {
        match self {
            SoundClass::Regular => "athan.mp3",
            SoundClass::Fajr => "athanFajr.mp3",
        }
    }

    pub(crate) fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SoundClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// HijriDate
// ============================================================================

/// Hijri calendar date supplied by the data collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HijriDate {
    pub day: u32,
    /// Month name in Arabic
    pub month: String,
    pub year: i32,
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month, self.year)
    }
}

// ============================================================================
// AthanConfig
// ============================================================================

fn default_city() -> String {
    "BayShore".to_string()
}

fn default_country() -> String {
    "USA".to_string()
}

fn default_method() -> u8 {
    2
}

fn default_window_seconds() -> u32 {
    45
}

fn default_refresh_interval_secs() -> u64 {
    60 * 60
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_sounds_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("athan")
        .join("sounds")
}

/// The fixed location prayer times are requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    /// Calculation method id understood by the prayer-time API
    #[serde(default = "default_method")]
    pub method: u8,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: default_city(),
            country: default_country(),
            method: default_method(),
        }
    }
}

/// Configuration for the athan engine.
///
/// Every constant the engine depends on lives here so tests can shrink or
/// stretch them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthanConfig {
    /// Width of the trigger window in seconds (1-3599)
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u32,
    /// Seconds between schedule refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Upper bound on a single data fetch, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub location: Location,
    /// Directory holding `athan.mp3` and `athanFajr.mp3`
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: PathBuf,
}

impl Default for AthanConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            location: Location::default(),
            sounds_dir: default_sounds_dir(),
        }
    }
}

impl AthanConfig {
    pub fn with_window_seconds(mut self, seconds: u32) -> Self {
        self.window_seconds = seconds;
        self
    }

    pub fn with_refresh_interval_secs(mut self, seconds: u64) -> Self {
        self.refresh_interval_secs = seconds;
        self
    }

    pub fn with_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    pub fn with_sounds_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sounds_dir = dir.into();
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.window_seconds < 1 || self.window_seconds >= 3600 {
            return Err("trigger window must be between 1 and 3599 seconds".to_string());
        }
        if self.refresh_interval_secs < 1 {
            return Err("refresh interval must be at least 1 second".to_string());
        }
        if self.request_timeout_secs < 1 {
            return Err("request timeout must be at least 1 second".to_string());
        }
        if self.location.city.trim().is_empty() || self.location.country.trim().is_empty() {
            return Err("city and country must not be empty".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// The upcoming prayer as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingView {
    pub key: PrayerKey,
    pub label: String,
    /// 12-hour time without seconds, e.g. "8:30 PM"
    pub time: String,
}

/// One row of today's formatted schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerRow {
    pub key: PrayerKey,
    pub label: String,
    pub time: String,
    pub is_upcoming: bool,
}

/// Everything a presentation layer needs, as of the latest tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 12-hour wall clock with seconds, e.g. "7:05:10 PM"
    pub formatted_clock: String,
    /// e.g. "Sunday October 18 2026"
    pub gregorian_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hijri_date: Option<HijriDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming: Option<UpcomingView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<Countdown>,
    pub schedule: Vec<PrayerRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_playback_error: Option<String>,
}

impl Snapshot {
    /// Countdown as "HH:MM:SS", or the placeholder when unknown.
    pub fn countdown_display(&self) -> String {
        self.countdown
            .map(|c| c.to_string())
            .unwrap_or_else(|| FALLBACK_COUNTDOWN.to_string())
    }

    pub fn hijri_display(&self) -> String {
        self.hijri_date
            .as_ref()
            .map(|h| h.to_string())
            .unwrap_or_else(|| "Loading Hijri date...".to_string())
    }

    pub fn upcoming_label(&self) -> &str {
        self.upcoming.as_ref().map_or("--", |u| u.label.as_str())
    }

    pub fn upcoming_time(&self) -> &str {
        self.upcoming.as_ref().map_or(FALLBACK_TIME, |u| u.time.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
