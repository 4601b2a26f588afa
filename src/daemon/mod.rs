//! Daemon module for the athan engine.
//!
//! This module contains the long-running parts:
//! - `trigger`: once-per-day trigger detection
//! - `engine`: tick loop, refreshes and playback dispatch
//! - `clock`: the wall-clock tick source

pub mod clock;
pub mod engine;
pub mod trigger;

pub use clock::spawn_wall_clock;
pub use engine::{build_snapshot, AthanEngine, EngineCommand, EngineEvent};
pub use trigger::{is_due, FiredSet, PrayerState, TriggerDetector, TriggerEvent, TriggerReason};
