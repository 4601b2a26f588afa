//! Display utilities for the athan CLI.
//!
//! This module provides formatted output for:
//! - The live status line
//! - Today's schedule table
//! - Engine events (triggers, playback failures, refresh failures)
//! - JSON snapshots

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::daemon::EngineEvent;
use crate::sound::PlaybackOutcome;
use crate::types::Snapshot;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// One-line summary of a snapshot, e.g.
    /// `7:05:10 PM  Next: Isha 8:30 PM in 01:24:50`.
    pub fn status_line(snapshot: &Snapshot) -> String {
        let mut line = format!(
            "{}  Next: {} {} in {}",
            snapshot.formatted_clock,
            snapshot.upcoming_label(),
            snapshot.upcoming_time(),
            snapshot.countdown_display()
        );
        if let Some(error) = &snapshot.last_playback_error {
            line.push_str(&format!("  [athan failed: {}]", error));
        }
        line
    }

    /// Multi-line rendering of the dates and the five prayer rows.
    pub fn schedule_table(snapshot: &Snapshot) -> String {
        let mut out = String::new();
        out.push_str(&snapshot.gregorian_date);
        out.push('\n');
        out.push_str(&snapshot.hijri_display());
        out.push('\n');
        out.push_str("─────────────────────────────\n");
        for row in &snapshot.schedule {
            let marker = if row.is_upcoming { ">" } else { " " };
            out.push_str(&format!("{} {:<8} {:>8}\n", marker, row.label, row.time));
        }
        out.push_str("─────────────────────────────\n");
        out.push_str(&format!(
            "Next: {} in {}",
            snapshot.upcoming_label(),
            snapshot.countdown_display()
        ));
        out
    }

    /// Overwrites the current terminal line with the status line.
    pub fn show_status_line(snapshot: &Snapshot) {
        print!("\r\x1b[2K{}", Self::status_line(snapshot));
        let _ = io::stdout().flush();
    }

    /// Prints the full schedule table.
    pub fn show_schedule(snapshot: &Snapshot) {
        println!("{}", Self::schedule_table(snapshot));
    }

    /// Prints a snapshot as one JSON line.
    pub fn show_json(snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        println!("{}", json);
        Ok(())
    }

    /// Describes an engine event for the terminal. `Tick` has no message.
    pub fn event_message(event: &EngineEvent) -> Option<String> {
        match event {
            EngineEvent::Tick(_) => None,
            EngineEvent::Triggered(trigger) => {
                Some(format!("* Athan for {}", trigger.key.label()))
            }
            EngineEvent::PlaybackFinished {
                class,
                reason,
                outcome: PlaybackOutcome::Failed(error),
            } => Some(format!(
                "! Could not play the {} athan ({}): {}",
                class, reason, error
            )),
            EngineEvent::PlaybackFinished { .. } => None,
            EngineEvent::ScheduleUpdated { date } => Some(format!("* Prayer times loaded for {}", date)),
            EngineEvent::RefreshFailed(error) => Some(format!("! Refresh failed: {}", error)),
        }
    }

    /// Prints an event message on its own line, if the event has one.
    pub fn show_event(event: &EngineEvent) {
        if let Some(message) = Self::event_message(event) {
            println!("\r\x1b[2K{}", message);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================
