//! Athan engine.
//!
//! This module ties the pieces together:
//! - Ticks arrive on an injected channel, one wall-clock timestamp each
//! - Every tick re-derives the snapshot from (schedule, now)
//! - Trigger events are dispatched to the playback controller off the loop
//! - Timings and the Hijri date are refreshed on an interval and on day change

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::trigger::{TriggerDetector, TriggerEvent, TriggerReason};
use crate::schedule::{format_12_hour, format_clock, resolve, DailySchedule, ScheduleSlot};
use crate::sound::{PlaybackController, PlaybackOutcome};
use crate::source::{fetch_day, DayData, TimingsSource};
use crate::types::{
    AthanConfig, HijriDate, PrayerKey, PrayerRow, Snapshot, SoundClass, UpcomingView,
    FALLBACK_TIME,
};

// ============================================================================
// EngineCommand / EngineEvent
// ============================================================================

/// Requests accepted by a running engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Play the athan now
    PlayNow,
    /// Release audio and stop the loop
    Shutdown,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// State as of the latest tick
    Tick(Snapshot),
    /// A prayer's window opened
    Triggered(TriggerEvent),
    /// A playback request completed
    PlaybackFinished {
        class: SoundClass,
        reason: TriggerReason,
        outcome: PlaybackOutcome,
    },
    /// A new schedule is in effect
    ScheduleUpdated {
        /// Day the timings were requested for
        date: NaiveDate,
    },
    /// Part of a refresh failed; the previous data stays in effect
    RefreshFailed(String),
}

#[derive(Debug)]
struct PlaybackReport {
    class: SoundClass,
    reason: TriggerReason,
    outcome: PlaybackOutcome,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Builds the presentation snapshot for `now`.
///
/// Without a schedule every time shows as a placeholder and there is no
/// upcoming prayer.
pub fn build_snapshot(
    schedule: Option<&DailySchedule>,
    now: NaiveDateTime,
    hijri: Option<&HijriDate>,
    last_playback_error: Option<&str>,
) -> Snapshot {
    let resolved = schedule.map(|schedule| resolve(schedule, now.time()));
    let upcoming_key = resolved.map(|(upcoming, _)| upcoming.key);

    let rows = PrayerKey::ALL
        .into_iter()
        .map(|key| PrayerRow {
            key,
            label: key.label().to_string(),
            time: schedule
                .map(|s| format_12_hour(s.time(key), false))
                .unwrap_or_else(|| FALLBACK_TIME.to_string()),
            is_upcoming: upcoming_key == Some(key),
        })
        .collect();

    let upcoming = match (schedule, upcoming_key) {
        (Some(schedule), Some(key)) => Some(UpcomingView {
            key,
            label: key.label().to_string(),
            time: format_12_hour(schedule.time(key), false),
        }),
        _ => None,
    };

    Snapshot {
        formatted_clock: format_clock(now.time()),
        gregorian_date: now.format("%A %B %-d %Y").to_string(),
        hijri_date: hijri.cloned(),
        upcoming,
        countdown: resolved.map(|(_, countdown)| countdown),
        schedule: rows,
        last_playback_error: last_playback_error.map(str::to_string),
    }
}

// ============================================================================
// AthanEngine
// ============================================================================

/// Drives schedule refreshes, trigger detection and playback.
pub struct AthanEngine<S> {
    config: AthanConfig,
    source: Arc<S>,
    playback: Arc<PlaybackController>,
    schedule: ScheduleSlot,
    detector: TriggerDetector,
    hijri: Option<HijriDate>,
    last_playback_error: Option<String>,
    last_now: Option<NaiveDateTime>,
    refresh_in_flight: bool,
    refresh_pending: bool,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    refresh_tx: mpsc::UnboundedSender<DayData>,
    refresh_rx: mpsc::UnboundedReceiver<DayData>,
    outcome_tx: mpsc::UnboundedSender<PlaybackReport>,
    outcome_rx: mpsc::UnboundedReceiver<PlaybackReport>,
}

impl<S: TimingsSource + 'static> AthanEngine<S> {
    /// Creates an engine with no schedule loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        config: AthanConfig,
        source: Arc<S>,
        playback: Arc<PlaybackController>,
        event_tx: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid engine configuration")?;

        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Ok(Self {
            detector: TriggerDetector::new(config.window_seconds),
            config,
            source,
            playback,
            schedule: ScheduleSlot::new(),
            hijri: None,
            last_playback_error: None,
            last_now: None,
            refresh_in_flight: false,
            refresh_pending: false,
            event_tx,
            refresh_tx,
            refresh_rx,
            outcome_tx,
            outcome_rx,
        })
    }

    /// Runs the engine until shutdown.
    ///
    /// The loop ends when `Shutdown` is received, the command channel closes,
    /// or the tick source closes. Both playback handles are released on the
    /// way out, whatever the reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub async fn run(
        &mut self,
        mut ticks: mpsc::Receiver<NaiveDateTime>,
        mut commands: mpsc::Receiver<EngineCommand>,
    ) -> Result<()> {
        let result = self.run_loop(&mut ticks, &mut commands).await;
        self.shutdown().await;
        result
    }

    async fn run_loop(
        &mut self,
        ticks: &mut mpsc::Receiver<NaiveDateTime>,
        commands: &mut mpsc::Receiver<EngineCommand>,
    ) -> Result<()> {
        let mut refresh_timer = interval(self.config.refresh_interval());
        refresh_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = refresh_timer.tick() => self.start_refresh(),
                Some(day) = self.refresh_rx.recv() => self.apply_refresh(day)?,
                Some(report) = self.outcome_rx.recv() => self.record_outcome(report)?,
                tick = ticks.recv() => match tick {
                    Some(now) => self.handle_tick(now)?,
                    None => {
                        info!("Tick source closed, stopping engine");
                        return Ok(());
                    }
                },
                command = commands.recv() => match command {
                    Some(EngineCommand::PlayNow) => {
                        self.play_now();
                    }
                    Some(EngineCommand::Shutdown) | None => {
                        info!("Shutdown requested, stopping engine");
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Processes one tick: detect triggers, dispatch playback, emit the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub fn handle_tick(&mut self, now: NaiveDateTime) -> Result<()> {
        let day_changed = self.last_now.is_some_and(|prev| prev.date() != now.date());

        let (snapshot, triggers) = self.evaluate(now);
        for trigger in triggers {
            info!("{} athan due ({})", trigger.key.label(), trigger.reason);
            self.emit(EngineEvent::Triggered(trigger))?;
            self.dispatch(SoundClass::for_prayer(trigger.key), trigger.reason);
        }
        self.emit(EngineEvent::Tick(snapshot))?;

        if day_changed {
            self.start_refresh();
        }
        Ok(())
    }

    /// Re-derives the snapshot and any newly due triggers for `now`.
    ///
    /// Pure apart from advancing the trigger detector.
    pub fn evaluate(&mut self, now: NaiveDateTime) -> (Snapshot, Vec<TriggerEvent>) {
        self.last_now = Some(now);
        let schedule = self.schedule.current();
        let triggers = self.detector.observe(schedule.as_deref(), now);
        let snapshot = build_snapshot(
            schedule.as_deref(),
            now,
            self.hijri.as_ref(),
            self.last_playback_error.as_deref(),
        );
        (snapshot, triggers)
    }

    /// Plays the athan for the upcoming prayer's sound class.
    ///
    /// Clears the last playback error first. Returns the class requested.
    pub fn play_now(&mut self) -> SoundClass {
        self.last_playback_error = None;
        let class = self.manual_class();
        info!("Manual athan requested, playing {} sound", class);
        self.dispatch(class, TriggerReason::ManualButton);
        class
    }

    /// Fajr sound if the upcoming prayer is Fajr, otherwise the regular one.
    pub fn manual_class(&self) -> SoundClass {
        let now = self.last_now.unwrap_or_else(|| Local::now().naive_local());
        match self.schedule.get() {
            Some(schedule) if resolve(schedule, now.time()).0.key == PrayerKey::Fajr => {
                SoundClass::Fajr
            }
            _ => SoundClass::Regular,
        }
    }

    /// Applies a completed refresh. Failed halves leave their data untouched.
    ///
    /// Starts a follow-up refresh if one was requested while this one was in
    /// flight, or if the data is for a date other than the current tick's.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub fn apply_refresh(&mut self, day: DayData) -> Result<()> {
        self.refresh_in_flight = false;

        match day.timings {
            Ok(raw) => match self.schedule.apply(&raw) {
                Ok(()) => {
                    info!("Schedule updated for {}", day.date);
                    self.emit(EngineEvent::ScheduleUpdated { date: day.date })?;
                }
                Err(e) => {
                    warn!("Rejected timings for {}: {}", day.date, e);
                    self.emit(EngineEvent::RefreshFailed(e.to_string()))?;
                }
            },
            Err(e) => self.emit(EngineEvent::RefreshFailed(e.to_string()))?,
        }

        match day.hijri {
            Ok(hijri) => {
                debug!("Hijri date is {}", hijri);
                self.hijri = Some(hijri);
            }
            Err(e) => self.emit(EngineEvent::RefreshFailed(format!("hijri date: {}", e)))?,
        }

        let stale = self.last_now.is_some_and(|now| now.date() != day.date);
        if std::mem::take(&mut self.refresh_pending) || stale {
            debug!("Timings for {} are out of date, refreshing again", day.date);
            self.start_refresh();
        }
        Ok(())
    }

    fn start_refresh(&mut self) {
        if self.refresh_in_flight {
            debug!("Refresh already in flight, queued behind it");
            self.refresh_pending = true;
            return;
        }
        self.refresh_in_flight = true;

        let date = self
            .last_now
            .map(|now| now.date())
            .unwrap_or_else(|| Local::now().date_naive());
        let source = Arc::clone(&self.source);
        let timeout = self.config.request_timeout();
        let tx = self.refresh_tx.clone();

        debug!("Refreshing timings for {}", date);
        tokio::spawn(async move {
            let day = fetch_day(source.as_ref(), date, timeout).await;
            let _ = tx.send(day);
        });
    }

    fn dispatch(&self, class: SoundClass, reason: TriggerReason) {
        let playback = Arc::clone(&self.playback);
        let tx = self.outcome_tx.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = playback.fire(class, reason);
            let _ = tx.send(PlaybackReport {
                class,
                reason,
                outcome,
            });
        });
    }

    fn record_outcome(&mut self, report: PlaybackReport) -> Result<()> {
        self.last_playback_error = report.outcome.error().map(str::to_string);
        self.emit(EngineEvent::PlaybackFinished {
            class: report.class,
            reason: report.reason,
            outcome: report.outcome,
        })
    }

    async fn shutdown(&self) {
        let playback = Arc::clone(&self.playback);
        if let Err(e) = tokio::task::spawn_blocking(move || playback.release_all()).await {
            warn!("Releasing playback handles failed: {}", e);
        }
        info!("Playback handles released");
    }

    fn emit(&self, event: EngineEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("Failed to send engine event")
    }

    pub fn config(&self) -> &AthanConfig {
        &self.config
    }

    pub fn schedule(&self) -> Option<&DailySchedule> {
        self.schedule.get()
    }

    pub fn hijri(&self) -> Option<&HijriDate> {
        self.hijri.as_ref()
    }

    pub fn last_playback_error(&self) -> Option<&str> {
        self.last_playback_error.as_deref()
    }

    pub fn detector(&self) -> &TriggerDetector {
        &self.detector
    }
}

// ============================================================================
// Tests
// ============================================================================
