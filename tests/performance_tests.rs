//! Performance tests for the per-tick work.
//!
//! Every second the engine resolves the upcoming prayer, checks the trigger
//! windows and renders a snapshot. These tests keep that work far below one
//! tick, and keep cached replays cheap.
//!
//! Note: targets are generous so the tests hold in debug builds, but they
//! may still be flaky under heavy system load.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveTime};

use athan::daemon::{build_snapshot, TriggerDetector, TriggerReason};
use athan::schedule::{build, resolve_at, DailySchedule, RawTimings, SECONDS_PER_DAY};
use athan::sound::{MockAudioBackend, PlaybackController};
use athan::types::{PrayerKey, SoundClass};

// ============================================================================
// Test Helpers
// ============================================================================

fn sample_schedule() -> DailySchedule {
    let raw: RawTimings = [
        (PrayerKey::Fajr, "05:12"),
        (PrayerKey::Dhuhr, "12:45"),
        (PrayerKey::Asr, "16:20"),
        (PrayerKey::Maghrib, "19:05"),
        (PrayerKey::Isha, "20:30"),
    ]
    .into_iter()
    .map(|(key, value)| (key, value.to_string()))
    .collect();
    build(&raw).unwrap()
}

/// Performance measurement result.
#[derive(Debug)]
struct PerfResult {
    operation: String,
    duration_ms: u128,
    target_ms: u128,
    passed: bool,
}

impl PerfResult {
    fn new(operation: &str, duration: Duration, target_ms: u128) -> Self {
        let duration_ms = duration.as_millis();
        Self {
            operation: operation.to_string(),
            duration_ms,
            target_ms,
            passed: duration_ms <= target_ms,
        }
    }

    fn assert_passed(&self) {
        assert!(
            self.passed,
            "Performance test failed: {} took {}ms (target: {}ms)",
            self.operation, self.duration_ms, self.target_ms
        );
    }
}

// ============================================================================
// Per-Tick Work
// ============================================================================

#[test]
fn test_resolve_every_second_of_a_day() {
    let schedule = sample_schedule();

    let start = Instant::now();
    let mut total = 0u64;
    for second in 0..SECONDS_PER_DAY {
        let (upcoming, _) = resolve_at(&schedule, second);
        total += u64::from(upcoming.seconds_until);
    }
    let result = PerfResult::new("resolve x 86400", start.elapsed(), 1000);

    assert!(total > 0);
    result.assert_passed();
}

#[test]
fn test_detector_over_a_day_of_ticks() {
    let schedule = sample_schedule();
    let mut detector = TriggerDetector::new(45);
    let midnight = NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_time(NaiveTime::MIN);

    let start = Instant::now();
    let mut fired = 0;
    for second in 0..i64::from(SECONDS_PER_DAY) {
        let now = midnight + chrono::Duration::seconds(second);
        fired += detector.observe(Some(&schedule), now).len();
    }
    let result = PerfResult::new("observe x 86400", start.elapsed(), 2000);

    assert_eq!(fired, 5);
    result.assert_passed();
}

#[test]
fn test_snapshot_rendering() {
    let schedule = sample_schedule();
    let now = NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_hms_opt(19, 5, 10)
        .unwrap();

    let start = Instant::now();
    for _ in 0..10_000 {
        let snapshot = build_snapshot(Some(&schedule), now, None, None);
        assert_eq!(snapshot.schedule.len(), 5);
    }
    let result = PerfResult::new("build_snapshot x 10000", start.elapsed(), 2000);

    result.assert_passed();
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn test_cached_replay_latency() {
    let backend = Arc::new(MockAudioBackend::new());
    let playback = PlaybackController::new(backend.clone());
    playback.fire(SoundClass::Regular, TriggerReason::AutoSchedule);

    let start = Instant::now();
    for _ in 0..1000 {
        playback.fire(SoundClass::Regular, TriggerReason::AutoSchedule);
    }
    let result = PerfResult::new("replay x 1000", start.elapsed(), 100);

    assert_eq!(backend.replay_count(), 1000);
    result.assert_passed();
}
