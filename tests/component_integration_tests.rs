//! Component integration tests.
//!
//! These tests wire the building blocks together without the engine loop:
//! - API payload -> schedule -> upcoming prayer and snapshot
//! - TriggerDetector -> PlaybackController over a simulated day
//! - Playback handle caching across days and failures

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use athan::daemon::{build_snapshot, PrayerState, TriggerDetector, TriggerReason};
use athan::schedule::{build, resolve, ScheduleSlot};
use athan::sound::{MockAudioBackend, PlaybackController, PlaybackOutcome};
use athan::source::{parse_hijri, parse_timings, SourceError};
use athan::types::{PrayerKey, SoundClass};

// ============================================================================
// Test Helpers
// ============================================================================

const TIMINGS_BODY: &str = r#"{
    "code": 200,
    "status": "OK",
    "data": {
        "timings": {
            "Fajr": "05:12",
            "Sunrise": "06:34",
            "Dhuhr": "12:45",
            "Asr": "16:20",
            "Sunset": "19:01",
            "Maghrib": "19:05",
            "Isha": "20:30",
            "Imsak": "05:02",
            "Midnight": "00:53"
        }
    }
}"#;

const HIJRI_BODY: &str = r#"{
    "code": 200,
    "status": "OK",
    "data": {
        "hijri": {
            "day": "14",
            "month": { "number": 4, "en": "Rabīʿ al-thānī", "ar": "رَبيع الثاني" },
            "year": "1448"
        }
    }
}"#;

fn at(day: u32, hours: u32, minutes: u32, seconds: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hours, minutes, seconds)
        .unwrap()
}

fn time(hours: u32, minutes: u32, seconds: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hours, minutes, seconds).unwrap()
}

fn create_playback() -> (Arc<MockAudioBackend>, PlaybackController) {
    let backend = Arc::new(MockAudioBackend::new());
    let controller = PlaybackController::new(backend.clone());
    (backend, controller)
}

// ============================================================================
// Payload to Snapshot
// ============================================================================

#[test]
fn test_payload_to_upcoming_prayer() {
    let raw = parse_timings(TIMINGS_BODY).unwrap();
    assert_eq!(raw.len(), 5);
    let schedule = build(&raw).unwrap();

    let (upcoming, countdown) = resolve(&schedule, time(19, 5, 10));
    assert_eq!(upcoming.key, PrayerKey::Isha);
    assert_eq!(countdown.to_string(), "01:24:50");

    let (upcoming, countdown) = resolve(&schedule, time(23, 0, 0));
    assert_eq!(upcoming.key, PrayerKey::Fajr);
    assert!(upcoming.wraps_to_tomorrow);
    assert_eq!(countdown.to_string(), "06:12:00");
}

#[test]
fn test_payload_to_snapshot() {
    let schedule = build(&parse_timings(TIMINGS_BODY).unwrap()).unwrap();
    let hijri = parse_hijri(HIJRI_BODY).unwrap();

    let snapshot = build_snapshot(Some(&schedule), at(18, 12, 0, 0), Some(&hijri), None);

    assert_eq!(snapshot.formatted_clock, "12:00:00 PM");
    assert_eq!(snapshot.gregorian_date, "Sunday October 18 2026");
    assert_eq!(snapshot.hijri_display(), "14 رَبيع الثاني 1448");
    assert_eq!(snapshot.upcoming_label(), "Dhuhr");
    assert_eq!(snapshot.upcoming_time(), "12:45 PM");
    assert_eq!(snapshot.countdown_display(), "00:45:00");

    let times: Vec<&str> = snapshot.schedule.iter().map(|r| r.time.as_str()).collect();
    assert_eq!(times, vec!["5:12 AM", "12:45 PM", "4:20 PM", "7:05 PM", "8:30 PM"]);
    let upcoming: Vec<PrayerKey> = snapshot
        .schedule
        .iter()
        .filter(|r| r.is_upcoming)
        .map(|r| r.key)
        .collect();
    assert_eq!(upcoming, vec![PrayerKey::Dhuhr]);
}

#[test]
fn test_payload_missing_prayer_is_rejected_by_builder() {
    let body = TIMINGS_BODY.replace("\"Asr\": \"16:20\",", "");
    let raw = parse_timings(&body).unwrap();
    assert_eq!(raw.len(), 4);

    let mut slot = ScheduleSlot::new();
    let err = slot.apply(&raw).unwrap_err();
    assert!(err.to_string().contains("asr"));
    assert!(!slot.is_loaded());
}

#[test]
fn test_payload_without_timings_is_a_payload_error() {
    let err = parse_timings(r#"{"code": 400, "data": "Invalid date"}"#).unwrap_err();
    assert!(matches!(err, SourceError::Payload(_)));
}

#[test]
fn test_bad_refresh_keeps_previous_schedule() {
    let mut slot = ScheduleSlot::new();
    slot.apply(&parse_timings(TIMINGS_BODY).unwrap()).unwrap();

    let body = TIMINGS_BODY.replace("\"19:05\"", "\"7pm\"");
    assert!(slot.apply(&parse_timings(&body).unwrap()).is_err());

    let schedule = slot.get().unwrap();
    assert_eq!(schedule.seconds(PrayerKey::Maghrib), 19 * 3600 + 5 * 60);
}

// ============================================================================
// Detector and Playback
// ============================================================================

#[test]
fn test_simulated_day_plays_each_prayer_once() {
    let schedule = build(&parse_timings(TIMINGS_BODY).unwrap()).unwrap();
    let (backend, playback) = create_playback();
    let mut detector = TriggerDetector::new(45);

    let start = at(18, 0, 0, 0);
    for step in 0..(86_400 / 2) {
        let now = start + chrono::Duration::seconds(step * 2);
        for event in detector.observe(Some(&schedule), now) {
            let outcome = playback.fire(SoundClass::for_prayer(event.key), event.reason);
            assert!(outcome.is_success());
        }
    }

    for key in PrayerKey::ALL {
        assert_eq!(detector.state(key), PrayerState::Fired);
    }
    // One load per class, the rest served from the cache.
    assert_eq!(backend.load_calls(), vec![SoundClass::Fajr, SoundClass::Regular]);
    assert_eq!(backend.start_count(), 2);
    assert_eq!(backend.replay_count(), 3);
    assert_eq!(playback.attempts(), 5);
}

#[test]
fn test_next_day_reuses_cached_handles() {
    let schedule = build(&parse_timings(TIMINGS_BODY).unwrap()).unwrap();
    let (backend, playback) = create_playback();
    let mut detector = TriggerDetector::new(45);

    for day in [18, 19] {
        for (hours, minutes) in [(5, 12), (12, 45)] {
            for event in detector.observe(Some(&schedule), at(day, hours, minutes, 10)) {
                playback.fire(SoundClass::for_prayer(event.key), event.reason);
            }
        }
    }

    assert_eq!(backend.load_calls().len(), 2);
    assert_eq!(backend.replay_count(), 2);
    assert_eq!(backend.live_handles(), 2);

    playback.release_all();
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn test_failed_load_retries_on_next_prayer() {
    let schedule = build(&parse_timings(TIMINGS_BODY).unwrap()).unwrap();
    let (backend, playback) = create_playback();
    let mut detector = TriggerDetector::new(45);

    backend.set_fail_load(true);
    let events = detector.observe(Some(&schedule), at(18, 12, 45, 0));
    assert_eq!(events.len(), 1);
    let outcome = playback.fire(SoundClass::Regular, events[0].reason);
    assert!(matches!(outcome, PlaybackOutcome::Failed(_)));
    assert!(!playback.is_loaded(SoundClass::Regular));

    // Still inside the window, but Dhuhr has already been consumed.
    assert!(detector.observe(Some(&schedule), at(18, 12, 45, 20)).is_empty());

    backend.set_fail_load(false);
    let events = detector.observe(Some(&schedule), at(18, 16, 20, 0));
    assert_eq!(events[0].key, PrayerKey::Asr);
    let outcome = playback.fire(SoundClass::Regular, events[0].reason);
    assert_eq!(outcome, PlaybackOutcome::Started);
    assert!(playback.is_loaded(SoundClass::Regular));
}

#[test]
fn test_manual_and_scheduled_playback_share_the_cache() {
    let (backend, playback) = create_playback();

    assert_eq!(
        playback.fire(SoundClass::Regular, TriggerReason::ManualButton),
        PlaybackOutcome::Started
    );
    assert_eq!(
        playback.fire(SoundClass::Regular, TriggerReason::AutoSchedule),
        PlaybackOutcome::Replayed
    );
    assert_eq!(backend.load_calls(), vec![SoundClass::Regular]);
}

#[test]
fn test_broken_replay_reloads_once() {
    let (backend, playback) = create_playback();
    playback.fire(SoundClass::Fajr, TriggerReason::AutoSchedule);

    backend.set_fail_replay(true);
    let outcome = playback.fire(SoundClass::Fajr, TriggerReason::AutoSchedule);

    assert_eq!(outcome, PlaybackOutcome::Started);
    assert_eq!(backend.load_calls(), vec![SoundClass::Fajr, SoundClass::Fajr]);
    assert_eq!(backend.release_count(), 1);
    assert_eq!(backend.live_handles(), 1);
}
