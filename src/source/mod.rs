//! Prayer-time data sources.
//!
//! The engine only sees the `TimingsSource` trait; `AladhanClient` is the
//! production implementation and `MockTimingsSource` backs the tests.

mod aladhan;
mod error;

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, warn};

pub use aladhan::{date_param, parse_hijri, parse_timings, AladhanClient, DEFAULT_BASE_URL};
pub use error::{SourceError, BODY_EXCERPT_CHARS};

use crate::schedule::RawTimings;
use crate::types::{HijriDate, PrayerKey};

/// Supplies the day's raw prayer timings and its Hijri date.
pub trait TimingsSource: Send + Sync {
    /// Fetches the raw `"HH:MM"` timings for `date`.
    fn fetch_timings(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<RawTimings, SourceError>> + Send;

    /// Fetches the Hijri calendar date corresponding to `date`.
    fn fetch_hijri(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<HijriDate, SourceError>> + Send;
}

/// Results of one refresh. The two halves fail independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayData {
    pub date: NaiveDate,
    pub timings: Result<RawTimings, SourceError>,
    pub hijri: Result<HijriDate, SourceError>,
}

/// Fetches timings and the Hijri date concurrently, each bounded by `timeout`.
pub async fn fetch_day<S: TimingsSource>(
    source: &S,
    date: NaiveDate,
    timeout: Duration,
) -> DayData {
    let timeout_error = || SourceError::Timeout(timeout.as_secs());

    let (timings, hijri) = tokio::join!(
        tokio::time::timeout(timeout, source.fetch_timings(date)),
        tokio::time::timeout(timeout, source.fetch_hijri(date)),
    );
    let timings = timings.unwrap_or_else(|_| Err(timeout_error()));
    let hijri = hijri.unwrap_or_else(|_| Err(timeout_error()));

    if let Err(e) = &timings {
        warn!("Fetching timings for {} failed: {}", date, e);
    }
    if let Err(e) = &hijri {
        warn!("Fetching Hijri date for {} failed: {}", date, e);
    }
    debug!("Refresh for {} complete", date);

    DayData {
        date,
        timings,
        hijri,
    }
}

// ============================================================================
// MockTimingsSource
// ============================================================================

/// Mock data source for testing.
#[derive(Debug)]
pub struct MockTimingsSource {
    timings: Mutex<Result<RawTimings, SourceError>>,
    hijri: Mutex<Result<HijriDate, SourceError>>,
    timings_calls: Mutex<Vec<NaiveDate>>,
    hijri_calls: AtomicUsize,
    delay_ms: AtomicU64,
}

impl Default for MockTimingsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTimingsSource {
    /// Creates a source serving a plausible autumn schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timings(&[
            (PrayerKey::Fajr, "05:12"),
            (PrayerKey::Dhuhr, "12:45"),
            (PrayerKey::Asr, "16:20"),
            (PrayerKey::Maghrib, "19:05"),
            (PrayerKey::Isha, "20:30"),
        ])
    }

    #[must_use]
    pub fn with_timings(entries: &[(PrayerKey, &str)]) -> Self {
        Self {
            timings: Mutex::new(Ok(raw_timings(entries))),
            hijri: Mutex::new(Ok(HijriDate {
                day: 14,
                month: "رَبيع الثاني".to_string(),
                year: 1448,
            })),
            timings_calls: Mutex::new(Vec::new()),
            hijri_calls: AtomicUsize::new(0),
            delay_ms: AtomicU64::new(0),
        }
    }

    pub fn set_timings(&self, entries: &[(PrayerKey, &str)]) {
        *self.timings.lock().unwrap() = Ok(raw_timings(entries));
    }

    pub fn set_timings_error(&self, error: SourceError) {
        *self.timings.lock().unwrap() = Err(error);
    }

    pub fn set_hijri(&self, hijri: HijriDate) {
        *self.hijri.lock().unwrap() = Ok(hijri);
    }

    pub fn set_hijri_error(&self, error: SourceError) {
        *self.hijri.lock().unwrap() = Err(error);
    }

    /// Makes every fetch wait before answering.
    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    #[must_use]
    pub fn timings_calls(&self) -> Vec<NaiveDate> {
        self.timings_calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn hijri_call_count(&self) -> usize {
        self.hijri_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

fn raw_timings(entries: &[(PrayerKey, &str)]) -> RawTimings {
    entries
        .iter()
        .map(|(key, value)| (*key, (*value).to_string()))
        .collect()
}

impl TimingsSource for MockTimingsSource {
    fn fetch_timings(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<RawTimings, SourceError>> + Send {
        async move {
            self.timings_calls.lock().unwrap().push(date);
            self.wait().await;
            self.timings.lock().unwrap().clone()
        }
    }

    fn fetch_hijri(
        &self,
        _date: NaiveDate,
    ) -> impl Future<Output = Result<HijriDate, SourceError>> + Send {
        async move {
            self.hijri_calls.fetch_add(1, Ordering::SeqCst);
            self.wait().await;
            self.hijri.lock().unwrap().clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    mod fetch_day_tests {
        use super::*;

        #[tokio::test]
        async fn test_fetches_both_halves() {
            let source = MockTimingsSource::new();

            let day = fetch_day(&source, date(), Duration::from_secs(1)).await;

            assert_eq!(day.date, date());
            assert_eq!(day.timings.unwrap().len(), 5);
            assert_eq!(day.hijri.unwrap().year, 1448);
            assert_eq!(source.timings_calls(), vec![date()]);
            assert_eq!(source.hijri_call_count(), 1);
        }

        #[tokio::test]
        async fn test_hijri_failure_keeps_timings() {
            let source = MockTimingsSource::new();
            source.set_hijri_error(SourceError::status(500, "oops"));

            let day = fetch_day(&source, date(), Duration::from_secs(1)).await;

            assert!(day.timings.is_ok());
            assert_eq!(day.hijri, Err(SourceError::status(500, "oops")));
        }

        #[tokio::test]
        async fn test_timings_failure_keeps_hijri() {
            let source = MockTimingsSource::new();
            source.set_timings_error(SourceError::Network("refused".into()));

            let day = fetch_day(&source, date(), Duration::from_secs(1)).await;

            assert!(day.timings.is_err());
            assert!(day.hijri.is_ok());
        }

        #[tokio::test]
        async fn test_slow_source_times_out() {
            let source = MockTimingsSource::new();
            source.set_delay_ms(500);

            let day = fetch_day(&source, date(), Duration::from_millis(20)).await;

            assert!(day.timings.unwrap_err().is_timeout());
            assert!(day.hijri.unwrap_err().is_timeout());
        }
    }

    #[test]
    fn test_mock_set_timings_replaces_payload() {
        let source = MockTimingsSource::new();
        source.set_timings(&[(PrayerKey::Fajr, "04:00")]);
        let timings = source.timings.lock().unwrap().clone().unwrap();
        assert_eq!(timings.len(), 1);
    }
}
