//! Aladhan prayer-time API client.
//!
//! Timings come from `timingsByCity/{DD-MM-YYYY}` and the Hijri date from
//! `gToH`. Only the five prayers are taken from the timings payload; the
//! other entries (Sunrise, Imsak, Midnight, ...) are ignored.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::error::SourceError;
use super::TimingsSource;
use crate::schedule::RawTimings;
use crate::types::{HijriDate, Location, PrayerKey};

/// Public Aladhan endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com/v1";

const USER_AGENT: &str = concat!("athan/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct HijriData {
    hijri: Option<HijriPayload>,
}

#[derive(Debug, Deserialize)]
struct HijriPayload {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct HijriMonth {
    ar: String,
}

/// Formats a date the way the API expects it in paths and queries.
pub fn date_param(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Extracts the five prayer entries from a `timingsByCity` body.
///
/// Entries that are missing or not strings are left out, so schedule
/// construction reports exactly which prayer was absent.
pub fn parse_timings(body: &str) -> Result<RawTimings, SourceError> {
    let envelope: Envelope<TimingsData> =
        serde_json::from_str(body).map_err(|e| SourceError::Payload(e.to_string()))?;
    let timings = envelope
        .data
        .and_then(|data| data.timings)
        .ok_or_else(|| SourceError::Payload("missing data.timings".to_string()))?;

    let raw: RawTimings = PrayerKey::ALL
        .into_iter()
        .filter_map(|key| {
            timings
                .get(key.label())
                .and_then(Value::as_str)
                .map(|value| (key, value.to_string()))
        })
        .collect();
    Ok(raw)
}

/// Extracts the Hijri date from a `gToH` body.
pub fn parse_hijri(body: &str) -> Result<HijriDate, SourceError> {
    let envelope: Envelope<HijriData> =
        serde_json::from_str(body).map_err(|e| SourceError::Payload(e.to_string()))?;
    let hijri = envelope
        .data
        .and_then(|data| data.hijri)
        .ok_or_else(|| SourceError::Payload("missing data.hijri".to_string()))?;

    let day = hijri
        .day
        .trim()
        .parse()
        .map_err(|_| SourceError::Payload(format!("invalid hijri day: {}", hijri.day)))?;
    let year = hijri
        .year
        .trim()
        .parse()
        .map_err(|_| SourceError::Payload(format!("invalid hijri year: {}", hijri.year)))?;

    Ok(HijriDate {
        day,
        month: hijri.month.ar,
        year,
    })
}

/// HTTP client for the Aladhan API.
#[derive(Debug, Clone)]
pub struct AladhanClient {
    http: reqwest::Client,
    base_url: String,
    location: Location,
    timeout: Duration,
}

impl AladhanClient {
    /// Creates a client for `location` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Network` if the HTTP client cannot be built.
    pub fn new(location: Location, timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            location,
            timeout,
        })
    }

    /// Points the client at another server, e.g. a local mirror.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn timings_url(&self, date: NaiveDate) -> String {
        format!("{}/timingsByCity/{}", self.base_url, date_param(date))
    }

    pub fn hijri_url(&self) -> String {
        format!("{}/gToH", self.base_url)
    }

    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, SourceError> {
        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;
        if !status.is_success() {
            return Err(SourceError::status(status.as_u16(), &body));
        }
        Ok(body)
    }

    fn map_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(self.timeout.as_secs())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl TimingsSource for AladhanClient {
    fn fetch_timings(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<RawTimings, SourceError>> + Send {
        async move {
            let url = self.timings_url(date);
            debug!("Fetching timings from {}", url);
            let method = self.location.method.to_string();
            let request = self.http.get(&url).query(&[
                ("city", self.location.city.as_str()),
                ("country", self.location.country.as_str()),
                ("method", method.as_str()),
            ]);
            let body = self.get_text(request).await?;
            parse_timings(&body)
        }
    }

    fn fetch_hijri(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<HijriDate, SourceError>> + Send {
        async move {
            let url = self.hijri_url();
            debug!("Fetching Hijri date from {}", url);
            let param = date_param(date);
            let request = self.http.get(&url).query(&[("date", param.as_str())]);
            let body = self.get_text(request).await?;
            parse_hijri(&body)
        }
    }
}
