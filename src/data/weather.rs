//! Weather aggregation core
//!
//! This module turns raw hourly weather samples into the three-daypart
//! summary served for each resort: it computes how many history/forecast
//! hours a relative-hour provider must be asked for, buckets hourly
//! samples into morning/midday/afternoon windows plus a previous-day
//! bucket, and reduces each bucket to a single summary record. It also
//! provides the concurrent batch fetcher that runs the single-location
//! pipeline across many resorts at once.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::warn;

use super::{Coordinate, DaypartSummary, WeatherSummary};

/// Maximum number of history hours a provider supports requesting
pub const HISTORY_HOURS_MAX: i64 = 24;

/// Maximum number of forecast hours a provider supports requesting
pub const FORECAST_HOURS_MAX: i64 = 168;

/// Default number of resorts fetched concurrently in a batch
pub const DEFAULT_BATCH_CONCURRENCY: usize = 20;

/// Errors that can occur when fetching or aggregating weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status code
    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Provider response could not be interpreted
    #[error("Unexpected {0} response: {1}")]
    Parse(&'static str, String),

    /// A required daypart window contained no samples
    #[error("no weather data available for {0}")]
    NoDataForPeriod(Daypart),
}

/// One of the three fixed local-time windows of the target date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Daypart {
    Morning,
    Midday,
    Afternoon,
}

impl Daypart {
    /// The local hours covered by this daypart, both ends inclusive
    pub fn hours(&self) -> RangeInclusive<u32> {
        match self {
            Daypart::Morning => 8..=10,
            Daypart::Midday => 11..=13,
            Daypart::Afternoon => 14..=16,
        }
    }

    /// Whether a local hour of day falls inside this daypart
    pub fn contains(&self, hour: u32) -> bool {
        self.hours().contains(&hour)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Daypart::Morning => "morning",
            Daypart::Midday => "midday",
            Daypart::Afternoon => "afternoon",
        }
    }
}

impl fmt::Display for Daypart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hour's raw weather record, normalized across providers
///
/// `date` and `hour` identify the hour on the resort's local calendar.
/// Optional fields are omitted from averages when absent; precipitation
/// and snowfall are always summed and default to 0 when the provider
/// omits them. Units are normalized at the provider boundary:
/// temperature in Celsius, visibility in meters, precipitation in
/// millimeters, snowfall in centimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct HourSample {
    /// Local calendar date of the hour
    pub date: NaiveDate,
    /// Local hour of day (0-23)
    pub hour: u32,
    /// Interval start as reported by the provider
    pub start_time: String,
    /// Temperature in Celsius
    pub temperature_c: Option<f64>,
    /// Cloud cover percentage (0-100)
    pub cloud_cover_pct: Option<f64>,
    /// Visibility in meters
    pub visibility_m: Option<f64>,
    /// Precipitation in millimeters
    pub precipitation_mm: f64,
    /// Snowfall in centimeters
    pub snowfall_cm: f64,
}

/// How many history and forecast hours must be requested from a
/// provider whose hourly endpoints only accept an hour count relative
/// to "now"
///
/// Such providers cannot be asked for an absolute date range, so the
/// needed span `[target date - 1 day at 00:00, target date at 17:00]`
/// is translated into two relative-hour requests; overlap and excess
/// are reconciled afterwards by the aggregator's date filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Hours of history to request, 0 when the span starts in the future
    pub history_hours: u32,
    /// Hours of forecast to request, 0 when the span ends in the past
    pub forecast_hours: u32,
}

impl FetchWindow {
    /// Computes the fetch window for a target date relative to `now`
    ///
    /// History covers back to the start of the previous day, capped at
    /// the provider's 24-hour history limit; forecast covers forward to
    /// 17:00 of the target date, capped at the provider's 168-hour
    /// forecast limit.
    pub fn for_date(now: NaiveDateTime, target_date: NaiveDate) -> Self {
        let span_start = (target_date - Duration::days(1)).and_time(NaiveTime::MIN);
        let span_end = target_date.and_time(NaiveTime::MIN) + Duration::hours(17);

        let history_hours = if span_start < now {
            (hours_ceil(now - span_start) + 1).min(HISTORY_HOURS_MAX) as u32
        } else {
            0
        };

        let forecast_hours = if span_end > now {
            (hours_ceil(span_end - now) + 1).min(FORECAST_HOURS_MAX) as u32
        } else {
            0
        };

        Self {
            history_hours,
            forecast_hours,
        }
    }

    /// Whether the target date lies entirely outside the supported
    /// window, meaning no request should be issued at all
    pub fn is_empty(&self) -> bool {
        self.history_hours == 0 && self.forecast_hours == 0
    }
}

/// Ceiling of a positive duration expressed in whole hours
fn hours_ceil(delta: Duration) -> i64 {
    (delta.num_seconds() + 3599) / 3600
}

/// Caps an error body carried into an error message
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

/// Rounds to one decimal, half away from zero
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of a slice, None when empty
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Reduces one daypart's samples to a summary record
///
/// Fails with `NoDataForPeriod` when the bucket is empty: a missing
/// daypart is a hard error for the location, not a silently empty
/// summary. Means use only the samples where the optional field is
/// present; sums include every sample.
fn summarize_daypart(
    samples: &[&HourSample],
    period: Daypart,
) -> Result<DaypartSummary, WeatherError> {
    if samples.is_empty() {
        return Err(WeatherError::NoDataForPeriod(period));
    }

    let time = samples
        .iter()
        .min_by_key(|s| (s.date, s.hour))
        .map(|s| s.start_time.clone())
        .unwrap_or_default();

    let temperatures: Vec<f64> = samples.iter().filter_map(|s| s.temperature_c).collect();
    let cloud_cover: Vec<f64> = samples.iter().filter_map(|s| s.cloud_cover_pct).collect();
    let visibility: Vec<f64> = samples.iter().filter_map(|s| s.visibility_m).collect();
    let precipitation: f64 = samples.iter().map(|s| s.precipitation_mm).sum();
    let snowfall: f64 = samples.iter().map(|s| s.snowfall_cm).sum();

    Ok(DaypartSummary {
        time,
        temperature_c: mean(&temperatures).map(round1),
        precipitation_mm: round1(precipitation),
        snowfall_cm: round1(snowfall),
        cloud_cover_pct: mean(&cloud_cover).map(|v| v.round() as i32),
        visibility_m: mean(&visibility).map(|v| v.round()),
    })
}

/// Buckets hour samples by the target date's dayparts and reduces each
/// bucket to its summary
///
/// Samples on the previous calendar day feed the previous-24h snowfall
/// total, which tolerates an empty bucket (0.0); each of the three
/// dayparts must have at least one sample or the whole aggregation
/// fails for this location.
pub fn aggregate(
    samples: &[HourSample],
    target_date: NaiveDate,
) -> Result<WeatherSummary, WeatherError> {
    let previous_date = target_date - Duration::days(1);

    let mut morning: Vec<&HourSample> = Vec::new();
    let mut midday: Vec<&HourSample> = Vec::new();
    let mut afternoon: Vec<&HourSample> = Vec::new();
    let mut snowfall_prev_24h = 0.0;

    for sample in samples {
        if sample.date == target_date {
            if Daypart::Morning.contains(sample.hour) {
                morning.push(sample);
            } else if Daypart::Midday.contains(sample.hour) {
                midday.push(sample);
            } else if Daypart::Afternoon.contains(sample.hour) {
                afternoon.push(sample);
            }
        } else if sample.date == previous_date {
            snowfall_prev_24h += sample.snowfall_cm;
        }
    }

    Ok(WeatherSummary {
        snowfall_prev_24h_cm: round1(snowfall_prev_24h),
        morning: summarize_daypart(&morning, Daypart::Morning)?,
        midday: summarize_daypart(&midday, Daypart::Midday)?,
        afternoon: summarize_daypart(&afternoon, Daypart::Afternoon)?,
    })
}

/// A provider of hourly weather samples for a coordinate
///
/// Implementations return local-time samples covering at least the
/// previous day and the target day up to the end of the afternoon
/// window, to the extent the provider supports it. `now` anchors
/// providers that can only request hours relative to the current
/// instant; providers that accept absolute date ranges ignore it.
#[async_trait]
pub trait HourlySource: Send + Sync {
    async fn hourly_samples(
        &self,
        location: Coordinate,
        target_date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Vec<HourSample>, WeatherError>;
}

/// Fetches and aggregates weather summaries, one resort or many at once
pub struct WeatherClient {
    source: Arc<dyn HourlySource>,
    batch_concurrency: usize,
}

impl WeatherClient {
    /// Creates a new WeatherClient over an hourly sample source
    pub fn new(source: Arc<dyn HourlySource>) -> Self {
        Self {
            source,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Overrides how many resorts are fetched concurrently in a batch
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Fetches and aggregates the weather summary for one location
    pub async fn fetch_summary(
        &self,
        location: Coordinate,
        target_date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<WeatherSummary, WeatherError> {
        let samples = self
            .source
            .hourly_samples(location, target_date, now)
            .await?;
        aggregate(&samples, target_date)
    }

    /// Fetches weather summaries for many named locations concurrently
    ///
    /// Runs up to `batch_concurrency` single-location pipelines at a
    /// time and gathers every result; nothing is cancelled early. A
    /// failed location is logged and omitted from the returned map,
    /// leaving its siblings unaffected. If two inputs share a name the
    /// later-completing result wins.
    pub async fn fetch_summary_batch(
        &self,
        locations: &[(String, Coordinate)],
        target_date: NaiveDate,
        now: NaiveDateTime,
    ) -> HashMap<String, WeatherSummary> {
        let results: Vec<(String, Result<WeatherSummary, WeatherError>)> =
            stream::iter(locations.iter().cloned())
                .map(|(name, location)| async move {
                    let result = self.fetch_summary(location, target_date, now).await;
                    (name, result)
                })
                .buffer_unordered(self.batch_concurrency)
                .collect()
                .await;

        let mut summaries = HashMap::new();
        for (name, result) in results {
            match result {
                Ok(summary) => {
                    summaries.insert(name, summary);
                }
                Err(error) => {
                    warn!(resort = %name, %error, "weather fetch failed, omitting resort");
                }
            }
        }
        summaries
    }
}
