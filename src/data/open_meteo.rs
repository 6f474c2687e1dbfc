//! Open-Meteo weather API client
//!
//! Absolute-date provider variant of [`HourlySource`]: Open-Meteo
//! accepts a start/end date directly, so no fetch-window translation is
//! needed and the current instant is irrelevant. Requires no API key.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;

use super::weather::{truncate_body, HourSample, HourlySource, WeatherError};
use super::Coordinate;

/// Base URL for the Open-Meteo API
const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Hourly variables requested from Open-Meteo
const HOURLY_FIELDS: &str = "temperature_2m,precipitation,snowfall,cloud_cover,visibility";

/// Client for fetching hourly weather data from the Open-Meteo API
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Creates a new OpenMeteoClient using the given HTTP client
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        }
    }

    /// Creates a new OpenMeteoClient with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Parses the hourly response arrays into normalized hour samples
    ///
    /// Open-Meteo returns parallel arrays, one per variable; they must
    /// all agree in length. With `timezone=auto` the time strings are
    /// already in the location's local time. Open-Meteo reports
    /// snowfall in centimeters and visibility in meters, so no unit
    /// conversion happens here.
    fn parse_response(&self, response: OpenMeteoResponse) -> Result<Vec<HourSample>, WeatherError> {
        let hourly = response.hourly;
        let len = hourly.time.len();

        if hourly.temperature_2m.len() != len
            || hourly.precipitation.len() != len
            || hourly.snowfall.len() != len
            || hourly.cloud_cover.len() != len
            || hourly.visibility.len() != len
        {
            return Err(WeatherError::Parse(
                "Open-Meteo",
                "hourly arrays have inconsistent lengths".to_string(),
            ));
        }

        let mut samples = Vec::with_capacity(len);
        for i in 0..len {
            let time = parse_datetime(&hourly.time[i])?;
            samples.push(HourSample {
                date: time.date(),
                hour: time.hour(),
                start_time: hourly.time[i].clone(),
                temperature_c: hourly.temperature_2m[i],
                cloud_cover_pct: hourly.cloud_cover[i],
                visibility_m: hourly.visibility[i],
                precipitation_mm: hourly.precipitation[i].unwrap_or(0.0),
                snowfall_cm: hourly.snowfall[i].unwrap_or(0.0),
            });
        }

        Ok(samples)
    }
}

#[async_trait]
impl HourlySource for OpenMeteoClient {
    async fn hourly_samples(
        &self,
        location: Coordinate,
        target_date: NaiveDate,
        _now: NaiveDateTime,
    ) -> Result<Vec<HourSample>, WeatherError> {
        let start_date = target_date - Duration::days(1);
        let url = format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}&hourly={}&timezone=auto",
            self.base_url,
            location.lat,
            location.lng,
            start_date.format("%Y-%m-%d"),
            target_date.format("%Y-%m-%d"),
            HOURLY_FIELDS
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(WeatherError::Status {
                provider: "Open-Meteo",
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OpenMeteoResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse("Open-Meteo", e.to_string()))?;
        self.parse_response(parsed)
    }
}

/// Parse a datetime string in ISO 8601 format (e.g., "2026-01-15T08:00")
fn parse_datetime(datetime_str: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%dT%H:%M")
        .map_err(|_| WeatherError::Parse("Open-Meteo", format!("invalid time: {datetime_str}")))
}

/// Open-Meteo API response structure
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    hourly: HourlyWeather,
}

/// Hourly weather data arrays from Open-Meteo
#[derive(Debug, Deserialize)]
struct HourlyWeather {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    snowfall: Vec<Option<f64>>,
    cloud_cover: Vec<Option<f64>>,
    visibility: Vec<Option<f64>>,
}
