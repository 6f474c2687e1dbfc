//! Google Weather API client
//!
//! Relative-hour provider variant of [`HourlySource`]. The Google
//! Weather hourly endpoints do not accept an absolute date range: they
//! only take an `hours` count fetched from "now" (backward for history,
//! forward for forecast). The fetch window calculator translates the
//! needed date span into the two hour counts, both lookups run
//! concurrently, and the aggregator's date filtering reconciles any
//! overlap afterwards.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use super::weather::{truncate_body, FetchWindow, HourSample, HourlySource, WeatherError};
use super::Coordinate;

/// Base URL for the Google Weather API
const GOOGLE_WEATHER_BASE_URL: &str = "https://weather.googleapis.com/v1";

/// Which of the two hourly lookup endpoints to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HourKind {
    History,
    Forecast,
}

impl HourKind {
    fn endpoint(&self) -> &'static str {
        match self {
            HourKind::History => "history",
            HourKind::Forecast => "forecast",
        }
    }
}

/// Client for the Google Weather hourly lookup endpoints
#[derive(Debug, Clone)]
pub struct GoogleWeatherClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GoogleWeatherClient {
    /// Creates a new client using the given HTTP client and API key
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: GOOGLE_WEATHER_BASE_URL.to_string(),
        }
    }

    /// Creates a new client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(http: Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }

    /// Fetches up to `hours` hourly records from one endpoint, paging
    /// through the response until enough hours are accumulated or the
    /// provider stops returning a page token
    ///
    /// `hours == 0` short-circuits without issuing a request; this is
    /// how an empty side of the fetch window skips the network call.
    /// Any page fetch failure propagates immediately.
    async fn fetch_hours(
        &self,
        kind: HourKind,
        location: Coordinate,
        hours: u32,
    ) -> Result<Vec<GoogleHour>, WeatherError> {
        if hours == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/{}/hours:lookup", self.base_url, kind.endpoint());
        let mut all_hours: Vec<GoogleHour> = Vec::new();
        let mut page_token: Option<String> = None;

        while (all_hours.len() as u32) < hours {
            let mut request = self
                .http
                .get(&url)
                .query(&[("key", self.api_key.as_str())])
                .query(&[
                    ("location.latitude", location.lat),
                    ("location.longitude", location.lng),
                ])
                .query(&[("hours", hours)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(WeatherError::Status {
                    provider: "Google Weather",
                    status,
                    body: truncate_body(&body),
                });
            }

            let page: HoursResponse = serde_json::from_str(&body)
                .map_err(|e| WeatherError::Parse("Google Weather", e.to_string()))?;
            all_hours.extend(match kind {
                HourKind::History => page.history_hours,
                HourKind::Forecast => page.forecast_hours,
            });

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_hours)
    }
}

#[async_trait]
impl HourlySource for GoogleWeatherClient {
    async fn hourly_samples(
        &self,
        location: Coordinate,
        target_date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Vec<HourSample>, WeatherError> {
        let window = FetchWindow::for_date(now, target_date);
        if window.is_empty() {
            return Ok(Vec::new());
        }

        // The two lookups are independent; both run to completion
        // before either error is propagated.
        let (history, forecast) = futures::future::join(
            self.fetch_hours(HourKind::History, location, window.history_hours),
            self.fetch_hours(HourKind::Forecast, location, window.forecast_hours),
        )
        .await;
        let history = history?;
        let forecast = forecast?;

        Ok(history
            .into_iter()
            .chain(forecast)
            .filter_map(GoogleHour::into_sample)
            .collect())
    }
}

/// One page of the hourly lookup response
///
/// The array key depends on the endpoint (`historyHours` for history,
/// `forecastHours` for forecast); the absent one deserializes empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoursResponse {
    #[serde(default)]
    forecast_hours: Vec<GoogleHour>,
    #[serde(default)]
    history_hours: Vec<GoogleHour>,
    next_page_token: Option<String>,
}

/// One hourly record as returned by the Google Weather API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleHour {
    display_date_time: Option<GoogleDateTime>,
    interval: Option<GoogleInterval>,
    temperature: Option<GoogleDegrees>,
    cloud_cover: Option<f64>,
    visibility: Option<GoogleDistance>,
    precipitation: Option<GooglePrecipitation>,
}

/// Local civil date/time components; zero-valued fields are omitted
/// from the wire format, so every component defaults to 0
#[derive(Debug, Clone, Default, Deserialize)]
struct GoogleDateTime {
    #[serde(default)]
    year: i32,
    #[serde(default)]
    month: u32,
    #[serde(default)]
    day: u32,
    #[serde(default)]
    hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleInterval {
    start_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleDegrees {
    degrees: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleDistance {
    distance: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GooglePrecipitation {
    qpf: Option<GoogleQuantity>,
    snow_qpf: Option<GoogleQuantity>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleQuantity {
    quantity: Option<f64>,
}

impl GoogleHour {
    /// Converts the wire record into a normalized hour sample
    ///
    /// Records without a usable local date/time are dropped: they can
    /// never be bucketed. Units are normalized here: `snowQpf.quantity`
    /// is millimeters (reported as centimeters of snow, so divided by
    /// 10) and `visibility.distance` is kilometers (multiplied to
    /// meters).
    fn into_sample(self) -> Option<HourSample> {
        let display = self.display_date_time?;
        let date = NaiveDate::from_ymd_opt(display.year, display.month, display.day)?;
        let precipitation = self.precipitation.unwrap_or_default();

        Some(HourSample {
            date,
            hour: display.hours,
            start_time: self
                .interval
                .and_then(|i| i.start_time)
                .unwrap_or_default(),
            temperature_c: self.temperature.and_then(|t| t.degrees),
            cloud_cover_pct: self.cloud_cover,
            visibility_m: self
                .visibility
                .and_then(|v| v.distance)
                .map(|km| km * 1000.0),
            precipitation_mm: precipitation
                .qpf
                .and_then(|q| q.quantity)
                .unwrap_or(0.0),
            snowfall_cm: precipitation
                .snow_qpf
                .and_then(|q| q.quantity)
                .unwrap_or(0.0)
                / 10.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Sample hourly record matching the Google Weather wire format
    const VALID_HOUR: &str = r#"{
        "displayDateTime": {"year": 2026, "month": 1, "day": 15, "hours": 9},
        "interval": {"startTime": "2026-01-15T08:00:00Z"},
        "temperature": {"degrees": -2.5, "unit": "CELSIUS"},
        "cloudCover": 85,
        "visibility": {"distance": 12.5, "unit": "KILOMETERS"},
        "precipitation": {
            "qpf": {"quantity": 0.8, "unit": "MILLIMETERS"},
            "snowQpf": {"quantity": 14, "unit": "MILLIMETERS"}
        }
    }"#;

    fn coordinate() -> Coordinate {
        Coordinate {
            lat: 47.4928,
            lng: 11.0620,
        }
    }

    /// Builds one hourly record as JSON for a given date and hour
    fn hour_json(year: i32, month: u32, day: u32, hour: u32) -> serde_json::Value {
        json!({
            "displayDateTime": {"year": year, "month": month, "day": day, "hours": hour},
            "interval": {"startTime": format!("{year}-{month:02}-{day:02}T{hour:02}:00:00Z")},
            "temperature": {"degrees": -1.0},
            "cloudCover": 50,
            "precipitation": {"snowQpf": {"quantity": 5.0}}
        })
    }

    #[test]
    fn test_hour_conversions() {
        let hour: GoogleHour = serde_json::from_str(VALID_HOUR).expect("Failed to parse hour");
        let sample = hour.into_sample().expect("Expected a sample");

        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert_eq!(sample.hour, 9);
        assert_eq!(sample.start_time, "2026-01-15T08:00:00Z");
        assert_eq!(sample.temperature_c, Some(-2.5));
        assert_eq!(sample.cloud_cover_pct, Some(85.0));
        // Kilometers become meters.
        assert_eq!(sample.visibility_m, Some(12500.0));
        assert_eq!(sample.precipitation_mm, 0.8);
        // Millimeters of snow water equivalent become centimeters of snow.
        assert_eq!(sample.snowfall_cm, 1.4);
    }

    #[test]
    fn test_hour_without_display_time_is_dropped() {
        let hour: GoogleHour =
            serde_json::from_str(r#"{"temperature": {"degrees": 1.0}}"#).expect("Failed to parse");
        assert!(hour.into_sample().is_none());
    }

    #[test]
    fn test_hour_zero_is_omitted_from_wire_format() {
        // Midnight arrives without an "hours" field at all.
        let hour: GoogleHour = serde_json::from_str(
            r#"{"displayDateTime": {"year": 2026, "month": 1, "day": 15}}"#,
        )
        .expect("Failed to parse");
        let sample = hour.into_sample().expect("Expected a sample");
        assert_eq!(sample.hour, 0);
        assert_eq!(sample.precipitation_mm, 0.0);
        assert_eq!(sample.snowfall_cm, 0.0);
    }

    #[tokio::test]
    async fn test_fetch_zero_hours_issues_no_request() {
        // No mocks are mounted: any request would 404 and error out.
        let mock_server = MockServer::start().await;
        let client = GoogleWeatherClient::with_base_url(
            Client::new(),
            "test-key".to_string(),
            mock_server.uri(),
        );

        let hours = client
            .fetch_hours(HourKind::History, coordinate(), 0)
            .await
            .expect("Expected empty result without a request");
        assert!(hours.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_accumulates_until_requested_hours() {
        let mock_server = MockServer::start().await;

        let page_one: Vec<serde_json::Value> =
            (0..24).map(|h| hour_json(2026, 1, 14, h)).collect();
        let page_two: Vec<serde_json::Value> = (0..24)
            .map(|h| hour_json(2026, 1, 15, h))
            .chain((0..2).map(|h| hour_json(2026, 1, 16, h)))
            .collect();

        // Follow-up page: matched first via its page token.
        Mock::given(method("GET"))
            .and(path("/forecast/hours:lookup"))
            .and(query_param("pageToken", "page-two"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "forecastHours": page_two,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        // First page: no page token in the request.
        Mock::given(method("GET"))
            .and(path("/forecast/hours:lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "forecastHours": page_one,
                "nextPageToken": "page-two",
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GoogleWeatherClient::with_base_url(
            Client::new(),
            "test-key".to_string(),
            mock_server.uri(),
        );

        let hours = client
            .fetch_hours(HourKind::Forecast, coordinate(), 50)
            .await
            .expect("Expected paginated fetch to succeed");

        // 24 + 26 hours across exactly two calls (verified on drop).
        assert_eq!(hours.len(), 50);
    }

    #[tokio::test]
    async fn test_pagination_stops_when_token_missing() {
        let mock_server = MockServer::start().await;

        let page: Vec<serde_json::Value> = (0..10).map(|h| hour_json(2026, 1, 15, h)).collect();
        Mock::given(method("GET"))
            .and(path("/history/hours:lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "historyHours": page,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GoogleWeatherClient::with_base_url(
            Client::new(),
            "test-key".to_string(),
            mock_server.uri(),
        );

        // Fewer hours than requested, but no token: one call, short result.
        let hours = client
            .fetch_hours(HourKind::History, coordinate(), 24)
            .await
            .expect("Expected fetch to succeed");
        assert_eq!(hours.len(), 10);
    }

    #[tokio::test]
    async fn test_non_success_status_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast/hours:lookup"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&mock_server)
            .await;

        let client = GoogleWeatherClient::with_base_url(
            Client::new(),
            "bad-key".to_string(),
            mock_server.uri(),
        );

        let err = client
            .fetch_hours(HourKind::Forecast, coordinate(), 12)
            .await
            .unwrap_err();
        match err {
            WeatherError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 403);
                assert!(body.contains("API key invalid"));
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hourly_samples_uses_only_history_after_cutoff() {
        // At 18:00 on the target date the span end (17:00) is in the
        // past: only the history endpoint may be called. The forecast
        // endpoint has no mock, so a call there would fail the fetch.
        let mock_server = MockServer::start().await;

        let page: Vec<serde_json::Value> = [
            hour_json(2026, 1, 14, 23),
            hour_json(2026, 1, 15, 9),
            hour_json(2026, 1, 15, 12),
            hour_json(2026, 1, 15, 15),
        ]
        .into_iter()
        .collect();
        Mock::given(method("GET"))
            .and(path("/history/hours:lookup"))
            .and(query_param("hours", "24"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "historyHours": page,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GoogleWeatherClient::with_base_url(
            Client::new(),
            "test-key".to_string(),
            mock_server.uri(),
        );

        let target = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let now = target.and_time(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        let samples = client
            .hourly_samples(coordinate(), target, now)
            .await
            .expect("Expected history-only fetch to succeed");

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].date, NaiveDate::from_ymd_opt(2026, 1, 14).unwrap());
        assert_eq!(samples[1].hour, 9);
        assert_eq!(samples[1].snowfall_cm, 0.5);
    }
}
