//! Core data models for Slopefinder
//!
//! This module contains all the data types used throughout the application
//! for representing ski resorts, routes, snow reports, and aggregated
//! weather information.

pub mod google_weather;
pub mod open_meteo;
pub mod resort;
pub mod routing;
pub mod snow_report;
pub mod weather;

pub use google_weather::GoogleWeatherClient;
pub use open_meteo::OpenMeteoClient;
pub use resort::{all_resorts, get_resort_by_id};
pub use routing::{RoutingClient, RoutingError};
pub use snow_report::{SnowReportClient, SnowReportError};
#[allow(unused_imports)]
pub use weather::{HourSample, HourlySource, WeatherClient, WeatherError};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude/longitude pair)
///
/// No range validation is performed; callers are expected to pass
/// coordinates that make sense for the resort dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

/// Represents a ski resort in the static dataset
///
/// Uses `&'static str` for string fields to allow static initialization
/// of the RESORTS array. For runtime-created Resort instances, use string
/// literals or leak the strings.
///
/// Note: This struct only implements `Serialize` (not `Deserialize`) because
/// the static string references cannot be safely deserialized. Use
/// `get_resort_by_id` to look up resorts from deserialized resort IDs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Resort {
    /// Unique identifier for the resort
    pub id: &'static str,
    /// Human-readable name of the resort
    pub name: &'static str,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
    /// URL of the resort's snow-report page
    pub snow_report_url: &'static str,
}

impl Resort {
    /// The resort's location as a Coordinate
    pub fn location(&self) -> Coordinate {
        Coordinate {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Aggregated weather for one daypart of the target date
///
/// Built by the daypart aggregator from the hour samples falling inside
/// the daypart's window. Construction fails when the window has no
/// samples, so an instance always describes at least one hour of data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaypartSummary {
    /// Interval start of the earliest hour in the window, as reported
    /// by the provider
    pub time: String,
    /// Mean temperature in Celsius, rounded to 1 decimal; None if no
    /// sample in the window carried a temperature
    pub temperature_c: Option<f64>,
    /// Total precipitation in millimeters, rounded to 1 decimal
    pub precipitation_mm: f64,
    /// Total snowfall in centimeters, rounded to 1 decimal
    pub snowfall_cm: f64,
    /// Mean cloud cover as an integer percentage; None if no sample in
    /// the window carried cloud cover
    pub cloud_cover_pct: Option<i32>,
    /// Mean visibility in meters, rounded to a whole meter; None if no
    /// sample in the window carried visibility
    pub visibility_m: Option<f64>,
}

/// Aggregated weather for one (resort, date) request
///
/// Constructed fresh per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    /// Total snowfall over the entire previous day in centimeters,
    /// rounded to 1 decimal (0.0 when no previous-day data was available)
    pub snowfall_prev_24h_cm: f64,
    /// Morning window (hours 8-10)
    pub morning: DaypartSummary,
    /// Midday window (hours 11-13)
    pub midday: DaypartSummary,
    /// Afternoon window (hours 14-16)
    pub afternoon: DaypartSummary,
}

/// One travel mode's route to a resort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Route distance in kilometers, if the mode could route there
    pub distance_km: Option<f64>,
    /// Route duration in minutes, if the mode could route there
    pub duration_minutes: Option<i64>,
    /// Google Maps directions URL for this mode
    pub maps_directions_url: String,
}

/// Driving and transit routes from the user's location to one resort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResortRoutes {
    /// Driving route
    pub driving: RouteLeg,
    /// Public transit route
    pub transit: RouteLeg,
}

/// Structured fields scraped from a resort's snow-report page
///
/// The set of fields varies per resort website; values are kept as
/// loosely typed strings. An unreachable or unparseable page yields an
/// empty field map rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnowReport {
    /// Extracted snow-report fields (e.g. "snow_depth_mountain_cm")
    pub data: BTreeMap<String, String>,
}

/// A resort enriched with routes, snow report, and optional weather
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedResort {
    /// The resort this data is for
    pub resort: Resort,
    /// Great-circle distance from the user's location in kilometers
    pub air_distance_km: f64,
    /// Best-known distance in kilometers: driving, falling back to
    /// transit, falling back to air distance
    pub distance_km: f64,
    /// Driving duration in minutes, if routable
    pub duration_driving_minutes: Option<i64>,
    /// Transit duration in minutes, if routable
    pub duration_transit_minutes: Option<i64>,
    /// Google Maps driving directions URL
    pub maps_directions_url_driving: String,
    /// Google Maps transit directions URL
    pub maps_directions_url_transit: String,
    /// Scraped snow-report fields for this resort
    pub snow_report: SnowReport,
    /// Aggregated weather for the requested date, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSummary>,
}

/// One page of resorts ordered by distance
#[derive(Debug, Clone, Serialize)]
pub struct ResortPage {
    /// The user's location the page was computed for
    pub location: Coordinate,
    /// Page number (1-based)
    pub page: u32,
    /// Number of resorts per page
    pub page_size: u32,
    /// Total number of resorts in the dataset
    pub total_resorts: usize,
    /// Whether further pages exist
    pub has_more: bool,
    /// The enriched resorts on this page, nearest first
    pub resorts: Vec<EnrichedResort>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resort_location() {
        let resort = Resort {
            id: "brauneck",
            name: "Brauneck",
            latitude: 47.6746,
            longitude: 11.5558,
            snow_report_url: "https://example.com/snow",
        };

        let location = resort.location();
        assert!((location.lat - 47.6746).abs() < 0.0001);
        assert!((location.lng - 11.5558).abs() < 0.0001);
    }

    #[test]
    fn test_weather_summary_serialization_roundtrip() {
        let daypart = DaypartSummary {
            time: "2026-01-15T08:00".to_string(),
            temperature_c: Some(-3.2),
            precipitation_mm: 1.4,
            snowfall_cm: 2.1,
            cloud_cover_pct: Some(74),
            visibility_m: Some(8500.0),
        };
        let summary = WeatherSummary {
            snowfall_prev_24h_cm: 12.5,
            morning: daypart.clone(),
            midday: daypart.clone(),
            afternoon: daypart,
        };

        let json = serde_json::to_string(&summary).expect("Failed to serialize WeatherSummary");
        let deserialized: WeatherSummary =
            serde_json::from_str(&json).expect("Failed to deserialize WeatherSummary");

        assert_eq!(deserialized, summary);
    }

    #[test]
    fn test_daypart_summary_absent_fields_serialize_as_null() {
        let daypart = DaypartSummary {
            time: "2026-01-15T11:00".to_string(),
            temperature_c: None,
            precipitation_mm: 0.0,
            snowfall_cm: 0.0,
            cloud_cover_pct: None,
            visibility_m: None,
        };

        let json = serde_json::to_value(&daypart).expect("Failed to serialize DaypartSummary");
        assert!(json["temperature_c"].is_null());
        assert!(json["cloud_cover_pct"].is_null());
        assert!(json["visibility_m"].is_null());
    }

    #[test]
    fn test_enriched_resort_omits_missing_weather() {
        let resort = Resort {
            id: "sudelfeld",
            name: "Sudelfeld",
            latitude: 47.6703,
            longitude: 12.0399,
            snow_report_url: "https://example.com/snow",
        };
        let enriched = EnrichedResort {
            resort,
            air_distance_km: 61.32,
            distance_km: 74.8,
            duration_driving_minutes: Some(58),
            duration_transit_minutes: None,
            maps_directions_url_driving: "https://maps.example/driving".to_string(),
            maps_directions_url_transit: "https://maps.example/transit".to_string(),
            snow_report: SnowReport::default(),
            weather: None,
        };

        let json = serde_json::to_value(&enriched).expect("Failed to serialize EnrichedResort");
        assert!(json.get("weather").is_none());
        assert_eq!(json["resort"]["id"], "sudelfeld");
    }

    #[test]
    fn test_snow_report_default_is_empty() {
        let report = SnowReport::default();
        assert!(report.data.is_empty());
    }

    #[test]
    fn test_route_leg_serialization_roundtrip() {
        let routes = ResortRoutes {
            driving: RouteLeg {
                distance_km: Some(92.4),
                duration_minutes: Some(71),
                maps_directions_url: "https://maps.example/d".to_string(),
            },
            transit: RouteLeg {
                distance_km: None,
                duration_minutes: None,
                maps_directions_url: "https://maps.example/t".to_string(),
            },
        };

        let json = serde_json::to_string(&routes).expect("Failed to serialize ResortRoutes");
        let deserialized: ResortRoutes =
            serde_json::from_str(&json).expect("Failed to deserialize ResortRoutes");

        assert_eq!(deserialized, routes);
    }
}
