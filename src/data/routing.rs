//! Route matrix client
//!
//! Fetches driving and transit routes from the user's location to a
//! page of resorts using the Google Routes API route-matrix endpoint,
//! and provides the great-circle air distance used to pre-sort resorts
//! before real routing distances are known.

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::weather::truncate_body;
use super::{Coordinate, ResortRoutes, RouteLeg};

/// Base URL for the Google Routes API
const ROUTES_BASE_URL: &str = "https://routes.googleapis.com";

/// Response fields requested from the route-matrix endpoint
const ROUTE_MATRIX_FIELD_MASK: &str =
    "originIndex,destinationIndex,condition,distanceMeters,duration";

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors that can occur when fetching routes
#[derive(Debug, Error)]
pub enum RoutingError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status code
    #[error("route matrix request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Provider response could not be interpreted
    #[error("Unexpected route matrix response: {0}")]
    Parse(String),
}

/// Travel modes requested per destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TravelMode {
    Drive,
    Transit,
}

impl TravelMode {
    /// Mode name on the route-matrix wire format
    fn api_name(&self) -> &'static str {
        match self {
            TravelMode::Drive => "DRIVE",
            TravelMode::Transit => "TRANSIT",
        }
    }

    /// Mode name in Google Maps directions URLs
    fn url_name(&self) -> &'static str {
        match self {
            TravelMode::Drive => "driving",
            TravelMode::Transit => "transit",
        }
    }
}

/// Great-circle distance between two coordinates in kilometers
///
/// Haversine formula over a spherical Earth; used as a cheap sort key
/// before real routing distances are fetched for a page.
pub fn air_distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = (to.lat - from.lat).to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Client for fetching driving and transit routes
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl RoutingClient {
    /// Creates a new RoutingClient using the given HTTP client and API key
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: ROUTES_BASE_URL.to_string(),
        }
    }

    /// Creates a new RoutingClient with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(http: Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }

    /// Fetches driving and transit routes to every destination
    ///
    /// The returned vector is aligned positionally with `destinations`.
    /// A destination neither mode can route to is `None`; a destination
    /// only one mode can route to keeps the other leg's fields empty.
    /// The two travel modes are independent matrix calls and run
    /// concurrently; both run to completion before an error is
    /// propagated.
    pub async fn batch_routes(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        departure_time: Option<NaiveDateTime>,
    ) -> Result<Vec<Option<ResortRoutes>>, RoutingError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }

        let (driving, transit) = futures::future::join(
            self.route_matrix(origin, destinations, TravelMode::Drive, departure_time),
            self.route_matrix(origin, destinations, TravelMode::Transit, departure_time),
        )
        .await;
        let driving = driving?;
        let transit = transit?;

        let routes = destinations
            .iter()
            .enumerate()
            .map(|(i, &destination)| {
                let drive = driving.get(i).cloned().flatten();
                let ride = transit.get(i).cloned().flatten();
                if drive.is_none() && ride.is_none() {
                    return None;
                }
                Some(ResortRoutes {
                    driving: build_leg(drive.as_ref(), origin, destination, TravelMode::Drive),
                    transit: build_leg(ride.as_ref(), origin, destination, TravelMode::Transit),
                })
            })
            .collect();

        Ok(routes)
    }

    /// Runs one route-matrix call for a single travel mode
    ///
    /// Returns one slot per destination; a destination the mode cannot
    /// reach (no element, or condition other than ROUTE_EXISTS) stays
    /// `None`.
    async fn route_matrix(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
        departure_time: Option<NaiveDateTime>,
    ) -> Result<Vec<Option<MatrixElement>>, RoutingError> {
        let url = format!("{}/distanceMatrix/v2:computeRouteMatrix", self.base_url);

        let mut request_body = json!({
            "origins": [waypoint(origin)],
            "destinations": destinations.iter().map(|&d| waypoint(d)).collect::<Vec<_>>(),
            "travelMode": mode.api_name(),
        });
        if let Some(departure) = departure_time {
            request_body["departureTime"] =
                json!(format!("{}Z", departure.format("%Y-%m-%dT%H:%M:%S")));
        }

        let response = self
            .http
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", ROUTE_MATRIX_FIELD_MASK)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RoutingError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let elements: Vec<MatrixElement> =
            serde_json::from_str(&body).map_err(|e| RoutingError::Parse(e.to_string()))?;

        let mut slots: Vec<Option<MatrixElement>> = vec![None; destinations.len()];
        for element in elements {
            if element.condition.as_deref() != Some("ROUTE_EXISTS") {
                continue;
            }
            if let Some(slot) = slots.get_mut(element.destination_index) {
                *slot = Some(element);
            }
        }

        Ok(slots)
    }
}

/// A latitude/longitude waypoint on the route-matrix wire format
fn waypoint(coordinate: Coordinate) -> serde_json::Value {
    json!({
        "waypoint": {
            "location": {
                "latLng": {
                    "latitude": coordinate.lat,
                    "longitude": coordinate.lng
                }
            }
        }
    })
}

/// One element of the route-matrix response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatrixElement {
    /// Destination position in the request; zero values are omitted
    /// from the wire format
    #[serde(default)]
    destination_index: usize,
    condition: Option<String>,
    distance_meters: Option<f64>,
    /// Protobuf duration string, e.g. "3540s"
    duration: Option<String>,
}

/// Builds one mode's route leg for a destination
fn build_leg(
    element: Option<&MatrixElement>,
    origin: Coordinate,
    destination: Coordinate,
    mode: TravelMode,
) -> RouteLeg {
    RouteLeg {
        distance_km: element
            .and_then(|e| e.distance_meters)
            .map(|meters| round2(meters / 1000.0)),
        duration_minutes: element
            .and_then(|e| e.duration.as_deref())
            .and_then(parse_duration_minutes),
        maps_directions_url: maps_directions_url(origin, destination, mode),
    }
}

/// Google Maps directions URL for a mode between two coordinates
fn maps_directions_url(origin: Coordinate, destination: Coordinate, mode: TravelMode) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode={}",
        origin.lat,
        origin.lng,
        destination.lat,
        destination.lng,
        mode.url_name()
    )
}

/// Parses a protobuf duration string like "1780s" into whole minutes
fn parse_duration_minutes(raw: &str) -> Option<i64> {
    let seconds: f64 = raw.strip_suffix('s')?.parse().ok()?;
    Some((seconds / 60.0).round() as i64)
}

/// Rounds to two decimals, half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
