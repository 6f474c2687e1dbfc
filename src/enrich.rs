//! Resort page enrichment
//!
//! Ranks the resort dataset by great-circle distance from the user,
//! slices the requested page, and fans out across the three data
//! services (routes, weather, snow reports) to build the enriched page.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::debug;

use crate::data::routing::{air_distance_km, RoutingClient, RoutingError};
use crate::data::snow_report::SnowReportClient;
use crate::data::weather::WeatherClient;
use crate::data::{
    all_resorts, Coordinate, EnrichedResort, Resort, ResortPage, ResortRoutes, SnowReport,
    WeatherSummary,
};

/// Errors that can abort a whole page of enrichment
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Routing is the one non-optional enrichment; its failure fails
    /// the page
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Weather was requested but could not be fetched for a single
    /// resort on the page
    #[error("weather could not be fetched for any resort on this page")]
    WeatherUnavailable,
}

/// A resort paired with its air distance from the user
#[derive(Debug, Clone, Copy)]
pub struct RankedResort {
    pub resort: Resort,
    pub air_distance_km: f64,
}

/// Ranks the whole resort dataset by air distance, nearest first
pub fn rank_resorts(user_location: Coordinate) -> Vec<RankedResort> {
    let mut ranked: Vec<RankedResort> = all_resorts()
        .iter()
        .map(|resort| RankedResort {
            resort: *resort,
            air_distance_km: air_distance_km(user_location, resort.location()),
        })
        .collect();
    ranked.sort_by(|a, b| a.air_distance_km.total_cmp(&b.air_distance_km));
    ranked
}

/// Slices one page out of the ranked list (1-based page numbers)
pub fn paginate(ranked: &[RankedResort], page: u32, page_size: u32) -> &[RankedResort] {
    let start = (page as usize - 1).saturating_mul(page_size as usize);
    if start >= ranked.len() {
        return &[];
    }
    let end = (start + page_size as usize).min(ranked.len());
    &ranked[start..end]
}

/// Ranks, paginates, enriches, and wraps everything into a page
///
/// Weather is only fetched when a target date was given; the other two
/// services always run. An empty page skips all fetching.
#[allow(clippy::too_many_arguments)]
pub async fn build_page(
    routing: &RoutingClient,
    weather: &WeatherClient,
    snow_reports: &SnowReportClient,
    user_location: Coordinate,
    page: u32,
    page_size: u32,
    target_date: Option<NaiveDate>,
    now: NaiveDateTime,
) -> Result<ResortPage, EnrichError> {
    let ranked = rank_resorts(user_location);
    let total_resorts = ranked.len();
    let page_resorts = paginate(&ranked, page, page_size);

    let resorts = enrich_page(
        routing,
        weather,
        snow_reports,
        user_location,
        page_resorts,
        target_date,
        now,
    )
    .await?;

    Ok(ResortPage {
        location: user_location,
        page,
        page_size,
        total_resorts,
        has_more: (page as usize).saturating_mul(page_size as usize) < total_resorts,
        resorts,
    })
}

/// Enriches one page of ranked resorts with routes, weather, and snow
/// reports
///
/// The three services are independent and fan out concurrently; every
/// fetch runs to completion and nothing is cancelled when a sibling
/// fails. Routing failure fails the page; a missing weather summary or
/// snow report only affects its own resort.
pub async fn enrich_page(
    routing: &RoutingClient,
    weather: &WeatherClient,
    snow_reports: &SnowReportClient,
    user_location: Coordinate,
    page_resorts: &[RankedResort],
    target_date: Option<NaiveDate>,
    now: NaiveDateTime,
) -> Result<Vec<EnrichedResort>, EnrichError> {
    if page_resorts.is_empty() {
        return Ok(Vec::new());
    }

    let destinations: Vec<Coordinate> = page_resorts
        .iter()
        .map(|r| r.resort.location())
        .collect();
    let snow_urls: Vec<String> = page_resorts
        .iter()
        .map(|r| r.resort.snow_report_url.to_string())
        .collect();
    let weather_locations: Vec<(String, Coordinate)> = page_resorts
        .iter()
        .map(|r| (r.resort.name.to_string(), r.resort.location()))
        .collect();

    // Departure at 08:00 on the target date, when one was given.
    let departure_time =
        target_date.map(|date| date.and_time(NaiveTime::MIN) + Duration::hours(8));

    let (routes, weather_map, snow_map) = futures::join!(
        routing.batch_routes(user_location, &destinations, departure_time),
        async {
            match target_date {
                Some(date) => {
                    weather
                        .fetch_summary_batch(&weather_locations, date, now)
                        .await
                }
                None => HashMap::new(),
            }
        },
        snow_reports.batch_scrape(&snow_urls),
    );
    let routes = routes?;

    // Per-resort weather failures are omitted silently, but losing the
    // whole page means the provider itself is down.
    if target_date.is_some() && weather_map.is_empty() {
        return Err(EnrichError::WeatherUnavailable);
    }

    Ok(assemble(page_resorts, routes, weather_map, snow_map))
}

/// Combines the gathered service results into enriched resorts
///
/// Resorts without any route are dropped from the page; a resort
/// missing only its weather or snow report keeps its slot.
fn assemble(
    page_resorts: &[RankedResort],
    routes: Vec<Option<ResortRoutes>>,
    mut weather_map: HashMap<String, WeatherSummary>,
    mut snow_map: HashMap<String, SnowReport>,
) -> Vec<EnrichedResort> {
    let mut enriched = Vec::with_capacity(page_resorts.len());

    for (i, ranked) in page_resorts.iter().enumerate() {
        let Some(resort_routes) = routes.get(i).cloned().flatten() else {
            debug!(resort = ranked.resort.name, "no route found, dropping from page");
            continue;
        };

        let air_distance = round2(ranked.air_distance_km);
        let distance_km = resort_routes
            .driving
            .distance_km
            .or(resort_routes.transit.distance_km)
            .unwrap_or(air_distance);

        enriched.push(EnrichedResort {
            resort: ranked.resort,
            air_distance_km: air_distance,
            distance_km,
            duration_driving_minutes: resort_routes.driving.duration_minutes,
            duration_transit_minutes: resort_routes.transit.duration_minutes,
            maps_directions_url_driving: resort_routes.driving.maps_directions_url,
            maps_directions_url_transit: resort_routes.transit.maps_directions_url,
            snow_report: snow_map
                .remove(ranked.resort.snow_report_url)
                .unwrap_or_default(),
            weather: weather_map.remove(ranked.resort.name),
        });
    }

    enriched
}

/// Rounds to two decimals, half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
