//! Slopefinder - ski resorts ranked by distance with live conditions
//!
//! A command-line aggregator: given a location and date it ranks the
//! resort dataset by air distance, then concurrently fetches routes,
//! snow reports, and hourly weather for the nearest page of resorts
//! and prints the enriched page.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use reqwest::Client;
use tracing::error;
use tracing_subscriber::EnvFilter;

use slopefinder::cli::{Cli, ProviderArg};
use slopefinder::config::Config;
use slopefinder::data::weather::{HourlySource, WeatherClient};
use slopefinder::data::{
    Coordinate, EnrichedResort, GoogleWeatherClient, OpenMeteoClient, ResortPage, RoutingClient,
    SnowReportClient,
};
use slopefinder::enrich::build_page;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "request failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the clients, runs the query, and renders the result
async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let http = Client::builder().timeout(config.http_timeout).build()?;

    let source: Arc<dyn HourlySource> = match cli.provider {
        ProviderArg::Google => Arc::new(GoogleWeatherClient::new(
            http.clone(),
            config.require_google_api_key()?.to_string(),
        )),
        ProviderArg::OpenMeteo => Arc::new(OpenMeteoClient::new(http.clone())),
    };
    let weather =
        WeatherClient::new(source).with_batch_concurrency(config.weather_concurrency);
    let routing = RoutingClient::new(http.clone(), config.require_google_api_key()?.to_string());
    let snow_reports =
        SnowReportClient::new(http).with_batch_concurrency(config.scrape_concurrency);

    let user_location = Coordinate {
        lat: cli.lat,
        lng: cli.lng,
    };
    let now = Local::now().naive_local();

    let page = build_page(
        &routing,
        &weather,
        &snow_reports,
        user_location,
        cli.page,
        cli.page_size,
        cli.date,
        now,
    )
    .await?;

    if cli.json {
        Ok(serde_json::to_string_pretty(&page)?)
    } else {
        Ok(render_page(&page))
    }
}

/// Renders a page as a readable text table
fn render_page(page: &ResortPage) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Resorts near {:.4}, {:.4} (page {} of {}, {} total)\n\n",
        page.location.lat,
        page.location.lng,
        page.page,
        page.total_resorts.div_ceil(page.page_size.max(1) as usize),
        page.total_resorts
    ));

    if page.resorts.is_empty() {
        out.push_str("No resorts on this page.\n");
        return out;
    }

    for resort in &page.resorts {
        out.push_str(&render_resort(resort));
        out.push('\n');
    }

    if page.has_more {
        out.push_str(&format!(
            "More resorts available: rerun with --page {}\n",
            page.page + 1
        ));
    }

    out
}

/// Renders one enriched resort block
fn render_resort(resort: &EnrichedResort) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} — {:.1} km",
        resort.resort.name, resort.distance_km
    ));
    if let Some(minutes) = resort.duration_driving_minutes {
        out.push_str(&format!(", {minutes} min by car"));
    }
    if let Some(minutes) = resort.duration_transit_minutes {
        out.push_str(&format!(", {minutes} min by transit"));
    }
    out.push('\n');

    if !resort.snow_report.data.is_empty() {
        let fields: Vec<String> = resort
            .snow_report
            .data
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        out.push_str(&format!("  snow report: {}\n", fields.join(", ")));
    }

    if let Some(weather) = &resort.weather {
        out.push_str(&format!(
            "  snowfall last 24h: {:.1} cm\n",
            weather.snowfall_prev_24h_cm
        ));
        for (label, daypart) in [
            ("morning", &weather.morning),
            ("midday", &weather.midday),
            ("afternoon", &weather.afternoon),
        ] {
            let temperature = daypart
                .temperature_c
                .map(|t| format!("{t:.1}°C"))
                .unwrap_or_else(|| "n/a".to_string());
            out.push_str(&format!(
                "  {label}: {temperature}, {:.1} mm precip, {:.1} cm snow\n",
                daypart.precipitation_mm, daypart.snowfall_cm
            ));
        }
    }

    out
}
