//! Command-line interface parsing for Slopefinder
//!
//! This module handles parsing of CLI arguments using clap, including
//! page validation (page numbers start at 1, page size is capped at 10)
//! so invalid input is rejected as a usage error before any fetching.

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

/// Which hourly weather provider backs the weather summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Google Weather API (relative-hour windowing, needs GOOGLE_API_KEY)
    Google,
    /// Open-Meteo (absolute date ranges, no key needed)
    OpenMeteo,
}

/// Slopefinder - rank ski resorts by distance and view their conditions
#[derive(Parser, Debug)]
#[command(name = "slopefinder")]
#[command(about = "Ski resorts ranked by distance, with routes, snow reports and weather")]
#[command(version)]
pub struct Cli {
    /// Your latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Your longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Target date for weather summaries (YYYY-MM-DD); weather is
    /// skipped when omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Page number (1-based)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Resorts per page
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub page_size: u32,

    /// Weather provider to use
    #[arg(long, value_enum, default_value_t = ProviderArg::Google)]
    pub provider: ProviderArg,

    /// Print the page as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
