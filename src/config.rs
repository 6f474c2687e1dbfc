//! Environment-backed configuration
//!
//! All settings come from environment variables, optionally loaded from
//! a `.env` file at startup. The Google API key is required by the
//! routing client and the default weather provider; its absence is a
//! configuration error raised before any fetching starts.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the Google API key
const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Errors that can occur when reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("required environment variable {0} is not set")]
    MissingKey(&'static str),

    /// An environment variable holds an unusable value
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Runtime configuration for the aggregator
#[derive(Debug, Clone)]
pub struct Config {
    /// Google API key used by the weather and routing clients
    pub google_api_key: Option<String>,
    /// How many resorts fetch weather concurrently
    pub weather_concurrency: usize,
    /// How many snow-report pages are scraped concurrently
    pub scrape_concurrency: usize,
    /// HTTP request timeout for all outbound calls
    pub http_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the environment
    ///
    /// Pool sizes and the HTTP timeout have defaults; the API key stays
    /// optional here so that providers which don't need one can run
    /// without it, and is demanded via `require_google_api_key`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            google_api_key: env::var(GOOGLE_API_KEY_VAR).ok().filter(|v| !v.is_empty()),
            weather_concurrency: parse_var("SLOPEFINDER_WEATHER_CONCURRENCY", 20)?,
            scrape_concurrency: parse_var("SLOPEFINDER_SCRAPE_CONCURRENCY", 10)?,
            http_timeout: Duration::from_secs(parse_var("SLOPEFINDER_HTTP_TIMEOUT_SECS", 30)?),
        })
    }

    /// The Google API key, or a fast configuration error when absent
    pub fn require_google_api_key(&self) -> Result<&str, ConfigError> {
        self.google_api_key
            .as_deref()
            .ok_or(ConfigError::MissingKey(GOOGLE_API_KEY_VAR))
    }
}

/// Parses an environment variable, falling back to a default when unset
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(default),
    }
}
