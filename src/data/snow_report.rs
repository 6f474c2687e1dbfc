//! Snow report scraper
//!
//! Fetches resort snow-condition pages and extracts the common labeled
//! measurements (snow depths, fresh snow, open lifts and runs) into a
//! loose field map. Resort sites vary wildly, so extraction is
//! best-effort: whatever labels match are reported, and a page that
//! yields nothing produces an empty report rather than an error.

use std::collections::{BTreeMap, HashMap};

use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use super::SnowReport;

/// Default number of pages scraped concurrently in a batch
pub const DEFAULT_SCRAPE_CONCURRENCY: usize = 10;

/// Errors that can occur when scraping a snow-report page
#[derive(Debug, Error)]
pub enum SnowReportError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Page answered with a non-success status code
    #[error("snow report request failed with status {status}")]
    Status { status: reqwest::StatusCode },
}

/// Client for scraping resort snow-report pages
#[derive(Debug, Clone)]
pub struct SnowReportClient {
    http: Client,
    batch_concurrency: usize,
}

impl SnowReportClient {
    /// Creates a new SnowReportClient using the given HTTP client
    pub fn new(http: Client) -> Self {
        Self {
            http,
            batch_concurrency: DEFAULT_SCRAPE_CONCURRENCY,
        }
    }

    /// Overrides how many pages are scraped concurrently in a batch
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Scrapes one snow-report page into its field map
    pub async fn scrape(&self, url: &str) -> Result<SnowReport, SnowReportError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SnowReportError::Status { status });
        }
        let html = response.text().await?;
        Ok(parse_snow_report(&html))
    }

    /// Scrapes many pages concurrently
    ///
    /// The returned map always has an entry for every URL: a failed
    /// scrape is logged and yields an empty report, leaving its
    /// siblings unaffected. Nothing is cancelled early.
    pub async fn batch_scrape(&self, urls: &[String]) -> HashMap<String, SnowReport> {
        let results: Vec<(String, Result<SnowReport, SnowReportError>)> =
            stream::iter(urls.iter().cloned())
                .map(|url| async move {
                    let result = self.scrape(&url).await;
                    (url, result)
                })
                .buffer_unordered(self.batch_concurrency)
                .collect()
                .await;

        results
            .into_iter()
            .map(|(url, result)| match result {
                Ok(report) => (url, report),
                Err(error) => {
                    warn!(%url, %error, "snow report scrape failed, using empty report");
                    (url, SnowReport::default())
                }
            })
            .collect()
    }
}

/// Label patterns tried against the page text, in English and German
///
/// Each pattern allows a short gap between the label and the value so
/// markup remnants and unit prefixes in between don't break the match.
const FIELD_PATTERNS: [(&str, &str); 5] = [
    (
        "snow_depth_mountain_cm",
        r"(?i)(?:mountain|summit|berg|gipfel)\D{0,40}?(\d+)\s*cm",
    ),
    (
        "snow_depth_valley_cm",
        r"(?i)(?:valley|base|tal)\D{0,40}?(\d+)\s*cm",
    ),
    (
        "fresh_snow_cm",
        r"(?i)(?:fresh\s+snow|new\s+snow|neuschnee)\D{0,40}?(\d+)\s*cm",
    ),
    (
        "lifts_open",
        r"(?i)(\d+)\s*(?:/|of|von)\s*\d+\s*(?:lifts?|lifte|bahnen)",
    ),
    (
        "runs_open",
        r"(?i)(\d+)\s*(?:/|of|von)\s*\d+\s*(?:runs?|slopes?|pisten|abfahrten)",
    ),
];

/// Pulls labeled measurements out of a snow-report page
///
/// Scripts, styles, and tags are stripped first so labels and values
/// separated only by markup end up adjacent in the text.
pub fn parse_snow_report(html: &str) -> SnowReport {
    let text = strip_html(html);

    let mut data = BTreeMap::new();
    for (field, pattern) in FIELD_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(value) = re.captures(&text).and_then(|c| c.get(1)) {
                data.insert(field.to_string(), value.as_str().to_string());
            }
        }
    }

    SnowReport { data }
}

/// Replaces script/style blocks and tags with spaces
fn strip_html(html: &str) -> String {
    let without_scripts = Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>")
        .map(|re| re.replace_all(html, " ").into_owned())
        .unwrap_or_else(|_| html.to_string());

    Regex::new(r"<[^>]*>")
        .map(|re| re.replace_all(&without_scripts, " ").into_owned())
        .unwrap_or(without_scripts)
}
