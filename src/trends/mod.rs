//! Interest-over-time collection and batching
//!
//! Enriched keywords are filtered by a fixed link-exclusion rule, then
//! queried against the interest-over-time service in consecutive
//! batches that never exceed the provider's per-call comparison limit.
//! Each batch's columns are merged into one date-indexed table; a
//! failed batch is logged and its columns are simply absent. Batches
//! are paced with a jittered sleep independent of the scrape-stage
//! delay.

pub mod rank;

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;

use crate::models::EnrichedHit;
use crate::report::Reporter;
use crate::utils::jitter_delay;

/// Provider's hard per-call keyword-count limit
pub const MAX_KEYWORDS_PER_REQUEST: usize = 2;

/// Inter-batch delay bounds in seconds
const BATCH_DELAY_SECS: (f64, f64) = (3.0, 8.0);

/// Column name the provider uses to flag partial data
pub const PARTIAL_MARKER_COLUMN: &str = "isPartial";

/// Errors that can occur while fetching interest-over-time data
#[derive(Error, Debug)]
pub enum TrendError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the trend service
    #[error("Trend service returned status {0}")]
    Status(u16),
}

/// Configuration for the interest-over-time client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Trend service base URL
    pub endpoint: String,

    /// Fixed timeframe requested per batch
    pub timeframe: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8686".to_string(),
            timeframe: "today 1-m".to_string(),
            timeout_secs: 30,
        }
    }
}

impl TrendsConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("TRENDSCOUT_TRENDS_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8686".to_string()),
            timeframe: std::env::var("TRENDSCOUT_TRENDS_TIMEFRAME")
                .unwrap_or_else(|_| "today 1-m".to_string()),
            timeout_secs: std::env::var("TRENDSCOUT_TRENDS_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Interest-over-time request for one batch
#[derive(Debug, Serialize)]
struct InterestRequest<'a> {
    keywords: &'a [String],
    timeframe: &'a str,
}

/// Interest-over-time response: a dated numeric table
#[derive(Debug, Deserialize)]
pub struct InterestResponse {
    /// Dates of the table rows, ascending
    pub dates: Vec<NaiveDate>,

    /// Per-keyword scores aligned to `dates`; `null` = missing
    #[serde(default)]
    pub series: HashMap<String, Vec<Option<f64>>>,
}

/// Date-indexed table of relative interest scores in [0, 100]
///
/// Columns keep their insertion order across merges; missing cells are
/// simply absent rather than stored as a sentinel.
#[derive(Debug, Clone, Default)]
pub struct TrendSeries {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, HashMap<String, f64>>,
}

impl TrendSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in insertion order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All dates in ascending order
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.keys().copied().collect()
    }

    /// Cell value for one (date, column), if present
    #[must_use]
    pub fn value(&self, date: &NaiveDate, column: &str) -> Option<f64> {
        self.rows.get(date).and_then(|row| row.get(column)).copied()
    }

    /// One column's cells aligned to the full date index
    #[must_use]
    pub fn column_cells(&self, column: &str) -> Vec<Option<f64>> {
        self.rows
            .values()
            .map(|row| row.get(column).copied())
            .collect()
    }

    /// Insert one column's values aligned to the given dates
    pub fn insert_column(&mut self, name: &str, dates: &[NaiveDate], values: &[Option<f64>]) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }

        for (date, value) in dates.iter().zip(values) {
            if let Some(v) = value {
                self.rows.entry(*date).or_default().insert(name.to_string(), *v);
            } else {
                // Keep the date in the index even when the cell is missing
                self.rows.entry(*date).or_default();
            }
        }
    }

    /// Column-wise merge of a batch response into the running series
    ///
    /// Requested keywords come first so column order follows batch
    /// order; any extra provider columns (the partial-data marker) are
    /// appended after them.
    pub fn merge_response(&mut self, requested: &[String], response: &InterestResponse) {
        for keyword in requested {
            if let Some(values) = response.series.get(keyword) {
                self.insert_column(keyword, &response.dates, values);
            }
        }

        let mut extra: Vec<_> = response
            .series
            .keys()
            .filter(|k| !requested.contains(k))
            .cloned()
            .collect();
        extra.sort();
        for name in extra {
            self.insert_column(&name, &response.dates, &response.series[&name]);
        }
    }
}

/// Undocumented business rule: keywords whose originating link contains
/// this marker are dropped before batching
const EXCLUDED_PATH_MARKER: &str = "post";

/// Link-exclusion predicate applied before batching
#[must_use]
pub fn is_excluded_link(link: &str) -> bool {
    link.contains(EXCLUDED_PATH_MARKER)
}

/// Split keywords into consecutive batches within the provider limit
#[must_use]
pub fn batch_keywords(keywords: &[String]) -> Vec<Vec<String>> {
    keywords
        .chunks(MAX_KEYWORDS_PER_REQUEST)
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Select the keywords eligible for the trend stage, in hit order
///
/// Eligible = enrichment produced a keyword and the originating link is
/// not excluded. Returns the keywords together with a keyword → link
/// map for the ranker.
#[must_use]
pub fn eligible_keywords(hits: &[EnrichedHit]) -> (Vec<String>, HashMap<String, String>) {
    let mut keywords = Vec::new();
    let mut links = HashMap::new();

    for hit in hits {
        let Some(keyword) = hit.keyword.as_deref() else {
            continue;
        };
        if keyword.is_empty() || is_excluded_link(&hit.link) {
            continue;
        }
        if !links.contains_key(keyword) {
            keywords.push(keyword.to_string());
            links.insert(keyword.to_string(), hit.link.clone());
        }
    }

    (keywords, links)
}

/// HTTP client for the interest-over-time service
pub struct TrendsClient {
    client: Client,
    config: TrendsConfig,
}

impl TrendsClient {
    pub fn new(config: TrendsConfig) -> Result<Self, TrendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch interest-over-time for one batch of keywords
    pub async fn interest_over_time(
        &self,
        keywords: &[String],
    ) -> Result<InterestResponse, TrendError> {
        let url = format!("{}/interest_over_time", self.config.endpoint);
        let request = InterestRequest {
            keywords,
            timeframe: &self.config.timeframe,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrendError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Drives filtered keywords through the trend service batch by batch
pub struct TrendBatcher {
    client: TrendsClient,
    reporter: Reporter,

    /// Delay bounds; overridable so tests do not wait
    delay_secs: (f64, f64),
}

impl TrendBatcher {
    pub fn new(client: TrendsClient, reporter: Reporter) -> Self {
        Self {
            client,
            reporter,
            delay_secs: BATCH_DELAY_SECS,
        }
    }

    /// Override the inter-batch delay bounds (tests only)
    #[doc(hidden)]
    pub fn with_delay_secs(mut self, min: f64, max: f64) -> Self {
        self.delay_secs = (min, max);
        self
    }

    /// Fetch and merge interest-over-time for all eligible keywords
    ///
    /// A failed batch is logged and skipped; its columns are absent
    /// from the merged table and unrelated batches are unaffected.
    pub async fn fetch_trends(&self, keywords: &[String]) -> TrendSeries {
        let batches = batch_keywords(keywords);
        let total = batches.len();
        let mut series = TrendSeries::new();

        for (i, batch) in batches.iter().enumerate() {
            self.reporter.report(&format!(
                "Fetching trends batch {}/{total}: {}",
                i + 1,
                batch.join(", ")
            ));

            match self.client.interest_over_time(batch).await {
                Ok(response) => series.merge_response(batch, &response),
                Err(e) => {
                    tracing::warn!(keywords = ?batch, error = %e, "Trend batch failed");
                }
            }

            if i + 1 < total {
                tokio::time::sleep(jitter_delay(self.delay_secs.0, self.delay_secs.1)).await;
            }
        }

        series
    }
}
