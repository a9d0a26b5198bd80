// Core data structures for the trendscout pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lookback window applied to a site-restricted search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    /// Last 24 hours
    #[serde(rename = "24h")]
    Day,
    /// Last week
    #[serde(rename = "1w")]
    Week,
}

impl TimeWindow {
    /// Query time modifier understood by the search endpoint
    pub fn query_modifier(&self) -> &'static str {
        match self {
            Self::Day => "qdr:d",
            Self::Week => "qdr:w",
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::Week => "1w",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "24h" => Some(Self::Day),
            "1w" => Some(Self::Week),
            _ => None,
        }
    }

    /// All windows, in the order the scrape stage visits them
    pub fn all() -> Vec<Self> {
        vec![Self::Day, Self::Week]
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parsed search-result record prior to enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,

    #[serde(rename = "url")]
    pub link: String,

    /// Candidate game name extracted from the heading, if any
    #[serde(rename = "game_name")]
    pub candidate_name: Option<String>,

    /// Site the query was restricted to
    pub site: String,

    #[serde(rename = "time_range")]
    pub time_window: TimeWindow,

    /// Capture time stamped by the orchestrator
    #[serde(rename = "timestamp", with = "timestamp_format")]
    pub observed_at: DateTime<Utc>,
}

/// A search hit with its normalized SEO keyword attached
///
/// The keyword is `None` when enrichment failed for this hit; the
/// pipeline carries the hit forward either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedHit {
    pub title: String,

    #[serde(rename = "url")]
    pub link: String,

    #[serde(rename = "game_name")]
    pub candidate_name: Option<String>,

    pub site: String,

    #[serde(rename = "time_range")]
    pub time_window: TimeWindow,

    #[serde(rename = "timestamp", with = "timestamp_format")]
    pub observed_at: DateTime<Utc>,

    #[serde(rename = "keywords")]
    pub keyword: Option<String>,
}

impl EnrichedHit {
    /// Attach a keyword (or the lack of one) to a hit
    pub fn from_hit(hit: SearchHit, keyword: Option<String>) -> Self {
        Self {
            title: hit.title,
            link: hit.link,
            candidate_name: hit.candidate_name,
            site: hit.site,
            time_window: hit.time_window,
            observed_at: hit.observed_at,
            keyword,
        }
    }
}

/// Per-keyword growth metrics over the merged trend table
///
/// Recomputed per run; the descending sort on `percent_increase` is a
/// projection applied at ranking time, not a property of the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSummary {
    pub keyword: String,
    pub link: String,
    pub start_value: f64,
    pub end_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub percent_increase: f64,
}

/// Serde helper for `%Y-%m-%d %H:%M:%S` timestamps in dataset files
pub(crate) mod timestamp_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let naive =
            NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)?;
        Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
    }
}
