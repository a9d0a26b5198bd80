//! Configuration management for the trendscout pipeline
//!
//! Configuration is supplied by an external caller as a key-value JSON
//! file, optionally overridden from environment variables. Components
//! receive their slice of the config at construction time and treat it
//! as read-only for the run's duration; nothing reads ambient global
//! state afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::LlmConfig;
use crate::trends::TrendsConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scrape-stage configuration
    pub search: SearchConfig,

    /// Text-generation service configuration
    pub llm: LlmConfig,

    /// Interest-over-time service configuration
    pub trends: TrendsConfig,

    /// Output locations
    pub output: OutputConfig,
}

/// Scrape-stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Line-delimited file of site domains
    pub sites_file: PathBuf,

    /// Whether to route requests through a forward proxy
    pub proxy_enabled: bool,

    /// Proxy host, applied uniformly to http and https
    pub proxy_host: String,

    /// Proxy port
    pub proxy_port: u16,

    /// Selected lookback window ("24h" or "1w")
    pub time_range: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Result count requested per search page
    pub result_count: u32,

    /// Rate limit for search requests (requests per second)
    pub requests_per_second: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sites_file: PathBuf::from("game_sites.txt"),
            proxy_enabled: false,
            proxy_host: String::from("127.0.0.1"),
            proxy_port: 7890,
            time_range: String::from("24h"),
            request_timeout_secs: 30,
            result_count: 100,
            requests_per_second: 1,
        }
    }
}

impl SearchConfig {
    /// Proxy URL when enabled, `None` otherwise
    pub fn proxy_url(&self) -> Option<String> {
        if self.proxy_enabled {
            Some(format!("http://{}:{}", self.proxy_host, self.proxy_port))
        } else {
            None
        }
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Output locations for dataset files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for scrape and enrichment datasets
    pub output_dir: PathBuf,

    /// Directory for trend datasets
    pub data_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Load configuration from a key-value JSON file
    ///
    /// Missing keys fall back to their defaults, so a partial file
    /// written by the frontend collaborator is accepted.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("TRENDSCOUT_SITES_FILE") {
            config.search.sites_file = v.into();
        }
        if let Ok(v) = std::env::var("TRENDSCOUT_PROXY_HOST") {
            config.search.proxy_enabled = true;
            config.search.proxy_host = v;
        }
        if let Ok(v) = std::env::var("TRENDSCOUT_PROXY_PORT") {
            config.search.proxy_port = v.parse().context("Invalid TRENDSCOUT_PROXY_PORT")?;
        }
        if let Ok(v) = std::env::var("TRENDSCOUT_TIME_RANGE") {
            config.search.time_range = v;
        }
        if let Ok(v) = std::env::var("TRENDSCOUT_OUTPUT_DIR") {
            config.output.output_dir = v.into();
        }
        if let Ok(v) = std::env::var("TRENDSCOUT_DATA_DIR") {
            config.output.data_dir = v.into();
        }

        config.llm = LlmConfig::from_env();
        config.trends = TrendsConfig::from_env();

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.search.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.search.proxy_enabled && self.search.proxy_host.is_empty() {
            anyhow::bail!("proxy_host must not be empty when proxy is enabled");
        }

        if crate::models::TimeWindow::parse(&self.search.time_range).is_none()
            && self.search.time_range != "all"
        {
            anyhow::bail!("time_range must be one of: 24h, 1w, all");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_time_range() {
        let mut config = Config::default();
        config.search.time_range = String::from("1m");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_proxy_url() {
        let mut config = Config::default();
        assert!(config.search.proxy_url().is_none());

        config.search.proxy_enabled = true;
        assert_eq!(
            config.search.proxy_url().as_deref(),
            Some("http://127.0.0.1:7890")
        );
    }

    #[test]
    fn test_empty_proxy_host_rejected() {
        let mut config = Config::default();
        config.search.proxy_enabled = true;
        config.search.proxy_host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_round_trip() {
        let json = r#"{"search": {"proxy_enabled": true, "proxy_port": 8888, "time_range": "1w"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert!(config.search.proxy_enabled);
        assert_eq!(config.search.proxy_port, 8888);
        assert_eq!(config.search.time_range, "1w");
        // Untouched keys keep their defaults
        assert_eq!(config.search.request_timeout_secs, 30);

        let back = serde_json::to_string(&config).unwrap();
        let reparsed: Config = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed.search.proxy_port, 8888);
    }
}
