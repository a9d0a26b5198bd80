//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Draw a uniformly random delay from `[min_secs, max_secs]`
///
/// Both the scrape stage and the trend stage pace their external calls
/// with jittered sleeps drawn from this helper.
pub fn jitter_delay(min_secs: f64, max_secs: f64) -> Duration {
    use rand::Rng;

    let secs = rand::thread_rng().gen_range(min_secs..=max_secs);
    Duration::from_secs_f64(secs)
}
