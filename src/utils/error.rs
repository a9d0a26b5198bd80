//! Error types for the scrape stage
//!
//! Fetch and extraction failures are contained at the (site, window) or
//! result-block boundary; nothing downstream ever sees them as exceptions,
//! only as absent data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a search result page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the search endpoint
    #[error("Search endpoint returned status {0}")]
    Status(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Invalid proxy address
    #[error("Invalid proxy address: {0}")]
    InvalidProxy(String),
}

/// Errors that can occur while extracting hits from a result page
///
/// These never leave the extractor: a failed block is logged and skipped,
/// and `extract` always returns a (possibly empty) sequence.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Result block is missing its heading
    #[error("Result block has no heading")]
    HeadingNotFound,

    /// Result block is missing its link
    #[error("Result block has no link")]
    LinkNotFound,
}

/// Errors that can occur while loading the site list
#[derive(Error, Debug)]
pub enum SitesError {
    /// Input file absent; fatal before any network call
    #[error("Sites file not found: {0}")]
    NotFound(PathBuf),

    /// Input file unreadable
    #[error("Failed to read sites file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
