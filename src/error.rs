//! Unified error handling for the trendscout crate
//!
//! This module provides a unified error type that consolidates all
//! domain-specific errors into a single `Error` enum, while the domain
//! errors themselves stay close to the modules that produce them.
//!
//! Propagation policy: per-pair fetch failures, per-block parse failures,
//! per-hit enrichment failures, and per-batch trend failures never reach
//! this type at run level — they are contained and logged where they
//! occur. The unified type covers the fatal boundary: input loading,
//! construction, and dataset persistence.

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::llm::EnrichError;
pub use crate::storage::StorageError;
pub use crate::trends::TrendError;
pub use crate::utils::error::{ExtractError, FetchError, SitesError};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, non-2xx)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Dataset and I/O errors
    Storage,
    /// Text-generation service errors
    Llm,
    /// Missing or invalid inputs and configuration
    Input,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the trendscout crate
#[derive(Error, Debug)]
pub enum Error {
    /// Site list loading errors; fatal, abort before any network call
    #[error("Input error: {0}")]
    Sites(#[from] SitesError),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Extraction-specific errors
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Keyword enrichment errors
    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    /// Trend service errors
    #[error("Trend error: {0}")]
    Trend(#[from] TrendError),

    /// Dataset persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is recoverable at its processing boundary
    ///
    /// Recoverable means the run continues with the item's data absent;
    /// non-recoverable errors abort the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Sites(_) => false,
            Self::Fetch(_) | Self::Http(_) => true,
            Self::Extract(_) => true,
            Self::Enrich(_) => true,
            Self::Trend(_) => true,
            Self::Storage(_) | Self::Io(_) => false,
            Self::Json(_) => false,
            Self::Config(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) | Self::Http(_) => ErrorCategory::Network,
            Self::Extract(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Enrich(_) => ErrorCategory::Llm,
            Self::Trend(_) => ErrorCategory::Network,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Sites(_) | Self::Config(_) => ErrorCategory::Input,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
