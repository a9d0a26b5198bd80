//! Dataset persistence
//!
//! Intermediate and final tables are persisted as timestamped delimited
//! files: scrape hits, enriched hits, the raw interest-over-time table,
//! and the ranked-increases table.

pub mod dataset;

pub use dataset::{DatasetWriter, StorageError};
