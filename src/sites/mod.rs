//! Site list loading
//!
//! The run's site list comes from a line-delimited file supplied by the
//! caller. Blank lines are ignored and duplicates are dropped while
//! preserving first-seen order, so the scrape stage visits each domain
//! exactly once. A missing or unreadable file is the pipeline's only
//! fatal input error and aborts before any network call.

use std::collections::HashSet;
use std::path::Path;

use crate::utils::error::SitesError;

/// Load the ordered, deduplicated site list for a run
pub fn load_sites(path: &Path) -> Result<Vec<String>, SitesError> {
    if !path.exists() {
        return Err(SitesError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| SitesError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    let sites = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect();

    Ok(sites)
}
