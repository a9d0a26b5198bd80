//! Timestamped CSV dataset files
//!
//! Filenames embed a full timestamp so consecutive runs never clobber
//! each other. The enrichment dataset reuses the scrape dataset's name
//! with a fixed `_update` suffix, and the trend tables live under a
//! dedicated data directory.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::OutputConfig;
use crate::models::{EnrichedHit, SearchHit, TrendSummary};
use crate::trends::TrendSeries;

/// Suffix appended to the scrape filename for the enriched dataset
const ENRICHED_SUFFIX: &str = "_update";

/// Errors that can occur while persisting or reloading datasets
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding/decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input dataset has an unusable filename
    #[error("Invalid dataset filename: {0}")]
    InvalidFilename(PathBuf),
}

/// Writer/reader for the pipeline's delimited dataset files
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    /// Directory for scrape and enrichment datasets
    output_dir: PathBuf,

    /// Directory for trend datasets
    data_dir: PathBuf,
}

impl DatasetWriter {
    #[must_use]
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            output_dir: output.output_dir.clone(),
            data_dir: output.data_dir.clone(),
        }
    }

    /// Current timestamp in the filename format
    fn timestamp() -> String {
        Local::now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Persist the aggregated scrape hits
    ///
    /// Columns: title, url, game_name, site, time_range, timestamp.
    pub fn write_hits(&self, hits: &[SearchHit]) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self
            .output_dir
            .join(format!("game_monitor_results_{}.csv", Self::timestamp()));

        let mut writer = csv::Writer::from_path(&path)?;
        for hit in hits {
            writer.serialize(hit)?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), rows = hits.len(), "Saved scrape dataset");
        Ok(path)
    }

    /// Persist enriched hits next to their scrape dataset
    ///
    /// The filename is the scrape filename with `_update` appended
    /// before the extension.
    pub fn write_enriched(
        &self,
        hits: &[EnrichedHit],
        scrape_path: &Path,
    ) -> Result<PathBuf, StorageError> {
        let stem = scrape_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| StorageError::InvalidFilename(scrape_path.to_path_buf()))?;

        let dir = scrape_path.parent().unwrap_or(&self.output_dir);
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{stem}{ENRICHED_SUFFIX}.csv"));

        let mut writer = csv::Writer::from_path(&path)?;
        for hit in hits {
            writer.serialize(hit)?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), rows = hits.len(), "Saved enriched dataset");
        Ok(path)
    }

    /// Persist the merged interest-over-time table
    ///
    /// Wide layout: a `date` column followed by one column per keyword,
    /// missing scores left as empty cells.
    pub fn write_trend_series(&self, series: &TrendSeries) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.data_dir)?;

        let path = self
            .data_dir
            .join(format!("genai_trends_raw_30days_{}.csv", Self::timestamp()));

        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["date".to_string()];
        header.extend(series.columns().iter().cloned());
        writer.write_record(&header)?;

        for date in series.dates() {
            let mut record = vec![date.format("%Y-%m-%d").to_string()];
            for column in series.columns() {
                let cell = series
                    .value(&date, column)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                record.push(cell);
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), "Saved raw trend dataset");
        Ok(path)
    }

    /// Persist the ranked-increases table
    pub fn write_summaries(&self, summaries: &[TrendSummary]) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.data_dir)?;

        let path = self.data_dir.join(format!(
            "genai_trends_increases_30days_{}.csv",
            Self::timestamp()
        ));

        let mut writer = csv::Writer::from_path(&path)?;
        for summary in summaries {
            writer.serialize(summary)?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), rows = summaries.len(), "Saved ranked trend dataset");
        Ok(path)
    }

    /// Reload a scrape dataset
    pub fn read_hits(path: &Path) -> Result<Vec<SearchHit>, StorageError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut hits = Vec::new();
        for record in reader.deserialize() {
            hits.push(record?);
        }
        Ok(hits)
    }

    /// Reload an enriched dataset
    pub fn read_enriched(path: &Path) -> Result<Vec<EnrichedHit>, StorageError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut hits = Vec::new();
        for record in reader.deserialize() {
            hits.push(record?);
        }
        Ok(hits)
    }
}
