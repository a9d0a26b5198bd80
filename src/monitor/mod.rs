//! Scrape orchestration
//!
//! Drives the cross product of sites × time windows through the fetcher
//! and extractor on a single logical worker. Every (site, window) pair
//! is visited exactly once, in site-major, window-minor order, and a
//! failed pair never aborts the run or disturbs hits collected from
//! other pairs. The mandatory inter-request delay is a blocking sleep
//! on that worker and is taken after every pair, success or failure.

use chrono::Utc;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{SearchHit, TimeWindow};
use crate::report::Reporter;
use crate::search::extract::ResultExtractor;
use crate::search::SearchFetcher;
use crate::storage::DatasetWriter;
use crate::utils::jitter_delay;

/// Inter-request delay bounds in seconds
const DELAY_RANGE_SECS: (f64, f64) = (2.0, 5.0);

/// Enumerate the run's (site, window) pairs in visit order
///
/// Site-major, window-minor; this is the orchestrator's only iteration
/// order and is deterministic for a given input.
pub fn visit_pairs<'a>(
    sites: &'a [String],
    windows: &'a [TimeWindow],
) -> Vec<(&'a str, TimeWindow)> {
    sites
        .iter()
        .flat_map(|site| windows.iter().map(move |w| (site.as_str(), *w)))
        .collect()
}

/// Orchestrates the scrape stage for one run
pub struct ScrapeOrchestrator {
    fetcher: SearchFetcher,
    extractor: ResultExtractor,
    writer: DatasetWriter,
    reporter: Reporter,

    /// Delay bounds; overridable so tests do not wait
    delay_secs: (f64, f64),

    /// Path of the last persisted scrape dataset
    last_output: Option<PathBuf>,
}

impl ScrapeOrchestrator {
    pub fn new(fetcher: SearchFetcher, writer: DatasetWriter, reporter: Reporter) -> Self {
        Self {
            fetcher,
            extractor: ResultExtractor::new(),
            writer,
            reporter,
            delay_secs: DELAY_RANGE_SECS,
            last_output: None,
        }
    }

    /// Override the inter-request delay bounds (tests only)
    #[doc(hidden)]
    pub fn with_delay_secs(mut self, min: f64, max: f64) -> Self {
        self.delay_secs = (min, max);
        self
    }

    /// Path of the dataset persisted by the last `run`, if any
    #[must_use]
    pub fn last_output(&self) -> Option<&PathBuf> {
        self.last_output.as_ref()
    }

    /// Run the scrape stage over the full cross product
    ///
    /// Returns the aggregated hits; persists them when non-empty. Only
    /// dataset persistence can fail here — per-pair fetch failures are
    /// contained and contribute zero hits.
    pub async fn run(
        &mut self,
        sites: &[String],
        windows: &[TimeWindow],
    ) -> Result<Vec<SearchHit>> {
        let mut hits: Vec<SearchHit> = Vec::new();

        for (site, window) in visit_pairs(sites, windows) {
            self.reporter
                .report(&format!("Monitoring {site} for {window} timeframe"));

            match self.fetcher.fetch(site, window).await {
                Ok(html) => {
                    let observed_at = Utc::now();
                    let found = self.extractor.extract(&html);
                    self.reporter
                        .report(&format!("Found {} results for {site}", found.len()));

                    hits.extend(found.into_iter().map(|partial| SearchHit {
                        title: partial.title,
                        link: partial.link,
                        candidate_name: partial.candidate_name,
                        site: site.to_string(),
                        time_window: window,
                        observed_at,
                    }));
                }
                Err(e) => {
                    tracing::warn!(site = %site, window = %window, error = %e, "Fetch failed");
                    self.reporter
                        .report(&format!("Failed to fetch results for {site}: {e}"));
                }
            }

            // Mandatory pacing delay, taken after every pair
            tokio::time::sleep(jitter_delay(self.delay_secs.0, self.delay_secs.1)).await;
        }

        if hits.is_empty() {
            self.reporter.report("No results found");
            self.last_output = None;
            return Ok(hits);
        }

        let path = self.writer.write_hits(&hits)?;
        self.reporter
            .report(&format!("Results saved to {}", path.display()));
        self.last_output = Some(path);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_order_site_major_window_minor() {
        let sites = vec!["a.com".to_string(), "b.com".to_string()];
        let windows = vec![TimeWindow::Day, TimeWindow::Week];

        let pairs = visit_pairs(&sites, &windows);
        assert_eq!(
            pairs,
            vec![
                ("a.com", TimeWindow::Day),
                ("a.com", TimeWindow::Week),
                ("b.com", TimeWindow::Day),
                ("b.com", TimeWindow::Week),
            ]
        );
    }

    #[test]
    fn test_every_pair_visited_exactly_once() {
        let sites: Vec<String> = (0..5).map(|i| format!("s{i}.com")).collect();
        let windows = TimeWindow::all();

        let pairs = visit_pairs(&sites, &windows);
        assert_eq!(pairs.len(), sites.len() * windows.len());

        let unique: std::collections::HashSet<_> = pairs.iter().collect();
        assert_eq!(unique.len(), pairs.len());
    }

    #[test]
    fn test_empty_inputs_yield_no_pairs() {
        assert!(visit_pairs(&[], &TimeWindow::all()).is_empty());
        assert!(visit_pairs(&["a.com".to_string()], &[]).is_empty());
    }
}
