//! End-to-end pipeline: scrape → enrich → trend ranking
//!
//! All network I/O runs sequentially on one logical worker; the only
//! concurrency is handing the whole run to a single background task so
//! an interactive caller stays responsive. Per-item failures are
//! contained inside each stage; only input loading and dataset
//! persistence abort a run, and even those are caught at this boundary
//! and reported to the caller instead of crashing the process.

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::Result;
use crate::llm::KeywordEnricher;
use crate::models::{EnrichedHit, SearchHit, TimeWindow, TrendSummary};
use crate::monitor::ScrapeOrchestrator;
use crate::report::Reporter;
use crate::search::SearchFetcher;
use crate::sites::load_sites;
use crate::storage::DatasetWriter;
use crate::trends::{eligible_keywords, rank::rank, TrendBatcher, TrendsClient};

/// Everything a run produced, including the persisted dataset paths
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub hits: Vec<SearchHit>,
    pub enriched: Vec<EnrichedHit>,
    pub summaries: Vec<TrendSummary>,
    pub scrape_path: Option<PathBuf>,
    pub enriched_path: Option<PathBuf>,
    pub trends_raw_path: Option<PathBuf>,
    pub increases_path: Option<PathBuf>,
}

/// The full three-stage pipeline
pub struct Pipeline {
    config: Config,
    reporter: Reporter,
}

impl Pipeline {
    pub fn new(config: Config, reporter: Reporter) -> Self {
        Self { config, reporter }
    }

    /// Time windows selected by the configuration
    fn windows(&self) -> Vec<TimeWindow> {
        match TimeWindow::parse(&self.config.search.time_range) {
            Some(window) => vec![window],
            None => TimeWindow::all(),
        }
    }

    /// Scrape stage: load the site list and run the orchestrator
    ///
    /// Returns the aggregated hits and the persisted dataset path.
    /// Loading the site list is the only fatal input error and happens
    /// before any network call.
    pub async fn run_scrape_stage(&self) -> Result<(Vec<SearchHit>, Option<PathBuf>)> {
        let sites = load_sites(&self.config.search.sites_file)?;
        let windows = self.windows();

        let writer = DatasetWriter::new(&self.config.output);
        let fetcher = SearchFetcher::new(&self.config.search)?;
        let mut orchestrator =
            ScrapeOrchestrator::new(fetcher, writer, self.reporter.clone());

        let hits = orchestrator.run(&sites, &windows).await?;
        let scrape_path = orchestrator.last_output().cloned();

        if !hits.is_empty() {
            self.report_statistics(&hits);
        }

        Ok((hits, scrape_path))
    }

    /// Run the whole pipeline on the current worker
    pub async fn run(&self) -> Result<PipelineOutcome> {
        let (hits, scrape_path) = self.run_scrape_stage().await?;
        let writer = DatasetWriter::new(&self.config.output);

        if hits.is_empty() {
            return Ok(PipelineOutcome::default());
        }

        let enricher = KeywordEnricher::new(self.config.llm.clone(), self.reporter.clone())?;
        let enriched = enricher.enrich_all(hits.clone()).await;

        let enriched_path = match &scrape_path {
            Some(path) => Some(writer.write_enriched(&enriched, path)?),
            None => None,
        };

        let (summaries, trends_raw_path, increases_path) =
            self.run_trend_stage(&writer, &enriched).await?;

        Ok(PipelineOutcome {
            hits,
            enriched,
            summaries,
            scrape_path,
            enriched_path,
            trends_raw_path,
            increases_path,
        })
    }

    /// Trend stage over an already-enriched dataset
    pub async fn run_trend_stage(
        &self,
        writer: &DatasetWriter,
        enriched: &[EnrichedHit],
    ) -> Result<(Vec<TrendSummary>, Option<PathBuf>, Option<PathBuf>)> {
        let (keywords, links) = eligible_keywords(enriched);
        if keywords.is_empty() {
            self.reporter.report("No keywords eligible for trend analysis");
            return Ok((Vec::new(), None, None));
        }

        let client = TrendsClient::new(self.config.trends.clone())?;
        let batcher = TrendBatcher::new(client, self.reporter.clone());
        let series = batcher.fetch_trends(&keywords).await;

        if series.is_empty() {
            self.reporter.report("No trend data collected");
            return Ok((Vec::new(), None, None));
        }

        let summaries = rank(&series, &links);

        let raw_path = writer.write_trend_series(&series)?;
        let increases_path = writer.write_summaries(&summaries)?;
        self.reporter.report(&format!(
            "Trend results saved to {} and {}",
            raw_path.display(),
            increases_path.display()
        ));

        Ok((summaries, Some(raw_path), Some(increases_path)))
    }

    /// Post-run statistics mirroring the scrape dataset
    fn report_statistics(&self, hits: &[SearchHit]) {
        self.reporter
            .report(&format!("Total new pages found: {}", hits.len()));

        let mut per_site: HashMap<&str, usize> = HashMap::new();
        let mut per_window: HashMap<TimeWindow, usize> = HashMap::new();
        for hit in hits {
            *per_site.entry(hit.site.as_str()).or_default() += 1;
            *per_window.entry(hit.time_window).or_default() += 1;
        }

        let mut sites: Vec<_> = per_site.into_iter().collect();
        sites.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        for (site, count) in sites {
            self.reporter.report(&format!("  {site}: {count}"));
        }

        let mut windows: Vec<_> = per_window.into_iter().collect();
        windows.sort_by(|a, b| b.1.cmp(&a.1));
        for (window, count) in windows {
            self.reporter.report(&format!("  {window}: {count}"));
        }
    }

    /// Hand the whole run to one background task
    ///
    /// The caller can keep servicing its own event loop and drain the
    /// reporter channel while the worker runs; the returned handle
    /// yields the outcome or the fatal error.
    pub fn spawn(self) -> JoinHandle<Result<PipelineOutcome>> {
        tokio::spawn(async move { self.run().await })
    }
}
