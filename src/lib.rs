//! trendscout - rising-topic monitor for game sites
//!
//! A three-stage pipeline that monitors a configured set of sites for
//! newly indexed game pages, enriches candidate names into normalized
//! SEO keywords via a text-generation service, and ranks keywords by
//! relative search-interest growth.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`sites`] - Site list loading
//! - [`search`] - Search fetching and result extraction
//! - [`monitor`] - Scrape orchestration over sites × windows
//! - [`llm`] - Keyword enrichment via a chat-completions endpoint
//! - [`trends`] - Interest-over-time batching and growth ranking
//! - [`storage`] - Timestamped CSV dataset persistence
//! - [`report`] - Injected progress-reporting capability
//! - [`pipeline`] - The end-to-end run
//!
//! # Example
//!
//! ```no_run
//! use trendscout::config::Config;
//! use trendscout::pipeline::Pipeline;
//! use trendscout::report::null_reporter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let outcome = Pipeline::new(config, null_reporter()).run().await?;
//!     println!("{} topics ranked", outcome.summaries.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod monitor;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod sites;
pub mod storage;
pub mod trends;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{EnrichedHit, SearchHit, TimeWindow, TrendSummary};
    pub use crate::pipeline::{Pipeline, PipelineOutcome};
    pub use crate::report::{ChannelReporter, NullReporter, ProgressReporter, Reporter};
    pub use crate::storage::DatasetWriter;
}

// Direct re-exports for convenience
pub use models::{EnrichedHit, SearchHit, TimeWindow, TrendSummary};
