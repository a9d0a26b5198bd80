use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendscout::config::Config;
use trendscout::llm::KeywordEnricher;
use trendscout::pipeline::Pipeline;
use trendscout::report::{Reporter, TracingReporter};
use trendscout::storage::DatasetWriter;

#[derive(Parser)]
#[command(
    name = "trendscout",
    version,
    about = "Monitor game sites for new pages and rank rising search-interest topics",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Key-value JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the configured sites for newly indexed pages
    Monitor {
        /// Line-delimited file of site domains
        #[arg(short, long)]
        sites: Option<PathBuf>,

        /// Time range to search (24h, 1w, all)
        #[arg(short, long)]
        time_range: Option<String>,
    },

    /// Enrich a scrape dataset with normalized SEO keywords
    Enrich {
        /// Scrape dataset to enrich
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Fetch and rank interest-over-time for an enriched dataset
    Trends {
        /// Enriched dataset to analyze
        #[arg(short, long)]
        input: PathBuf,

        /// Timeframe requested from the trend service
        #[arg(long)]
        timeframe: Option<String>,
    },

    /// Run the full scrape → enrich → trends pipeline
    Run {
        /// Line-delimited file of site domains
        #[arg(short, long)]
        sites: Option<PathBuf>,

        /// Time range to search (24h, 1w, all)
        #[arg(short, long)]
        time_range: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    tracing::info!("trendscout starting");

    let reporter: Reporter = Arc::new(TracingReporter);

    match cli.command {
        Commands::Monitor { sites, time_range } => {
            apply_overrides(&mut config, sites, time_range);
            config.validate()?;

            tracing::info!(sites = %config.search.sites_file.display(), "Starting monitor command");

            // Scrape stage only, no enrichment or trend lookups
            let pipeline = Pipeline::new(config, reporter);
            let (_, saved) = pipeline.run_scrape_stage().await?;
            if let Some(path) = saved {
                println!("Results saved to {}", path.display());
            } else {
                println!("No results found");
            }
        }

        Commands::Enrich { input } => {
            config.validate()?;
            tracing::info!(input = %input.display(), "Starting enrich command");

            let hits = DatasetWriter::read_hits(&input)?;
            let enricher = KeywordEnricher::new(config.llm.clone(), reporter)?;
            let enriched = enricher.enrich_all(hits).await;

            let writer = DatasetWriter::new(&config.output);
            let path = writer.write_enriched(&enriched, &input)?;
            println!("Enriched dataset saved to {}", path.display());
        }

        Commands::Trends { input, timeframe } => {
            if let Some(tf) = timeframe {
                config.trends.timeframe = tf;
            }
            config.validate()?;
            tracing::info!(input = %input.display(), "Starting trends command");

            let enriched = DatasetWriter::read_enriched(&input)?;
            let writer = DatasetWriter::new(&config.output);
            let pipeline = Pipeline::new(config, reporter);
            let (summaries, _, increases) =
                pipeline.run_trend_stage(&writer, &enriched).await?;

            for summary in &summaries {
                println!(
                    "{}\t{:.1}%\t{}",
                    summary.keyword, summary.percent_increase, summary.link
                );
            }
            if let Some(path) = increases {
                println!("Ranked dataset saved to {}", path.display());
            }
        }

        Commands::Run { sites, time_range } => {
            apply_overrides(&mut config, sites, time_range);
            config.validate()?;
            tracing::info!("Starting full pipeline run");

            // One background worker owns the whole run
            let outcome = Pipeline::new(config, reporter).spawn().await??;

            println!("Pages found: {}", outcome.hits.len());
            println!("Topics ranked: {}", outcome.summaries.len());
            if let Some(path) = outcome.increases_path {
                println!("Ranked dataset saved to {}", path.display());
            }
        }
    }

    tracing::info!("trendscout completed successfully");
    Ok(())
}

fn apply_overrides(config: &mut Config, sites: Option<PathBuf>, time_range: Option<String>) {
    if let Some(sites) = sites {
        config.search.sites_file = sites;
    }
    if let Some(time_range) = time_range {
        config.search.time_range = time_range;
    }
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendscout=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("trendscout=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
