//! `bookscout` command line entry point.
//!
//! Credentials come from `OPENAI_API_KEY` and `TAVILY_API_KEY` (a `.env`
//! file is honoured). Every flag is optional.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookscout::{
    HarvestConfig, Harvester, HttpIngestor, JsonFileSink, OpenAI, TavilyWebSearcher,
};

#[derive(Parser)]
#[command(name = "bookscout")]
#[command(about = "Find technical books on the web and save them to a JSON catalog")]
struct Cli {
    /// Where to write the catalog (default: books.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Documents per extraction call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Maximum number of batch loop iterations
    #[arg(long)]
    iteration_limit: Option<usize>,

    /// Skip the enrichment call after the batch loop
    #[arg(long)]
    no_enrichment: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Harvest failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "info,bookscout=debug",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = HarvestConfig::from_env().context("Failed to load configuration")?;

    if let Some(output) = cli.output {
        config = config.with_output_path(output);
    }
    if let Some(batch_size) = cli.batch_size {
        config = config.with_batch_size(batch_size);
    }
    if let Some(limit) = cli.iteration_limit {
        config = config.with_iteration_limit(limit);
    }
    if cli.no_enrichment {
        config = config.with_enrichment(false);
    }

    config.validate().context("Invalid configuration")?;

    let ai = OpenAI::from_config(&config)?;
    let searcher = TavilyWebSearcher::with_secret(config.tavily_api_key.clone())?;
    let ingestor = HttpIngestor::new().context("Failed to build HTTP client")?;
    let sink = JsonFileSink::new(&config.output_path);

    info!(
        output = %config.output_path.display(),
        batch_size = config.batch.batch_size,
        enrichment = config.batch.enrichment,
        "Starting harvest"
    );

    let harvester = Harvester::new(config, ai, searcher, ingestor, sink);
    let report = harvester.run().await?;

    println!(
        "Saved {} books to {} ({} documents, {} batches, {} duplicates removed)",
        report.books.len(),
        report.saved.location,
        report.documents,
        report.batches_processed,
        report.duplicates_removed,
    );

    Ok(())
}
