//! Reel-Bulk main entry point
//!
//! This is the command-line interface for the Reel-Bulk scraper.

use anyhow::Context;
use clap::Parser;
use reel_bulk::config::{read_config, validate, Config};
use reel_bulk::crawler::{crawl, discover, partition, HttpFetcher};
use reel_bulk::extract::IndexExtractor;
use reel_bulk::output::print_summary;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Reel-Bulk: scrape movie pages into a bulk-index document
///
/// Reel-Bulk reads the detail links from an index page, scrapes every detail
/// page on a fixed pool of workers, and writes the results as newline-delimited
/// action/document pairs ready for a bulk insert.
#[derive(Parser, Debug)]
#[command(name = "reel-bulk")]
#[command(version)]
#[command(about = "Scrape movie pages into a bulk-index document", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of workers (chunks) to split the URL list into
    #[arg(short = 'k', long)]
    workers: Option<usize>,

    /// Destination of the bulk document
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Index page listing the detail pages
    #[arg(long, value_name = "URL")]
    index_url: Option<String>,

    /// Stop starting new pages after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline_secs: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discover URLs and show how they would be split, without scraping them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config).await
    } else {
        handle_crawl(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reel_bulk=info,warn"),
            1 => EnvFilter::new("reel_bulk=debug,info"),
            2 => EnvFilter::new("reel_bulk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if given, then applies command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            tracing::info!("Configuration loaded (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(index_url) = &cli.index_url {
        config.crawler.index_url = index_url.clone();
    }
    if let Some(deadline) = cli.deadline_secs {
        config.crawler.deadline_secs = Some(deadline);
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: discovers URLs and prints the partition plan
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let urls = discover(&fetcher, &config.crawler.index_url, &IndexExtractor::default())
        .await
        .context("Discovery failed")?;
    let chunks = partition(&urls, config.crawler.workers)?;

    println!("=== Reel-Bulk Dry Run ===\n");
    println!("Index: {}", config.crawler.index_url);
    println!("Output: {}", config.output.path);
    println!("Detail URLs: {}", urls.len());
    println!("Workers: {}\n", config.crawler.workers);

    for (index, chunk) in chunks.iter().enumerate() {
        match (chunk.first(), chunk.last()) {
            (Some(first), Some(last)) => {
                println!("  worker {:>3}: {:>4} URLs  {} .. {}", index, chunk.len(), first, last)
            }
            _ => println!("  worker {:>3}:    0 URLs  (not spawned)", index),
        }
    }

    Ok(())
}

/// Handles the main scrape
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Scraping {} with {} workers into {}",
        config.crawler.index_url,
        config.crawler.workers,
        config.output.path
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing pages in flight");
            on_interrupt.cancel();
        }
    });

    match crawl(config, cancel).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
