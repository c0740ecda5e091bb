//! Crawler module: the fetch-partition-aggregate pipeline
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching behind the [`Fetcher`] seam
//! - Discovery of detail URLs from the index page
//! - Partitioning the URL list into one chunk per worker
//! - The worker pool and aggregation of partial results

mod aggregate;
mod coordinator;
mod discovery;
mod fetcher;
mod partition;
mod worker;

pub use aggregate::{aggregate, AggregateResult, Aggregator, PartialResult, UrlFailure};
pub use coordinator::{Orchestrator, RunOutcome, WorkerReport};
pub use discovery::discover;
pub use fetcher::{
    build_http_client, FetchCause, FetchFailure, Fetcher, HttpFetcher, RawContent,
};
pub use partition::partition;

use crate::config::Config;
use crate::extract::{IndexExtractor, MovieExtractor};
use crate::output::{BulkWriter, RunSummary};
use crate::ScrapeError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Runs a complete scrape
///
/// This is the main entry point. It will:
/// 1. Build the HTTP client
/// 2. Discover detail URLs from the index page
/// 3. Scrape them on the worker pool
/// 4. Write the bulk document
///
/// Cancelling `cancel` (or reaching the configured deadline) stops workers
/// before their next URL; whatever was collected is still written.
///
/// # Example
///
/// ```no_run
/// use reel_bulk::config::Config;
/// use reel_bulk::crawler::crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = crawl(&Config::default(), CancellationToken::new()).await?;
/// println!("{} records", summary.records);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, cancel: CancellationToken) -> Result<RunSummary, ScrapeError> {
    let start = Instant::now();

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.http)?);
    let urls = discover(
        fetcher.as_ref(),
        &config.crawler.index_url,
        &IndexExtractor::default(),
    )
    .await?;

    let orchestrator = Orchestrator::new(
        fetcher,
        Arc::new(MovieExtractor::new()),
        config.crawler.workers,
    )?
    .with_cancellation(cancel.clone());

    let deadline = config.crawler.deadline_secs.map(|secs| {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!("Deadline of {}s reached, stopping workers", secs);
            token.cancel();
        })
    });

    let outcome = orchestrator.run(&urls).await;
    if let Some(timer) = deadline {
        timer.abort();
    }
    let outcome = outcome?;

    let path = PathBuf::from(&config.output.path);
    BulkWriter::new(&path)
        .with_retries(config.output.write_retries)
        .write(&outcome.aggregate.records)?;

    Ok(RunSummary::new(&outcome, start.elapsed()).with_output(path))
}
