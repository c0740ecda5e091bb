//! Worker pool orchestration
//!
//! The [`Orchestrator`] partitions the URL list into one chunk per worker,
//! spawns a task for every non-empty chunk, and then joins the tasks in chunk
//! order. Each task's `JoinHandle` is the one-shot handoff of its
//! [`PartialResult`]; the [`Aggregator`] absorbs them as they are joined.
//! `run` returns only after every worker is `Done`.
//!
//! Because chunks are contiguous and each worker keeps chunk order, joining
//! in chunk order yields records in original URL order regardless of which
//! worker finished first.

use crate::config::validate_workers;
use crate::crawler::aggregate::{AggregateResult, Aggregator, PartialResult};
use crate::crawler::partition::partition;
use crate::crawler::worker::{panic_message, Worker};
use crate::crawler::Fetcher;
use crate::extract::Extractor;
use crate::state::WorkerState;
use crate::{ConfigError, ScrapeError};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// What happened to one worker during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Chunk index this worker owned
    pub index: usize,

    /// Number of URLs in the chunk
    pub chunk_len: usize,

    /// False for empty chunks, which never get a task
    pub spawned: bool,

    pub state: WorkerState,

    /// Records produced
    pub succeeded: usize,

    /// URLs recorded as failed
    pub failed: usize,
}

impl WorkerReport {
    fn new(index: usize, chunk_len: usize) -> Self {
        Self {
            index,
            chunk_len,
            spawned: false,
            state: WorkerState::Idle,
            succeeded: 0,
            failed: 0,
        }
    }
}

/// Output of [`Orchestrator::run`]
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub aggregate: AggregateResult,

    /// One report per chunk, in chunk order
    pub workers: Vec<WorkerReport>,
}

impl RunOutcome {
    /// Number of workers that actually got a task
    pub fn workers_spawned(&self) -> usize {
        self.workers.iter().filter(|w| w.spawned).count()
    }
}

/// Fixed-size worker pool over injected fetch and extract capabilities
pub struct Orchestrator {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    workers: usize,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator with `workers` chunks
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWorkerCount`] when `workers` is zero.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        workers: usize,
    ) -> Result<Self, ConfigError> {
        validate_workers(workers)?;
        Ok(Self {
            fetcher,
            extractor,
            workers,
            cancel: CancellationToken::new(),
        })
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops every worker before its next URL when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scrapes every URL and blocks until all workers are done
    ///
    /// Per-URL failures never fail the run; they are returned in the
    /// aggregate's failure ledger. Every input URL ends up either as a record
    /// or as a failure.
    pub async fn run(&self, urls: &[String]) -> Result<RunOutcome, ScrapeError> {
        let chunks = partition(urls, self.workers)?;

        let mut reports = Vec::with_capacity(chunks.len());
        let mut handles: Vec<(usize, Arc<[String]>, JoinHandle<PartialResult>)> = Vec::new();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let mut report = WorkerReport::new(index, chunk.len());

            if chunk.is_empty() {
                report.state.transition(WorkerState::Done)?;
                reports.push(report);
                continue;
            }

            let chunk: Arc<[String]> = Arc::from(chunk);
            let worker = Worker {
                index,
                urls: Arc::clone(&chunk),
                fetcher: Arc::clone(&self.fetcher),
                extractor: Arc::clone(&self.extractor),
                cancel: self.cancel.clone(),
            };

            let span = tracing::info_span!("worker", index);
            let handle = tokio::spawn(worker.run().instrument(span));

            report.state.transition(WorkerState::Running)?;
            report.spawned = true;
            reports.push(report);
            handles.push((index, chunk, handle));
        }

        tracing::info!(
            "Spawned {} workers for {} URLs ({} empty chunks)",
            handles.len(),
            urls.len(),
            self.workers - handles.len()
        );

        let mut aggregator = Aggregator::new();
        for (index, chunk, handle) in handles {
            let partial = match handle.await {
                Ok(partial) => partial,
                Err(e) => {
                    let message = if e.is_panic() {
                        format!("worker panicked: {}", panic_message(e.into_panic().as_ref()))
                    } else {
                        format!("worker task failed: {}", e)
                    };
                    tracing::error!("Worker {} lost its chunk of {}: {}", index, chunk.len(), message);
                    PartialResult::worker_panicked(index, &chunk, &message)
                }
            };

            let report = &mut reports[index];
            report.succeeded = partial.records.len();
            report.failed = partial.failures.len();
            report.state.transition(WorkerState::Done)?;

            aggregator.absorb(partial);
        }

        let aggregate = aggregator.finish();
        debug_assert_eq!(aggregate.attempted(), urls.len());

        tracing::info!(
            "Collected {} records, {} of {} URLs failed",
            aggregate.len(),
            aggregate.failure_count(),
            urls.len()
        );

        Ok(RunOutcome {
            aggregate,
            workers: reports,
        })
    }
}
