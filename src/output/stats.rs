//! Run summary reporting
//!
//! A run succeeds even when some URLs fail, so the summary always carries the
//! failure ledger alongside the record count.

use crate::crawler::{RunOutcome, UrlFailure};
use crate::state::FailureKind;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of one completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of detail URLs the run was given
    pub urls: usize,

    /// Number of records produced
    pub records: usize,

    /// Failure counts per kind
    pub failures_by_kind: BTreeMap<FailureKind, usize>,

    /// Every failed URL, in URL order
    pub failures: Vec<UrlFailure>,

    /// Chunks that got a worker task
    pub workers_spawned: usize,

    /// Chunks the URL list was split into
    pub workers: usize,

    /// Wall-clock time of the run
    pub elapsed: Duration,

    /// Where the bulk document was written
    pub output: Option<PathBuf>,
}

impl RunSummary {
    pub fn new(outcome: &RunOutcome, elapsed: Duration) -> Self {
        let aggregate = &outcome.aggregate;
        Self {
            urls: aggregate.attempted(),
            records: aggregate.len(),
            failures_by_kind: aggregate.failures_by_kind(),
            failures: aggregate.failures.clone(),
            workers_spawned: outcome.workers_spawned(),
            workers: outcome.workers.len(),
            elapsed,
            output: None,
        }
    }

    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.urls == 0 {
            return 0.0;
        }
        (self.records as f64 / self.urls as f64) * 100.0
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("{}", summary.records);
    println!("took {:.2?}", summary.elapsed);

    println!(
        "{} of {} URLs failed ({:.1}% succeeded, {} of {} workers spawned)",
        summary.failure_count(),
        summary.urls,
        summary.success_rate(),
        summary.workers_spawned,
        summary.workers
    );

    for (kind, count) in &summary.failures_by_kind {
        println!("  {}: {}", kind, count);
    }

    for failure in &summary.failures {
        println!("  - [{}] {}: {}", failure.kind, failure.url, failure.message);
    }

    if let Some(path) = &summary.output {
        println!("Bulk document written to {}", path.display());
    }
}
