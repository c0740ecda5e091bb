//! Result collection
//!
//! Workers hand their [`PartialResult`] over exactly once. The [`Aggregator`]
//! concatenates them into a single [`AggregateResult`], either incrementally
//! as each worker is joined or in one batch via [`aggregate`]. Nothing is
//! deduplicated: duplicate input URLs yield duplicate records.

use crate::crawler::FetchFailure;
use crate::extract::ExtractionFailure;
use crate::record::Record;
use crate::state::FailureKind;
use std::collections::BTreeMap;
use thiserror::Error;

/// One URL that did not produce a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure for {url}: {message}")]
pub struct UrlFailure {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

impl UrlFailure {
    pub fn new(url: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::new(url, FailureKind::Cancelled, "run cancelled before this URL was started")
    }
}

impl From<FetchFailure> for UrlFailure {
    fn from(failure: FetchFailure) -> Self {
        Self::new(failure.url, FailureKind::Fetch, failure.cause.to_string())
    }
}

impl From<ExtractionFailure> for UrlFailure {
    fn from(failure: ExtractionFailure) -> Self {
        Self::new(
            failure.url,
            FailureKind::Extraction,
            format!("{}: {}", failure.stage, failure.cause),
        )
    }
}

/// One worker's output for its chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResult {
    /// Index of the chunk this result covers
    pub chunk_index: usize,

    /// Records in chunk order
    pub records: Vec<Record>,

    /// URLs of the chunk that failed, in chunk order
    pub failures: Vec<UrlFailure>,
}

impl PartialResult {
    pub fn new(chunk_index: usize) -> Self {
        Self {
            chunk_index,
            ..Self::default()
        }
    }

    /// A result for a chunk whose worker died before handing anything over
    ///
    /// Every URL of the chunk is recorded as failed so none go missing.
    pub fn worker_panicked(chunk_index: usize, urls: &[String], message: &str) -> Self {
        Self {
            chunk_index,
            records: Vec::new(),
            failures: urls
                .iter()
                .map(|url| UrlFailure::new(url, FailureKind::WorkerPanicked, message))
                .collect(),
        }
    }

    /// Number of URLs accounted for
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// The full run's merged records and failure ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub records: Vec<Record>,
    pub failures: Vec<UrlFailure>,
}

impl AggregateResult {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Records plus failures; equals the input URL count after a full run
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    /// Failure counts per kind, omitting kinds that did not occur
    pub fn failures_by_kind(&self) -> BTreeMap<FailureKind, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &UrlFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }
}

/// Incremental accumulator of partial results
#[derive(Debug, Default)]
pub struct Aggregator {
    result: AggregateResult,
    partials: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one worker's output
    pub fn absorb(&mut self, partial: PartialResult) {
        tracing::debug!(
            "Absorbing chunk {}: {} records, {} failures",
            partial.chunk_index,
            partial.records.len(),
            partial.failures.len()
        );
        self.result.records.extend(partial.records);
        self.result.failures.extend(partial.failures);
        self.partials += 1;
    }

    pub fn partials_absorbed(&self) -> usize {
        self.partials
    }

    pub fn finish(self) -> AggregateResult {
        self.result
    }
}

/// Merges all partial results in one batch
pub fn aggregate(partials: impl IntoIterator<Item = PartialResult>) -> AggregateResult {
    let mut aggregator = Aggregator::new();
    for partial in partials {
        aggregator.absorb(partial);
    }
    aggregator.finish()
}
