//! A single worker of the pool
//!
//! A worker walks its chunk sequentially: fetch, then extract, one URL at a
//! time. Failures are recorded and skipped, never retried here and never
//! allowed to end the loop early. Cancellation is only observed between URLs.

use crate::crawler::aggregate::{PartialResult, UrlFailure};
use crate::crawler::{Fetcher, RawContent};
use crate::extract::{ExtractionFailure, ExtractionStage, Extractor};
use crate::record::Record;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(crate) struct Worker {
    pub index: usize,
    pub urls: Arc<[String]>,
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn Extractor>,
    pub cancel: CancellationToken,
}

impl Worker {
    pub async fn run(self) -> PartialResult {
        let mut partial = PartialResult::new(self.index);
        tracing::debug!("Worker {} starting on {} URLs", self.index, self.urls.len());

        for (position, url) in self.urls.iter().enumerate() {
            if self.cancel.is_cancelled() {
                let remaining = &self.urls[position..];
                tracing::info!(
                    "Worker {} cancelled with {} URLs left",
                    self.index,
                    remaining.len()
                );
                partial
                    .failures
                    .extend(remaining.iter().map(UrlFailure::cancelled));
                break;
            }

            let content = match self.fetcher.fetch(url).await {
                Ok(content) => content,
                Err(failure) => {
                    tracing::warn!("{}", failure);
                    partial.failures.push(failure.into());
                    continue;
                }
            };

            match self.extract(&content, url) {
                Ok(record) => {
                    tracing::debug!("Extracted {} ({})", record.identifier(), record.title);
                    partial.records.push(record);
                }
                Err(failure) => {
                    tracing::warn!("{}", failure);
                    partial.failures.push(failure);
                }
            }
        }

        tracing::debug!(
            "Worker {} done: {} records, {} failures",
            self.index,
            partial.records.len(),
            partial.failures.len()
        );
        partial
    }

    /// Runs the extractor, turning a panic into a per-URL failure
    fn extract(&self, content: &RawContent, url: &str) -> Result<Record, UrlFailure> {
        match catch_unwind(AssertUnwindSafe(|| self.extractor.extract(content, url))) {
            Ok(result) => result.map_err(UrlFailure::from),
            Err(payload) => Err(ExtractionFailure::new(
                url,
                ExtractionStage::Parse,
                format!("extractor panicked: {}", panic_message(payload.as_ref())),
            )
            .into()),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
