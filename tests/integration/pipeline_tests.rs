//! Worker pool behaviour against in-memory collaborators

use crate::common::{
    detail_url, detail_urls, identifiers, url_set, FakeFetcher, StubExtractor, BAD_PAGE,
    PANIC_PAGE,
};
use async_trait::async_trait;
use reel_bulk::crawler::{FetchCause, FetchFailure, Fetcher, Orchestrator, RawContent};
use reel_bulk::output::RunSummary;
use reel_bulk::state::{FailureKind, WorkerState};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn orchestrator(fetcher: impl Fetcher + 'static, workers: usize) -> Orchestrator {
    Orchestrator::new(Arc::new(fetcher), Arc::new(StubExtractor), workers).unwrap()
}

#[tokio::test]
async fn test_more_workers_than_urls() {
    let urls = detail_urls(3);
    let fetcher = Arc::new(FakeFetcher::all_ok());
    let outcome = Orchestrator::new(fetcher.clone(), Arc::new(StubExtractor), 8)
        .unwrap()
        .run(&urls)
        .await
        .unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.aggregate.len(), 3);
    assert_eq!(outcome.aggregate.failure_count(), 0);
    assert_eq!(outcome.workers.len(), 8);
    assert_eq!(outcome.workers_spawned(), 3);

    for report in &outcome.workers[..3] {
        assert!(report.spawned);
        assert_eq!(report.chunk_len, 1);
        assert_eq!(report.succeeded, 1);
    }
    for report in &outcome.workers[3..] {
        assert!(!report.spawned);
        assert_eq!(report.chunk_len, 0);
    }
    assert!(outcome.workers.iter().all(|w| w.state == WorkerState::Done));
}

#[tokio::test]
async fn test_every_url_is_accounted_for() {
    let urls = detail_urls(37);
    for workers in [1, 2, 3, 5, 8, 16, 37, 50] {
        let fetcher = FakeFetcher::all_ok()
            .failing(&urls[0], FetchCause::Status(500))
            .failing(&urls[10], FetchCause::Timeout)
            .serving(&urls[11], BAD_PAGE)
            .serving(&urls[36], BAD_PAGE);

        let outcome = orchestrator(fetcher, workers).run(&urls).await.unwrap();
        let aggregate = &outcome.aggregate;

        assert_eq!(aggregate.len() + aggregate.failure_count(), urls.len(), "workers={}", workers);
        assert_eq!(aggregate.len(), 33, "workers={}", workers);

        let by_kind = aggregate.failures_by_kind();
        assert_eq!(by_kind.get(&FailureKind::Fetch), Some(&2));
        assert_eq!(by_kind.get(&FailureKind::Extraction), Some(&2));

        let seen: HashSet<String> = aggregate
            .records
            .iter()
            .map(|r| r.url().to_string())
            .chain(aggregate.failures.iter().map(|f| f.url.clone()))
            .collect();
        assert_eq!(seen, url_set(urls.iter().map(String::as_str)));
    }
}

#[tokio::test]
async fn test_extraction_failure_is_isolated() {
    // Two chunks of three; the middle URL of the first chunk is broken
    let urls = detail_urls(6);
    let fetcher = FakeFetcher::all_ok().serving(&urls[1], BAD_PAGE);

    let outcome = orchestrator(fetcher, 2).run(&urls).await.unwrap();

    assert_eq!(outcome.aggregate.len(), 5);
    assert_eq!(outcome.aggregate.failure_count(), 1);

    let failure = &outcome.aggregate.failures[0];
    assert_eq!(failure.url, urls[1]);
    assert_eq!(failure.kind, FailureKind::Extraction);
    assert_eq!(failure.message, "title: missing title block");

    // Siblings in the same chunk still succeeded
    let succeeded = url_set(outcome.aggregate.records.iter().map(|r| r.url()));
    assert!(succeeded.contains(&urls[0]));
    assert!(succeeded.contains(&urls[2]));

    assert_eq!(outcome.workers[0].succeeded, 2);
    assert_eq!(outcome.workers[0].failed, 1);
    assert_eq!(outcome.workers[1].succeeded, 3);
}

#[tokio::test]
async fn test_fetch_failure_is_isolated() {
    let urls = detail_urls(4);
    let fetcher = FakeFetcher::all_ok().failing(&urls[0], FetchCause::Status(404));

    let outcome = orchestrator(fetcher, 1).run(&urls).await.unwrap();

    assert_eq!(outcome.aggregate.len(), 3);
    let failure = &outcome.aggregate.failures[0];
    assert_eq!(failure.kind, FailureKind::Fetch);
    assert_eq!(failure.message, "HTTP status 404");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_runs_have_identical_membership() {
    let urls = detail_urls(40);
    let fetcher = FakeFetcher::all_ok()
        .with_random_delay(5)
        .serving(&urls[7], BAD_PAGE)
        .failing(&urls[23], FetchCause::Status(503));
    let orchestrator = orchestrator(fetcher, 6);

    let first = orchestrator.run(&urls).await.unwrap().aggregate;
    let second = orchestrator.run(&urls).await.unwrap().aggregate;

    let mut first_records = first.records.clone();
    let mut second_records = second.records.clone();
    first_records.sort_by(|a, b| a.identifier().cmp(b.identifier()));
    second_records.sort_by(|a, b| a.identifier().cmp(b.identifier()));
    assert_eq!(first_records, second_records);

    assert_eq!(first.failures, second.failures);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_records_follow_url_order() {
    // Joining workers in chunk order keeps the input order even when later
    // chunks finish first.
    let urls = detail_urls(20);
    let fetcher = FakeFetcher::all_ok().with_random_delay(10);

    let outcome = orchestrator(fetcher, 4).run(&urls).await.unwrap();

    let expected: Vec<String> = (0..20).map(|i| format!("tt{:04}", i)).collect();
    assert_eq!(identifiers(&outcome.aggregate.records), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sixteen_workers_under_stress() {
    let urls = detail_urls(16);
    let orchestrator = orchestrator(FakeFetcher::all_ok().with_random_delay(3), 16);

    for round in 0..25 {
        let outcome = orchestrator.run(&urls).await.unwrap();
        let aggregate = &outcome.aggregate;

        assert_eq!(aggregate.len(), 16, "round {}", round);
        assert_eq!(aggregate.failure_count(), 0, "round {}", round);
        assert_eq!(outcome.workers_spawned(), 16, "round {}", round);

        let unique: HashSet<String> = identifiers(&aggregate.records).into_iter().collect();
        assert_eq!(unique.len(), 16, "round {}", round);
    }
}

#[tokio::test]
async fn test_duplicate_urls_yield_duplicate_records() {
    let url = detail_url("tt0111161");
    let urls = vec![url.clone(), url.clone(), url];

    let outcome = orchestrator(FakeFetcher::all_ok(), 2).run(&urls).await.unwrap();

    assert_eq!(outcome.aggregate.len(), 3);
    assert!(outcome
        .aggregate
        .records
        .iter()
        .all(|r| r.identifier() == "tt0111161"));
}

#[tokio::test]
async fn test_panicking_extractor_only_loses_one_url() {
    let urls = detail_urls(5);
    let fetcher = FakeFetcher::all_ok().serving(&urls[2], PANIC_PAGE);

    let outcome = orchestrator(fetcher, 1).run(&urls).await.unwrap();

    assert_eq!(outcome.aggregate.len(), 4);
    let failure = &outcome.aggregate.failures[0];
    assert_eq!(failure.url, urls[2]);
    assert_eq!(failure.kind, FailureKind::Extraction);
    assert!(failure.message.contains("extractor panicked"));
}

/// Panics on one URL, serves the rest
struct PanickingFetcher {
    poisoned: String,
}

#[async_trait]
impl Fetcher for PanickingFetcher {
    async fn fetch(&self, url: &str) -> Result<RawContent, FetchFailure> {
        if url == self.poisoned {
            panic!("fetcher bug");
        }
        Ok(RawContent::new(url, "ok"))
    }
}

#[tokio::test]
async fn test_panicking_worker_loses_only_its_chunk() {
    let urls = detail_urls(6);
    let fetcher = PanickingFetcher {
        poisoned: urls[4].clone(),
    };

    let outcome = orchestrator(fetcher, 3).run(&urls).await.unwrap();
    let aggregate = &outcome.aggregate;

    // Chunk 2 ([4], [5]) is lost as a whole, chunks 0 and 1 survive
    assert_eq!(aggregate.len(), 4);
    assert_eq!(aggregate.attempted(), 6);

    let lost: Vec<&str> = aggregate
        .failures_of(FailureKind::WorkerPanicked)
        .map(|f| f.url.as_str())
        .collect();
    assert_eq!(lost, vec![urls[4].as_str(), urls[5].as_str()]);
    assert!(aggregate.failures[0].message.contains("fetcher bug"));

    assert_eq!(outcome.workers[2].state, WorkerState::Done);
    assert_eq!(outcome.workers[2].failed, 2);
}

/// Cancels the run while serving a given URL
struct CancellingFetcher {
    trigger: String,
    token: CancellationToken,
    calls: AtomicUsize,
}

#[async_trait]
impl Fetcher for CancellingFetcher {
    async fn fetch(&self, url: &str) -> Result<RawContent, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url == self.trigger {
            self.token.cancel();
        }
        Ok(RawContent::new(url, "ok"))
    }
}

#[tokio::test]
async fn test_cancellation_between_urls() {
    let urls = detail_urls(5);
    let token = CancellationToken::new();
    let fetcher = Arc::new(CancellingFetcher {
        trigger: urls[1].clone(),
        token: token.clone(),
        calls: AtomicUsize::new(0),
    });

    let orchestrator = Orchestrator::new(fetcher.clone(), Arc::new(StubExtractor), 1)
        .unwrap()
        .with_cancellation(token);
    let outcome = orchestrator.run(&urls).await.unwrap();

    // The fetch in flight when cancellation arrived still completes
    assert_eq!(identifiers(&outcome.aggregate.records), vec!["tt0000", "tt0001"]);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);

    let cancelled: Vec<&str> = outcome
        .aggregate
        .failures_of(FailureKind::Cancelled)
        .map(|f| f.url.as_str())
        .collect();
    assert_eq!(cancelled, vec![urls[2].as_str(), urls[3].as_str(), urls[4].as_str()]);
}

#[tokio::test]
async fn test_summary_reports_failures() {
    let urls = detail_urls(10);
    let fetcher = FakeFetcher::all_ok()
        .serving(&urls[3], BAD_PAGE)
        .failing(&urls[8], FetchCause::Timeout);

    let outcome = orchestrator(fetcher, 4).run(&urls).await.unwrap();
    let summary = RunSummary::new(&outcome, Duration::from_secs(1));

    assert_eq!(summary.urls, 10);
    assert_eq!(summary.records, 8);
    assert_eq!(summary.failure_count(), 2);
    assert_eq!(summary.workers, 4);
    assert!((summary.success_rate() - 80.0).abs() < 0.01);
}
