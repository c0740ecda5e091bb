//! Shared fakes and fixtures

use async_trait::async_trait;
use chrono::NaiveDate;
use reel_bulk::crawler::{FetchCause, FetchFailure, Fetcher, RawContent};
use reel_bulk::extract::{ExtractionFailure, ExtractionStage, Extractor};
use reel_bulk::record::{Record, RecordFields};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Body that makes [`StubExtractor`] report a structural failure
pub const BAD_PAGE: &str = "<html>unexpected markup</html>";

/// Body that makes [`StubExtractor`] panic
pub const PANIC_PAGE: &str = "<html>panic</html>";

pub fn detail_url(id: &str) -> String {
    format!("https://movies.example.com/title/{}/", id)
}

pub fn detail_urls(n: usize) -> Vec<String> {
    (0..n).map(|i| detail_url(&format!("tt{:04}", i))).collect()
}

/// Serves pages from memory, optionally sleeping a random short time first
pub struct FakeFetcher {
    pages: HashMap<String, Result<String, FetchCause>>,
    fallback_ok: bool,
    max_delay_ms: u64,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    /// Every URL succeeds with a page titled after its identifier
    pub fn all_ok() -> Self {
        Self {
            pages: HashMap::new(),
            fallback_ok: true,
            max_delay_ms: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_random_delay(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn failing(mut self, url: &str, cause: FetchCause) -> Self {
        self.pages.insert(url.to_string(), Err(cause));
        self
    }

    pub fn serving(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    fn random_delay(&self) -> Duration {
        if self.max_delay_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..=self.max_delay_ms))
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<RawContent, FetchFailure> {
        let delay = self.random_delay();
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(url) {
            Some(Ok(body)) => Ok(RawContent::new(url, body.as_str())),
            Some(Err(cause)) => Err(FetchFailure::new(url, cause.clone())),
            None if self.fallback_ok => Ok(RawContent::new(url, format!("page for {}", url))),
            None => Err(FetchFailure::new(url, FetchCause::Status(404))),
        }
    }
}

/// Builds records straight from the body text
pub struct StubExtractor;

impl Extractor for StubExtractor {
    fn extract(&self, content: &RawContent, url: &str) -> Result<Record, ExtractionFailure> {
        if content.body == BAD_PAGE {
            return Err(ExtractionFailure::new(
                url,
                ExtractionStage::Title,
                "missing title block",
            ));
        }
        if content.body == PANIC_PAGE {
            panic!("extractor bug on {}", url);
        }

        Record::new(
            url,
            RecordFields {
                title: content.body.clone(),
                summary: None,
                director: None,
                actors: vec![],
                genre: vec!["Drama".to_string()],
                date: NaiveDate::from_ymd_opt(1999, 3, 31).unwrap(),
                country: "USA".to_string(),
                src: None,
            },
        )
        .map_err(|e| ExtractionFailure::new(url, ExtractionStage::Identifier, e.to_string()))
    }
}

pub fn identifiers(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.identifier().to_string()).collect()
}

pub fn url_set<'a>(urls: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    urls.into_iter().map(str::to_string).collect()
}

/// A detail page in the markup the movie extractor expects
pub fn movie_page(title: &str, release: &str) -> String {
    format!(
        r#"<html><body>
  <div class="poster"><a href="/media"><img src="https://img.example.com/{title}.jpg"></a></div>
  <div class="title_wrapper">
    <h1>{title}&nbsp;<span id="titleYear">(<a href="/year/">1999</a>)</span></h1>
    <div class="subtext">R | 2h 16min | Action, Sci-Fi | {release}</div>
  </div>
  <div class="summary_text">A summary of {title}.</div>
  <div class="credit_summary_item"><h4 class="inline">Directors:</h4> <a>Lana Wachowski</a>, <a>Lilly Wachowski</a></div>
  <div class="credit_summary_item"><h4 class="inline">Writers:</h4> <a>Someone</a></div>
  <div class="credit_summary_item"><h4 class="inline">Stars:</h4> <a>Keanu Reeves</a>, <a>Laurence Fishburne</a> | <a>See full cast</a></div>
</body></html>"#,
        title = title,
        release = release
    )
}

/// An index page linking to the given hrefs
pub fn index_page(hrefs: &[&str]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<tr><td class="titleColumn"><a href="{}">movie</a></td></tr>"#,
                href
            )
        })
        .collect();
    format!(
        "<html><body><table><tbody>{}</tbody></table></body></html>",
        rows
    )
}
