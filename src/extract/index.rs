//! Index page link selection
//!
//! Discovery fetches a single index page and picks the detail-page links out
//! of it. Links are resolved against the index URL and filtered:
//!
//! **Exclude:**
//! - `javascript:`, `mailto:`, `tel:`, `data:` hrefs
//! - Fragment-only hrefs (same page anchors)
//! - Anything that is not HTTP(S) after resolution

use crate::extract::{ExtractionFailure, ExtractionStage};
use scraper::{Html, Selector};
use url::Url;

/// Detail links in the chart table of the index page
pub const DEFAULT_INDEX_SELECTOR: &str = "tbody > tr > td.titleColumn > a[href]";

/// Selects detail-page URLs from index page HTML
#[derive(Debug, Clone)]
pub struct IndexExtractor {
    selector: String,
}

impl Default for IndexExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_SELECTOR)
    }
}

impl IndexExtractor {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// Returns absolute detail URLs in document order
    ///
    /// Duplicates are kept; the pipeline does not deduplicate.
    ///
    /// # Example
    ///
    /// ```
    /// use reel_bulk::extract::IndexExtractor;
    /// use url::Url;
    ///
    /// let html = r#"<table><tbody><tr><td class="titleColumn"><a href="/title/tt1/">One</a></td></tr></tbody></table>"#;
    /// let base = Url::parse("https://example.com/chart/top/").unwrap();
    /// let urls = IndexExtractor::default().extract_urls(html, &base).unwrap();
    /// assert_eq!(urls, vec!["https://example.com/title/tt1/".to_string()]);
    /// ```
    pub fn extract_urls(&self, html: &str, base_url: &Url) -> Result<Vec<String>, ExtractionFailure> {
        let selector = Selector::parse(&self.selector).map_err(|e| {
            ExtractionFailure::new(
                base_url.as_str(),
                ExtractionStage::Parse,
                format!("invalid index selector '{}': {}", self.selector, e),
            )
        })?;

        let document = Html::parse_document(html);

        Ok(document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, base_url))
            .collect())
    }
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
