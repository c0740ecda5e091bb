//! Discovery of the detail-page URL list
//!
//! The list comes from a single index page. Failing to fetch that page is
//! fatal: without the list no partial run is possible.

use crate::crawler::Fetcher;
use crate::extract::IndexExtractor;
use crate::{ConfigError, ScrapeError};
use url::Url;

/// Fetches the index page and returns its detail URLs in page order
///
/// # Errors
///
/// * [`ScrapeError::Config`] - `index_url` is not an absolute URL
/// * [`ScrapeError::Discovery`] - the index page could not be fetched
/// * [`ScrapeError::IndexExtraction`] - the index selector is invalid
pub async fn discover(
    fetcher: &dyn Fetcher,
    index_url: &str,
    extractor: &IndexExtractor,
) -> Result<Vec<String>, ScrapeError> {
    let base_url = Url::parse(index_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid index URL '{}': {}", index_url, e))
    })?;

    tracing::info!("Fetching index page {}", index_url);
    let content = fetcher.fetch(index_url).await?;

    // Relative links resolve against wherever redirects ended up
    let base_url = Url::parse(&content.final_url).unwrap_or(base_url);
    let urls = extractor.extract_urls(&content.body, &base_url)?;

    if urls.is_empty() {
        tracing::warn!("Index page {} listed no detail pages", index_url);
    } else {
        tracing::info!("Discovered {} detail URLs", urls.len());
    }

    Ok(urls)
}
