//! Page extraction
//!
//! This module turns raw page content into structured data:
//! - [`Extractor`]: the seam the worker pool calls for every detail page
//! - [`MovieExtractor`]: detail-page extractor producing [`Record`]s
//! - [`IndexExtractor`]: selects detail-page links on the index page

mod index;
mod movie;

pub use index::{IndexExtractor, DEFAULT_INDEX_SELECTOR};
pub use movie::MovieExtractor;

use crate::crawler::RawContent;
use crate::record::Record;
use std::fmt;
use thiserror::Error;

/// Point in extraction where a page stopped matching the expected structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStage {
    /// A selector could not be built
    Parse,
    Title,
    Subtext,
    Date,
    Country,
    Identifier,
}

impl ExtractionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Title => "title",
            Self::Subtext => "subtext",
            Self::Date => "date",
            Self::Country => "country",
            Self::Identifier => "identifier",
        }
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page whose structure deviated from the expected schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("extraction failed for {url} at {stage}: {cause}")]
pub struct ExtractionFailure {
    pub url: String,
    pub stage: ExtractionStage,
    pub cause: String,
}

impl ExtractionFailure {
    pub fn new(url: impl Into<String>, stage: ExtractionStage, cause: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stage,
            cause: cause.into(),
        }
    }
}

/// Produces a [`Record`] from the raw content of one detail page
///
/// Extraction is synchronous and must be a pure function of its input;
/// workers call it between fetches.
pub trait Extractor: Send + Sync {
    fn extract(&self, content: &RawContent, url: &str) -> Result<Record, ExtractionFailure>;
}

/// Collapses runs of whitespace (including non-breaking spaces) to one space
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
