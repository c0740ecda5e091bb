//! Structured result of extracting one detail page
//!
//! A [`Record`] always carries a document identifier derived from its source
//! URL. The identifier is fixed at construction, so the URL is not publicly
//! mutable.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Raised when no identifier can be derived from a URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot derive a document identifier from {url}")]
pub struct MissingIdentifier {
    pub url: String,
}

/// Extracted fields of a detail page, before they are bound to a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub title: String,
    pub summary: Option<String>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub genre: Vec<String>,
    pub date: NaiveDate,
    pub country: String,
    pub src: Option<String>,
}

/// One extracted movie page
///
/// Serializes to the document line of the bulk format. Field order follows
/// the document schema: title, summary, director, actors, genre, date,
/// country, src, url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(skip)]
    id: String,
    pub title: String,
    pub summary: Option<String>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub genre: Vec<String>,
    pub date: NaiveDate,
    pub country: String,
    pub src: Option<String>,
    url: String,
}

impl Record {
    /// Binds extracted fields to their source URL
    ///
    /// Fails if the URL has no usable path segment to act as identifier.
    pub fn new(url: &str, fields: RecordFields) -> Result<Self, MissingIdentifier> {
        let id = identifier_from_url(url).ok_or_else(|| MissingIdentifier {
            url: url.to_string(),
        })?;

        Ok(Self {
            id,
            title: fields.title,
            summary: fields.summary,
            director: fields.director,
            actors: fields.actors,
            genre: fields.genre,
            date: fields.date,
            country: fields.country,
            src: fields.src,
            url: url.to_string(),
        })
    }

    /// Stable document key used by the bulk writer
    pub fn identifier(&self) -> &str {
        &self.id
    }

    /// The page this record was extracted from
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Derives a document identifier from a detail URL
///
/// Uses the last non-empty path segment, so
/// `https://www.imdb.com/title/tt0111161/` yields `tt0111161`. Query strings
/// and fragments are ignored.
pub fn identifier_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
