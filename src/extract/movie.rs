//! Movie detail page extractor
//!
//! Field mapping:
//!
//! | Field | Source | Required |
//! |-------|--------|----------|
//! | title | text directly under `div.title_wrapper > h1` (year span excluded) | yes |
//! | summary | `div.summary_text` | no |
//! | director | `div.credit_summary_item` labelled `Director:`/`Directors:` | no |
//! | actors | `div.credit_summary_item` labelled `Star:`/`Stars:`, text before `\|` | no |
//! | genre | second-to-last `\|` part of `div.subtext` | yes |
//! | date, country | last `\|` part of `div.subtext`, `"14 October 1994 (USA)"` | yes |
//! | src | `div.poster > a > img[src]` | no |

use crate::crawler::RawContent;
use crate::extract::{collapse_whitespace, ExtractionFailure, ExtractionStage, Extractor};
use crate::record::{Record, RecordFields};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

const RELEASE_DATE_FORMAT: &str = "%d %B %Y";

/// Extracts [`Record`]s from movie detail pages
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieExtractor;

impl MovieExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for MovieExtractor {
    fn extract(&self, content: &RawContent, url: &str) -> Result<Record, ExtractionFailure> {
        let document = Html::parse_document(&content.body);
        let fail = |stage, cause: &str| ExtractionFailure::new(url, stage, cause);

        let title = extract_title(&document)
            .ok_or_else(|| fail(ExtractionStage::Title, "missing or empty title block"))?;

        let subtexts = extract_subtexts(&document);
        if subtexts.len() < 2 {
            return Err(fail(
                ExtractionStage::Subtext,
                "expected genre and release parts in subtext",
            ));
        }

        let genre = split_list(&subtexts[subtexts.len() - 2]);
        let release = &subtexts[subtexts.len() - 1];

        let (date_part, country_part) = match release.split_once('(') {
            Some((date, rest)) => (date.trim(), Some(rest)),
            None => (release.trim(), None),
        };

        let date = NaiveDate::parse_from_str(date_part, RELEASE_DATE_FORMAT).map_err(|e| {
            fail(
                ExtractionStage::Date,
                &format!("unparsable release date '{}': {}", date_part, e),
            )
        })?;

        let country = country_part
            .map(|rest| collapse_whitespace(rest.split(')').next().unwrap_or_default()))
            .filter(|c| !c.is_empty())
            .ok_or_else(|| fail(ExtractionStage::Country, "missing release country"))?;

        let (director, actors) = extract_credits(&document);

        let fields = RecordFields {
            title,
            summary: select_text(&document, "div.summary_text"),
            director,
            actors,
            genre,
            date,
            country,
            src: select_attr(&document, "div.poster > a > img", "src"),
        };

        Record::new(url, fields).map_err(|e| fail(ExtractionStage::Identifier, &e.to_string()))
    }
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn select_text(document: &Html, css: &str) -> Option<String> {
    select_first(document, css)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn select_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    select_first(document, css)
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Only the heading's own text nodes; the nested year span is skipped
fn extract_title(document: &Html) -> Option<String> {
    let heading = select_first(document, "div.title_wrapper > h1")?;
    let text: String = heading
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect();

    Some(collapse_whitespace(&text)).filter(|s| !s.is_empty())
}

fn extract_subtexts(document: &Html) -> Vec<String> {
    select_first(document, "div.subtext")
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split('|')
                .map(collapse_whitespace)
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Returns (director, actors) from the labelled credit blocks
fn extract_credits(document: &Html) -> (Option<String>, Vec<String>) {
    let mut director = None;
    let mut actors = Vec::new();

    let Ok(selector) = Selector::parse("div.credit_summary_item") else {
        return (director, actors);
    };

    for item in document.select(&selector) {
        let text = collapse_whitespace(&item.text().collect::<String>());
        let Some((label, value)) = text.split_once(':') else {
            continue;
        };

        match label.trim().to_ascii_lowercase().as_str() {
            "director" | "directors" => {
                director = Some(value.trim().to_string()).filter(|d| !d.is_empty());
            }
            "star" | "stars" => {
                actors = split_list(value.split('|').next().unwrap_or_default());
            }
            _ => {}
        }
    }

    (director, actors)
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(collapse_whitespace)
        .filter(|item| !item.is_empty())
        .collect()
}
