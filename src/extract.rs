use crate::config::SelectorConfig;
use crate::{ArticleRecord, Result, ScraperError};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Why a single teaser item was skipped.
#[derive(Error, Debug, PartialEq)]
pub enum ItemError {
    #[error("no link element")]
    MissingAnchor,
    #[error("link has no href")]
    MissingHref,
    #[error("link href could not be resolved: {0}")]
    InvalidHref(#[from] url::ParseError),
    #[error("no title element")]
    MissingTitle,
    #[error("no time element")]
    MissingTime,
}

/// The `ArticleExtractor` struct turns a search listing into article records.
/// It uses CSS selectors to find the teaser items and the fields inside each one.
pub struct ArticleExtractor {
    /// The origin relative links are resolved against.
    base_url: Url,
    items: Selector,
    anchor: Selector,
    title: Selector,
    time: Selector,
    image: Selector,
}

impl ArticleExtractor {
    /// Creates a new `ArticleExtractor` with the given base origin and selectors.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The origin relative links are resolved against.
    /// * `selectors` - The CSS selectors for the item list and each field.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ArticleExtractor`, or an error if the URL or a selector is invalid.
    pub fn new(base_url: &str, selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            items: parse_selector(&selectors.items)?,
            anchor: parse_selector(&selectors.anchor)?,
            title: parse_selector(&selectors.title)?,
            time: parse_selector(&selectors.time)?,
            image: parse_selector(&selectors.image)?,
        })
    }

    /// Extracts up to `limit` article records from the given HTML string.
    ///
    /// Items past `limit` are never looked at. An item with a missing link, title or time
    /// is logged and skipped; the rest keep their document order.
    #[instrument(skip(self, html), fields(html_length = html.len()))]
    pub fn extract(&self, html: &str, limit: usize) -> Vec<ArticleRecord> {
        let document = Html::parse_document(html);

        let records: Vec<ArticleRecord> = document
            .select(&self.items)
            .take(limit)
            .enumerate()
            .filter_map(|(index, item)| match self.extract_item(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Error parsing article");
                    None
                }
            })
            .collect();

        debug!(count = records.len(), limit, "Extracted articles");
        records
    }

    /// Extracts a single record from one teaser item.
    ///
    /// # Arguments
    ///
    /// * `item` - The teaser element.
    ///
    /// # Returns
    ///
    /// The record, or the reason the item cannot produce one. A missing image is not a failure.
    pub fn extract_item(&self, item: ElementRef) -> std::result::Result<ArticleRecord, ItemError> {
        let href = item
            .select(&self.anchor)
            .next()
            .ok_or(ItemError::MissingAnchor)?
            .value()
            .attr("href")
            .ok_or(ItemError::MissingHref)?;
        let url = self.base_url.join(href)?;

        let title = first_text(item, &self.title).ok_or(ItemError::MissingTitle)?;
        let time = first_text(item, &self.time).ok_or(ItemError::MissingTime)?;

        let image = item
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        Ok(ArticleRecord {
            title,
            url: url.to_string(),
            time,
            image,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScraperError::SelectorError(format!("{}: {}", selector, e)))
}

/// The text of the first match, or `None` when nothing matches.
///
/// Runs of whitespace, including the newlines and indentation the site puts inside
/// headlines, are collapsed to a single space before trimming. An element with no text
/// yields an empty string.
fn first_text(item: ElementRef, selector: &Selector) -> Option<String> {
    let element = item.select(selector).next()?;
    Some(
        element
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" "),
    )
}
