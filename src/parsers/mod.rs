pub mod detail;
pub mod html;
pub mod listing;

#[cfg(test)]
mod tests;

use crate::filter::UrlFilter;
use crate::fetchers::Document;
use crate::results::Record;

/// A company entry found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub detail_url: String,
}

impl Listing {
    pub fn new(name: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail_url: detail_url.into(),
        }
    }
}

/// Entries extracted from one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Usable entries, in page order
    pub entries: Vec<Listing>,
    /// Listing blocks present on the page before any filtering.
    /// Zero means the directory has no more pages.
    pub raw_count: usize,
}

impl ListingPage {
    /// True when the page had no listing blocks at all
    pub fn is_exhausted(&self) -> bool {
        self.raw_count == 0
    }
}

/// Maps a site's page structure onto listings and records.
///
/// The crawl loop only sees this trait, so supporting another directory
/// layout means adding an implementation without touching pagination or
/// persistence.
pub trait SiteParser {
    /// Company entries on a listing page, in page order
    fn listings(&self, document: &Document, filter: &UrlFilter) -> ListingPage;

    /// Fields of a company detail page. `Name` is set by the caller.
    fn details(&self, document: &Document) -> Record;
}

/// Parser for the company directory layout (`listing-title` entries,
/// `company-address` detail tables)
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyDirectoryParser;

impl SiteParser for CompanyDirectoryParser {
    fn listings(&self, document: &Document, filter: &UrlFilter) -> ListingPage {
        listing::parse(&document.html, &document.url, filter)
    }

    fn details(&self, document: &Document) -> Record {
        detail::parse(&document.html)
    }
}
