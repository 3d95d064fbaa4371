use crate::filter::UrlFilter;
use crate::parsers::{Listing, ListingPage};
use crate::parsers::html::{element_text, first, href, selector};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static LISTING_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("div.listing-title"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));

/// Extracts `(name, detail URL)` entries from a listing page.
///
/// Links are resolved against `page_url`; entries without a name, without a
/// usable link, or rejected by `filter` are dropped. A name repeated on the
/// same page is kept once. The raw count of listing blocks is reported
/// separately so a fully filtered page is not mistaken for the last one.
pub fn parse(html: &str, page_url: &str, filter: &UrlFilter) -> ListingPage {
    let doc = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let mut seen = HashSet::new();
    let mut listings = Vec::new();
    let mut raw_count = 0;

    for title in doc.select(&LISTING_TITLE) {
        raw_count += 1;
        let Some(link) = first(title, &ANCHOR) else {
            continue;
        };

        let name = element_text(link);
        if name.is_empty() {
            ::log::debug!("Skipping listing without a name on {}", page_url);
            continue;
        }

        let Some(raw) = href(link) else {
            ::log::debug!("Skipping listing {} without a link", name);
            continue;
        };
        let resolved = match &base {
            Some(base) => base.join(&raw),
            None => Url::parse(&raw),
        };
        let resolved = match resolved {
            Ok(url) => url,
            Err(e) => {
                ::log::debug!("Skipping listing {} with bad link {}: {}", name, raw, e);
                continue;
            }
        };

        if !filter.accepts(&resolved) {
            ::log::debug!("URL filter rejected: {}", resolved);
            continue;
        }

        if !seen.insert(name.clone()) {
            continue;
        }

        let detail_url = filter.normalize_url(&resolved).to_string();
        listings.push(Listing { name, detail_url });
    }

    ::log::debug!(
        "Found {} usable of {} listings on {}",
        listings.len(),
        raw_count,
        page_url
    );
    ListingPage {
        entries: listings,
        raw_count,
    }
}
