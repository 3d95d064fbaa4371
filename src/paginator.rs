use crate::FetchError;
use crate::fetchers::{PageFetcher, RetryPolicy, fetch_with_retry};
use crate::filter::UrlFilter;
use crate::parsers::{ListingPage, SiteParser};
use url::Url;

/// Walks the numbered listing pages of one category
#[derive(Debug)]
pub struct Paginator {
    base_url: Url,
    page_param: String,
    filter: UrlFilter,
}

impl Paginator {
    pub fn new(base_url: Url, page_param: &str, filter: UrlFilter) -> Self {
        Self {
            base_url,
            page_param: page_param.to_string(),
            filter,
        }
    }

    /// Page 1 is the bare base URL; later pages carry the page number in the query
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        if page > 1 {
            url.query_pairs_mut()
                .append_pair(&self.page_param, &page.to_string());
        }
        url
    }

    /// Fetch listing page `page` and extract its entries.
    ///
    /// `Ok(None)` means the page could not be loaded within the retry policy.
    pub async fn list_page<F: PageFetcher, P: SiteParser + ?Sized>(
        &self,
        session: &mut F,
        parser: &P,
        page: u32,
        policy: &RetryPolicy,
    ) -> Result<Option<ListingPage>, FetchError> {
        let url = self.page_url(page);
        ::log::info!("Fetching listing page {}: {}", page, url);

        let Some(document) = fetch_with_retry(session, url.as_str(), policy).await? else {
            return Ok(None);
        };

        Ok(Some(parser.listings(&document, &self.filter)))
    }
}
