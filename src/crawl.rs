//! Crawl loop and restart supervisor.
//!
//! A pass walks listing pages from page 1 until a page fails to load or has no
//! listing blocks at all, scraping every company whose name is not stored yet. The
//! supervisor in [`Crawler::run`] restarts a pass after a transient failure,
//! up to `max_restarts` times; the store is what makes restarts cheap, since
//! known names are skipped without a fetch.

use crate::config::CrawlConfig;
use crate::fetchers::{
    PageFetcher, RetryPolicy, SessionProvider, WebDriverProvider, fetch_with_retry,
};
use crate::paginator::Paginator;
use crate::parsers::{CompanyDirectoryParser, Listing, SiteParser};
use crate::results::{NAME_FIELD, Record};
use crate::store::DedupStore;
use crate::utils::pause;
use crate::{CrawlError, FetchError, Result};

/// Counters for one invocation of [`Crawler::run`], across restarts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Listing pages that had listing blocks
    pub pages: u32,
    /// New records appended to the store
    pub scraped: u32,
    /// Listings skipped because their name was already stored
    pub skipped: u32,
    /// Detail pages that could not be loaded
    pub failed: u32,
    pub restarts: u32,
}

/// Drives a crawl through sessions opened by `S`
pub struct Crawler<S: SessionProvider> {
    config: CrawlConfig,
    provider: S,
    parser: Box<dyn SiteParser>,
}

impl<S: SessionProvider> Crawler<S> {
    pub fn new(config: CrawlConfig, provider: S) -> Self {
        Self {
            config,
            provider,
            parser: Box::new(CompanyDirectoryParser),
        }
    }

    /// Use a different page layout mapping
    pub fn with_parser(mut self, parser: impl SiteParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Run the crawl to completion, restarting after transient failures
    pub async fn run(&self) -> Result<CrawlSummary> {
        self.config.validate()?;

        let paginator = Paginator::new(
            self.config.parsed_base_url()?,
            &self.config.page_param,
            self.config.url_filter()?,
        );
        let mut store = DedupStore::load(&self.config.output_path)?;
        let mut summary = CrawlSummary::default();

        loop {
            match self.pass(&paginator, &mut store, &mut summary).await {
                Ok(()) => break,
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    if summary.restarts >= self.config.max_restarts {
                        ::log::error!(
                            "Crawl failed after {} restarts: {}",
                            summary.restarts,
                            e
                        );
                        return Err(CrawlError::RestartsExhausted {
                            restarts: summary.restarts,
                            last: Box::new(e),
                        });
                    }

                    summary.restarts += 1;
                    ::log::warn!(
                        "An error occurred: {}. Restarting from page 1 in {} seconds (restart {}/{})",
                        e,
                        self.config.restart_cooldown_secs,
                        summary.restarts,
                        self.config.max_restarts
                    );
                    tokio::time::sleep(self.config.restart_cooldown()).await;
                }
            }
        }

        ::log::info!(
            "Crawl completed: {} pages, {} new records, {} skipped, {} failed, {} restarts. {} records in {}",
            summary.pages,
            summary.scraped,
            summary.skipped,
            summary.failed,
            summary.restarts,
            store.len(),
            store.path().display()
        );
        Ok(summary)
    }

    /// One walk from page 1 on a fresh session; the session is released however the walk ends
    async fn pass(
        &self,
        paginator: &Paginator,
        store: &mut DedupStore,
        summary: &mut CrawlSummary,
    ) -> Result<()> {
        let mut session = self.provider.connect().await?;
        let result = self.walk(&mut session, paginator, store, summary).await;
        session.close().await;
        result
    }

    async fn walk(
        &self,
        session: &mut S::Session,
        paginator: &Paginator,
        store: &mut DedupStore,
        summary: &mut CrawlSummary,
    ) -> Result<()> {
        let policy = self.config.retry_policy();
        let mut page = 1;

        loop {
            if let Some(max_pages) = self.config.max_pages {
                if page > max_pages {
                    ::log::info!("Reached the page limit ({}). Ending crawl.", max_pages);
                    return Ok(());
                }
            }

            let listing_page = match paginator
                .list_page(session, self.parser.as_ref(), page, &policy)
                .await?
            {
                None => {
                    ::log::info!("Failed to fetch page {}. Ending crawl.", page);
                    return Ok(());
                }
                Some(listing_page) if listing_page.is_exhausted() => {
                    ::log::info!("No listings found on page {}. Ending crawl.", page);
                    return Ok(());
                }
                Some(listing_page) => listing_page,
            };
            summary.pages += 1;

            if listing_page.entries.is_empty() {
                ::log::warn!(
                    "All {} listings on page {} were filtered out",
                    listing_page.raw_count,
                    page
                );
            }

            for listing in &listing_page.entries {
                if store.contains(&listing.name) {
                    ::log::debug!("Skipping {} - already scraped.", listing.name);
                    summary.skipped += 1;
                    continue;
                }

                ::log::info!("Scraping {}...", listing.name);
                match self.scrape(session, listing, &policy).await? {
                    Some(record) => {
                        if store.append(record)? {
                            summary.scraped += 1;
                        }
                    }
                    None => {
                        ::log::warn!("Failed to scrape details for {}", listing.name);
                        summary.failed += 1;
                    }
                }

                pause(&self.config.item_delay, "politeness delay").await;
            }

            page += 1;
            ::log::info!("Moving to page {}", page);
            pause(&self.config.page_delay, "page delay").await;
        }
    }

    /// Load and extract one detail page. `Ok(None)` when the page could not be loaded.
    async fn scrape(
        &self,
        session: &mut S::Session,
        listing: &Listing,
        policy: &RetryPolicy,
    ) -> std::result::Result<Option<Record>, FetchError> {
        let Some(document) = fetch_with_retry(session, &listing.detail_url, policy).await? else {
            return Ok(None);
        };

        let mut record = self.parser.details(&document);
        record.set(NAME_FIELD, listing.name.as_str());
        Ok(Some(record))
    }
}

/// Crawl `config.base_url` through the configured WebDriver server
pub async fn crawl(config: CrawlConfig) -> Result<CrawlSummary> {
    let provider = WebDriverProvider::from_config(&config);
    Crawler::new(config, provider).run().await
}
