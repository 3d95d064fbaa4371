pub mod config;
pub mod crawl;
pub mod fetchers;
pub mod filter;
pub mod paginator;
pub mod parsers;
pub mod results;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::CrawlConfig;
pub use crawl::{CrawlSummary, Crawler, crawl};
pub use fetchers::{Document, PageFetcher, RetryMode, SessionProvider, WebDriverProvider};
pub use results::{NAME_FIELD, Record, RecordSet};
pub use store::DedupStore;

use thiserror::Error;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Failures raised while loading a single page through a browser session
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to connect to WebDriver at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to navigate to {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out waiting for {url} to become ready")]
    Timeout { url: String },

    #[error("Failed to read page source for {url}: {message}")]
    Source { url: String, message: String },

    #[error("Browser session lost while loading {url}: {message}")]
    SessionLost { url: String, message: String },
}

impl FetchError {
    /// Errors that leave the session unusable and must not be retried in place
    pub fn is_session_error(&self) -> bool {
        matches!(self, FetchError::Connect { .. } | FetchError::SessionLost { .. })
    }
}

/// Errors raised by the persisted record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Top-level crawl error
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Giving up after {restarts} restarts, last error: {last}")]
    RestartsExhausted {
        restarts: u32,
        last: Box<CrawlError>,
    },
}

impl CrawlError {
    /// Whether a fresh pass from page 1 could reasonably succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CrawlError::Config(_) => false,
            CrawlError::Fetch(_) => true,
            CrawlError::Store(_) => true,
            CrawlError::RestartsExhausted { .. } => false,
        }
    }
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;
