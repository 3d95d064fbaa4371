pub mod fetcher;
pub mod web;

pub use fetcher::{
    Document, PageFetcher, RetryMode, RetryPolicy, SessionProvider, fetch_with_retry,
};
pub use web::{WebDriverProvider, WebDriverSession};
