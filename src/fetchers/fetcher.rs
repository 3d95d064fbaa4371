use crate::FetchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A loaded page: the URL that was requested and its rendered source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: String,
    pub html: String,
}

impl Document {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// One open browser session. Loads one URL at a time.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Navigate to `url`, wait for the page to be ready and return its source
    async fn fetch(&mut self, url: &str) -> Result<Document, FetchError>;

    /// Release the session. Best effort, failures are only logged.
    async fn close(self);
}

/// Opens browser sessions; a crawl pass acquires one and releases it on exit
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    type Session: PageFetcher;

    async fn connect(&self) -> Result<Self::Session, FetchError>;
}

/// How a failed page load is retried
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    /// Use every attempt in the budget before reporting the page as failed
    #[default]
    Exhaustive,
    /// Report the page as failed after the first error
    Eager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
    pub mode: RetryMode,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(5),
            mode: RetryMode::Exhaustive,
        }
    }
}

impl RetryPolicy {
    /// Number of tries this policy actually makes
    pub fn effective_attempts(&self) -> u32 {
        match self.mode {
            RetryMode::Exhaustive => self.attempts.max(1),
            RetryMode::Eager => 1,
        }
    }
}

/// Load `url` through `session`, retrying page-level failures per `policy`.
///
/// Returns `Ok(None)` when every attempt failed. Session errors are returned
/// immediately: retrying on a dead session cannot succeed.
pub async fn fetch_with_retry<F: PageFetcher>(
    session: &mut F,
    url: &str,
    policy: &RetryPolicy,
) -> Result<Option<Document>, FetchError> {
    let attempts = policy.effective_attempts();

    for attempt in 1..=attempts {
        match session.fetch(url).await {
            Ok(document) => return Ok(Some(document)),
            Err(e) if e.is_session_error() => return Err(e),
            Err(e) => {
                ::log::warn!(
                    "Error fetching {} (attempt {}/{}): {}",
                    url,
                    attempt,
                    attempts,
                    e
                );
                if attempt < attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    ::log::error!("Giving up on {} after {} attempts", url, attempts);
    Ok(None)
}
