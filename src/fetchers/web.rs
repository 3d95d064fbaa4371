use crate::FetchError;
use crate::config::CrawlConfig;
use crate::fetchers::fetcher::{Document, PageFetcher, SessionProvider};
use fantoccini::error::CmdError;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tokio::time::timeout;

/// Well-known local endpoints tried when the configured WebDriver is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Extra time on top of the readiness wait before a page load is abandoned
const NAVIGATION_GRACE: Duration = Duration::from_secs(15);

/// Opens Chrome sessions through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverProvider {
    webdriver_url: String,
    headless: bool,
    page_load_timeout: Duration,
}

impl WebDriverProvider {
    pub fn new(webdriver_url: &str, headless: bool, page_load_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            headless,
            page_load_timeout,
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            &config.webdriver_url,
            config.headless,
            config.page_load_timeout(),
        )
    }

    fn capabilities(&self) -> Capabilities {
        let mut args = vec!["--disable-gpu", "--window-size=1280,1024"];
        if self.headless {
            args.push("--headless");
        }

        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );
        caps
    }

    async fn try_connect(&self, url: &str) -> Result<Client, FetchError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        builder.connect(url).await.map_err(|e| FetchError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl SessionProvider for WebDriverProvider {
    type Session = WebDriverSession;

    async fn connect(&self) -> Result<WebDriverSession, FetchError> {
        let first_error = match self.try_connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(WebDriverSession::new(client, self.page_load_timeout));
            }
            Err(e) => {
                ::log::error!("{}", e);
                e
            }
        };

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == self.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = self.try_connect(url).await {
                ::log::info!("Connected to fallback WebDriver at {}", url);
                return Ok(WebDriverSession::new(client, self.page_load_timeout));
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(first_error)
    }
}

/// A live browser session
pub struct WebDriverSession {
    client: Client,
    page_load_timeout: Duration,
}

impl WebDriverSession {
    fn new(client: Client, page_load_timeout: Duration) -> Self {
        Self {
            client,
            page_load_timeout,
        }
    }

    async fn load(&self, url: &str) -> Result<Document, FetchError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| classify(e, url, |message| FetchError::Navigation {
                url: url.to_string(),
                message,
            }))?;

        // The page counts as ready once its body exists
        self.client
            .wait()
            .at_most(self.page_load_timeout)
            .for_element(Locator::Css("body"))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => FetchError::Timeout {
                    url: url.to_string(),
                },
                other => classify(other, url, |message| FetchError::Navigation {
                    url: url.to_string(),
                    message,
                }),
            })?;

        let html = self
            .client
            .source()
            .await
            .map_err(|e| classify(e, url, |message| FetchError::Source {
                url: url.to_string(),
                message,
            }))?;

        Ok(Document::new(url, html))
    }
}

impl PageFetcher for WebDriverSession {
    async fn fetch(&mut self, url: &str) -> Result<Document, FetchError> {
        let start = std::time::Instant::now();
        ::log::debug!("FETCH: {}", url);

        let budget = self.page_load_timeout + NAVIGATION_GRACE;
        let document = match timeout(budget, self.load(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                });
            }
        };

        ::log::debug!(
            "Loaded {} ({} bytes) in {:.2} seconds",
            url,
            document.html.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(document)
    }

    async fn close(self) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
    }
}

/// Separate a dead session from an ordinary page failure
fn classify(
    error: CmdError,
    url: &str,
    page_error: impl FnOnce(String) -> FetchError,
) -> FetchError {
    let message = error.to_string();
    if is_session_loss(&message) {
        ::log::warn!("Lost session while loading {}", url);
        FetchError::SessionLost {
            url: url.to_string(),
            message,
        }
    } else {
        page_error(message)
    }
}

fn is_session_loss(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("unable to find session")
        || message.contains("invalid session id")
        || message.contains("session deleted")
        || message.contains("chrome not reachable")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_loss_messages() {
        assert!(is_session_loss("Unable to find session with ID: abc"));
        assert!(is_session_loss("invalid session id"));
        assert!(is_session_loss(
            "session deleted because of page crash from tab crashed"
        ));
        assert!(!is_session_loss("net::ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn test_headless_capabilities() {
        let provider = WebDriverProvider::new("http://localhost:4444", true, Duration::from_secs(30));
        let caps = provider.capabilities();
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless"));

        let provider =
            WebDriverProvider::new("http://localhost:4444", false, Duration::from_secs(30));
        let caps = provider.capabilities();
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless"));
    }
}
