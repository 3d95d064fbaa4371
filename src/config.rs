use crate::ConfigError;
use crate::fetchers::{RetryMode, RetryPolicy};
use crate::filter::{UrlFilter, UrlFilterConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Longest pause a delay range may ask for, in seconds
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// A randomized pause, in seconds, drawn uniformly from `min_secs..=max_secs`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// No pause at all
    pub const fn none() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Configuration for a directory crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Listing URL of the category to crawl (page 1)
    pub base_url: String,

    /// Where the record set is persisted
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Ask the browser to run without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Query parameter carrying the listing page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Stop after this many listing pages
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Attempts per page load
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    /// Fixed pause between page load attempts
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    #[serde(default)]
    pub retry_mode: RetryMode,

    /// How long to wait for the page body to appear
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// Politeness delay after each detail page
    #[serde(default = "default_item_delay")]
    pub item_delay: DelayRange,

    /// Delay between listing pages
    #[serde(default = "default_page_delay")]
    pub page_delay: DelayRange,

    /// Pause before restarting after a transient failure
    #[serde(default = "default_restart_cooldown_secs")]
    pub restart_cooldown_secs: u64,

    /// Restarts allowed before the crawl gives up
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,

    /// Regex patterns a detail URL must match (any of)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns that reject a detail URL
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Only follow detail links on the base URL's domain
    #[serde(default = "default_same_domain_only")]
    pub same_domain_only: bool,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("companies.csv")
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_page_param() -> String {
    "pageds".to_string()
}

fn default_fetch_attempts() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_page_load_timeout_secs() -> u64 {
    30
}

fn default_item_delay() -> DelayRange {
    DelayRange::new(3.0, 7.0)
}

fn default_page_delay() -> DelayRange {
    DelayRange::new(5.0, 10.0)
}

fn default_restart_cooldown_secs() -> u64 {
    10
}

fn default_max_restarts() -> u32 {
    5
}

fn default_same_domain_only() -> bool {
    true
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            output_path: default_output_path(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            page_param: default_page_param(),
            max_pages: None,
            fetch_attempts: default_fetch_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            retry_mode: RetryMode::default(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            item_delay: default_item_delay(),
            page_delay: default_page_delay(),
            restart_cooldown_secs: default_restart_cooldown_secs(),
            max_restarts: default_max_restarts(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            same_domain_only: default_same_domain_only(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configuration with every pause set to zero, for driving a crawl against stubs
    pub fn without_delays(mut self) -> Self {
        self.retry_delay_secs = 0;
        self.item_delay = DelayRange::none();
        self.page_delay = DelayRange::none();
        self.restart_cooldown_secs = 0;
        self
    }

    /// Check the configuration before a crawl starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;

        if self.fetch_attempts == 0 {
            return Err(ConfigError::Validation(
                "fetch_attempts must be at least 1".to_string(),
            ));
        }
        if self.page_param.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page_param must not be empty".to_string(),
            ));
        }
        for (name, range) in [("item_delay", &self.item_delay), ("page_delay", &self.page_delay)]
        {
            let in_bounds = range.min_secs >= 0.0
                && range.min_secs <= range.max_secs
                && range.max_secs <= MAX_DELAY_SECS;
            if !in_bounds {
                return Err(ConfigError::Validation(format!(
                    "{} must satisfy 0 <= min_secs <= max_secs <= {} (got {}..{})",
                    name, MAX_DELAY_SECS, range.min_secs, range.max_secs
                )));
            }
        }

        self.url_filter()?;
        Ok(())
    }

    /// The base URL, parsed and restricted to http(s)
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.fetch_attempts.max(1),
            delay: Duration::from_secs(self.retry_delay_secs),
            mode: self.retry_mode,
        }
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn restart_cooldown(&self) -> Duration {
        Duration::from_secs(self.restart_cooldown_secs)
    }

    /// Build the detail-link filter from the domain restriction and patterns
    pub fn url_filter(&self) -> Result<UrlFilter, ConfigError> {
        let root = self.parsed_base_url()?;
        let filter_config = UrlFilterConfig {
            required_domain: if self.same_domain_only {
                root.host_str().map(|d| d.to_string())
            } else {
                None
            },
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        };

        Ok(UrlFilter::new(filter_config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = CrawlConfig::from_json(r#"{"base_url": "https://example.test/co"}"#).unwrap();

        assert_eq!(config.output_path, PathBuf::from("companies.csv"));
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.page_param, "pageds");
        assert_eq!(config.fetch_attempts, 5);
        assert_eq!(config.retry_delay_secs, 5);
        assert_eq!(config.retry_mode, RetryMode::Exhaustive);
        assert_eq!(config.page_load_timeout_secs, 30);
        assert_eq!(config.item_delay, DelayRange::new(3.0, 7.0));
        assert_eq!(config.page_delay, DelayRange::new(5.0, 10.0));
        assert_eq!(config.restart_cooldown_secs, 10);
        assert!(config.same_domain_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_json() {
        let json = r#"{
            "base_url": "https://example.test/co",
            "output_path": "out.csv",
            "retry_mode": "eager",
            "max_pages": 3,
            "item_delay": {"min_secs": 1.0, "max_secs": 2.0}
        }"#;
        let config = CrawlConfig::from_json(json).unwrap();

        assert_eq!(config.output_path, PathBuf::from("out.csv"));
        assert_eq!(config.retry_mode, RetryMode::Eager);
        assert_eq!(config.max_pages, Some(3));
        assert_eq!(config.item_delay, DelayRange::new(1.0, 2.0));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = CrawlConfig::new("not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let config = CrawlConfig::new("ftp://example.test/co");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let mut config = CrawlConfig::new("https://example.test/co");
        config.fetch_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = CrawlConfig::new("https://example.test/co");
        config.page_delay = DelayRange::new(10.0, 5.0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = CrawlConfig::new("https://example.test/co");
        config.exclude_patterns = vec!["(".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_validation_bounds_delays() {
        let mut config = CrawlConfig::new("https://example.test/co");
        config.item_delay = DelayRange::new(0.0, 1e20);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = CrawlConfig::new("https://example.test/co");
        config.page_delay = DelayRange::new(1.0, f64::INFINITY);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = CrawlConfig::new("https://example.test/co");
        config.item_delay = DelayRange::new(f64::NAN, 2.0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = CrawlConfig::new("https://example.test/co");
        config.page_delay = DelayRange::new(0.0, MAX_DELAY_SECS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_without_delays() {
        let config = CrawlConfig::new("https://example.test/co").without_delays();
        assert_eq!(config.retry_policy().delay, Duration::ZERO);
        assert_eq!(config.item_delay, DelayRange::none());
        assert_eq!(config.page_delay, DelayRange::none());
        assert_eq!(config.restart_cooldown(), Duration::ZERO);
    }
}
