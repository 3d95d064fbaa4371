use clap::Parser;
use company_crawl::{CrawlConfig, ConfigError, RetryMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "company-crawl")]
#[command(about = "Crawls a company directory category into a resumable CSV file")]
#[command(version)]
pub struct Args {
    /// Listing URL of the category to crawl (page 1)
    #[arg(required_unless_present = "config")]
    pub base_url: Option<String>,

    /// JSON configuration file; command-line options override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV file the records are stored in
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Stop after this many listing pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Restarts allowed after transient failures before giving up
    #[arg(long)]
    pub max_restarts: Option<u32>,

    /// How failed page loads are retried
    #[arg(long, value_enum)]
    pub retry_mode: Option<RetryMode>,

    /// Show the browser window
    #[arg(long)]
    pub no_headless: bool,
}

impl Args {
    /// Build the crawl configuration from the config file (if any) and the overrides
    pub fn into_config(self) -> Result<CrawlConfig, ConfigError> {
        let mut config = match (&self.config, &self.base_url) {
            (Some(path), _) => CrawlConfig::from_file(path)?,
            (None, Some(url)) => CrawlConfig::new(url),
            (None, None) => {
                return Err(ConfigError::Validation(
                    "either a base URL or --config is required".to_string(),
                ));
            }
        };

        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(webdriver_url) = self.webdriver_url {
            config.webdriver_url = webdriver_url;
        }
        if self.max_pages.is_some() {
            config.max_pages = self.max_pages;
        }
        if let Some(max_restarts) = self.max_restarts {
            config.max_restarts = max_restarts;
        }
        if let Some(mode) = self.retry_mode {
            config.retry_mode = mode;
        }
        if self.no_headless {
            config.headless = false;
        }

        Ok(config)
    }
}
