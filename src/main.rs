use clap::Parser;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Default to info level unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let webdriver_from_cli = args.webdriver_url.is_some();

    let mut config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // WEBDRIVER_URL overrides the config file, --webdriver-url overrides both
    if !webdriver_from_cli {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }
    }

    ::log::info!("Starting crawl of {}", config.base_url);
    ::log::info!(
        "Records are stored in {} (WebDriver at {})",
        config.output_path.display(),
        config.webdriver_url
    );

    match company_crawl::crawl(config).await {
        Ok(summary) => {
            println!(
                "Scraping completed: {} new records, {} already stored, {} failed.",
                summary.scraped, summary.skipped, summary.failed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
