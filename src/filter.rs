use regex::Regex;
use url::Url;

/// Configuration for deciding which detail links a crawl follows
#[derive(Debug, Clone, Default)]
pub struct UrlFilterConfig {
    /// Domain restriction for detail pages (if None, any domain is accepted)
    pub required_domain: Option<String>,

    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    pub exclude_patterns: Vec<String>,
}

/// URL filter that uses regex patterns and a domain rule to accept detail URLs
#[derive(Debug, Default)]
pub struct UrlFilter {
    config: UrlFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if a detail URL should be scraped
    pub fn accepts(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_in_domain_scope(url) {
            return false;
        }

        // Exclusions take precedence
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|r| r.is_match(url_str))
    }

    fn is_in_domain_scope(&self, url: &Url) -> bool {
        match &self.config.required_domain {
            Some(required) => url.host_str() == Some(required.as_str()),
            None => true,
        }
    }

    /// Create a normalized version of the URL (e.g., removing fragments)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
