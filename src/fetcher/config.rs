//! # Fetcher Configuration Module
//!
//! Configuration for the fetch pipeline: HTTP identity, cache lifetime,
//! transcript languages, boilerplate selectors and headless browser timing.
//! Uses a builder pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `FetcherConfig`: The main configuration struct
//! - `BrowserConfig`: Headless browser launch and wait settings
//! - `FetcherConfigBuilder`: Builder pattern implementation

use std::time::Duration;

/// Time-to-live of cached documents
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// Configuration for headless browser sessions
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,

    /// Run Chrome with its sandbox enabled
    pub sandbox: bool,

    /// Timeout for waiting on a single element
    pub wait_timeout: Duration,

    /// Number of polls for elements that render late
    pub poll_attempts: u32,

    /// Sleep between polls
    pub poll_interval: Duration,

    /// Pause after expanding collapsed content
    pub expand_delay: Duration,

    /// Browser is shut down after this long without activity
    pub idle_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            wait_timeout: Duration::from_secs(10),
            poll_attempts: 5,
            poll_interval: Duration::from_secs(1),
            expand_delay: Duration::from_secs(2),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Configuration for the fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// User agent for plain HTTP requests
    pub user_agent: String,

    /// Timeout for plain HTTP requests
    pub request_timeout: Duration,

    /// Time-to-live of cache entries
    pub cache_ttl: Duration,

    /// Transcript languages in priority order
    pub transcript_languages: Vec<String>,

    /// CSS selectors stripped by the boilerplate heuristic
    pub exclude_selectors: Vec<String>,

    /// Upper bound on concurrent fetches in a batch
    pub max_concurrent_fetches: usize,

    /// Headless browser settings
    pub browser: BrowserConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "Mozilla/5.0 (compatible; sift/{})",
                env!("CARGO_PKG_VERSION")
            ),
            request_timeout: Duration::from_secs(30),
            cache_ttl: DEFAULT_CACHE_TTL,
            transcript_languages: vec!["ko".to_string(), "en".to_string(), "ja".to_string()],
            exclude_selectors: vec![
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "aside".to_string(),
                "form".to_string(),
                ".navigation".to_string(),
                ".menu".to_string(),
                ".sidebar".to_string(),
                ".ads".to_string(),
                ".comments".to_string(),
                "#nav".to_string(),
                "#header".to_string(),
                "#footer".to_string(),
                "#sidebar".to_string(),
                "#comments".to_string(),
            ],
            max_concurrent_fetches: 8,
            browser: BrowserConfig::default(),
        }
    }
}

/// Builder for FetcherConfig
#[derive(Debug, Default)]
pub struct FetcherConfigBuilder {
    config: FetcherConfig,
}

impl FetcherConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetcherConfig::default(),
        }
    }

    /// Set the user agent for plain HTTP requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the timeout for plain HTTP requests
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.request_timeout = request_timeout;
        self
    }

    /// Set the cache time-to-live
    pub fn cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.config.cache_ttl = cache_ttl;
        self
    }

    /// Set the transcript languages in priority order
    pub fn transcript_languages(mut self, languages: Vec<String>) -> Self {
        self.config.transcript_languages = languages;
        self
    }

    /// Set the CSS selectors stripped as boilerplate
    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    /// Set the concurrent fetch limit; zero is treated as one
    pub fn max_concurrent_fetches(mut self, max: usize) -> Self {
        self.config.max_concurrent_fetches = max.max(1);
        self
    }

    /// Set whether the browser runs headless
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.browser.headless = headless;
        self
    }

    /// Set the browser settings
    pub fn browser(mut self, browser: BrowserConfig) -> Self {
        self.config.browser = browser;
        self
    }

    /// Build the configuration
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}

impl FetcherConfig {
    /// Create a new builder
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FetcherConfig::default();

        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(config.transcript_languages, vec!["ko", "en", "ja"]);
        assert_eq!(config.browser.wait_timeout, Duration::from_secs(10));
        assert_eq!(config.browser.poll_attempts, 5);
        assert!(config.exclude_selectors.contains(&"nav".to_string()));
    }

    #[test]
    fn test_builder() {
        let config = FetcherConfig::builder()
            .user_agent("test-agent")
            .cache_ttl(Duration::from_secs(5))
            .transcript_languages(vec!["en".to_string()])
            .max_concurrent_fetches(0)
            .headless(false)
            .build();

        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.transcript_languages, vec!["en"]);
        assert_eq!(config.max_concurrent_fetches, 1);
        assert!(!config.browser.headless);
    }
}
