//! Headless browser sessions
//!
//! `headless_chrome` is synchronous, so every call is dispatched to tokio's
//! blocking pool and awaited. A session owns one browser process and is never
//! shared between fetches.

use crate::fetcher::{BrowserConfig, FetchError};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const READ_PROPERTY: &str = "function(name) { return this[name]; }";

/// A browser process with one primary tab
pub struct BrowserSession {
    browser: Arc<Browser>,
    tab: Arc<Tab>,
    config: BrowserConfig,
}

impl BrowserSession {
    /// Launch a browser and open its primary tab
    #[instrument(skip(config))]
    pub async fn launch(config: &BrowserConfig) -> Result<Self, FetchError> {
        let options = LaunchOptions {
            headless: config.headless,
            sandbox: config.sandbox,
            idle_browser_timeout: config.idle_timeout,
            ..Default::default()
        };

        let (browser, tab) = tokio::task::spawn_blocking(move || {
            let browser = Browser::new(options)?;
            let tab = browser.new_tab()?;
            Ok::<_, anyhow::Error>((browser, tab))
        })
        .await?
        .map_err(|e| FetchError::Browser(format!("Failed to launch browser: {}", e)))?;

        debug!("Browser launched");
        Ok(Self {
            browser: Arc::new(browser),
            tab,
            config: config.clone(),
        })
    }

    async fn on_tab<T, F>(&self, f: F) -> Result<T, FetchError>
    where
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await?
            .map_err(|e| FetchError::Browser(e.to_string()))
    }

    /// Navigate the primary tab and wait for the load to finish
    #[instrument(skip(self))]
    pub async fn navigate(&self, url: &str) -> Result<(), FetchError> {
        let url = url.to_string();
        self.on_tab(move |tab| {
            tab.navigate_to(&url)?.wait_until_navigated()?;
            Ok(())
        })
        .await
    }

    /// Wait for `selector` and read a DOM property of the element
    ///
    /// Uses the configured wait timeout; a timeout is an error.
    pub async fn wait_for_property(
        &self,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>, FetchError> {
        let selector = selector.to_string();
        let property = property.to_string();
        let timeout = self.config.wait_timeout;
        self.on_tab(move |tab| {
            let element = tab.wait_for_element_with_custom_timeout(&selector, timeout)?;
            let value = element
                .call_js_fn(READ_PROPERTY, vec![json!(property)], false)?
                .value;
            Ok(value.and_then(|v| v.as_str().map(str::to_string)))
        })
        .await
    }

    /// Wait for `selector` and read an attribute of the element
    pub async fn wait_for_attribute(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Option<String>, FetchError> {
        let selector = selector.to_string();
        let attribute = attribute.to_string();
        let timeout = self.config.wait_timeout;
        self.on_tab(move |tab| {
            let element = tab.wait_for_element_with_custom_timeout(&selector, timeout)?;
            element.get_attribute_value(&attribute)
        })
        .await
    }

    /// Poll for an attribute of an element that may render late
    ///
    /// Tries `poll_attempts` times, sleeping `poll_interval` between tries.
    /// The first value found wins.
    pub async fn poll_attribute(&self, selector: &str, attribute: &str) -> Option<String> {
        for attempt in 1..=self.config.poll_attempts {
            let selector_owned = selector.to_string();
            let attribute_owned = attribute.to_string();
            let found = self
                .on_tab(move |tab| {
                    tab.find_element(&selector_owned)?
                        .get_attribute_value(&attribute_owned)
                })
                .await;

            match found {
                Ok(Some(value)) => return Some(value),
                Ok(None) => debug!("{} has no {} (attempt {})", selector, attribute, attempt),
                Err(e) => debug!("{} not found (attempt {}): {}", selector, attempt, e),
            }

            if attempt < self.config.poll_attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
        None
    }

    /// Wait for `selector` and click it
    pub async fn click(&self, selector: &str) -> Result<(), FetchError> {
        let selector = selector.to_string();
        let timeout = self.config.wait_timeout;
        self.on_tab(move |tab| {
            tab.wait_for_element_with_custom_timeout(&selector, timeout)?
                .click()?;
            Ok(())
        })
        .await
    }

    /// Title of the current page
    pub async fn title(&self) -> Result<String, FetchError> {
        self.on_tab(|tab| tab.get_title()).await
    }

    /// Rendered HTML of the current page
    pub async fn page_source(&self) -> Result<String, FetchError> {
        self.on_tab(|tab| tab.get_content()).await
    }

    /// Open `url` in a second tab, read a property of `selector`, close the tab
    #[instrument(skip(self))]
    pub async fn property_in_new_tab(
        &self,
        url: &str,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>, FetchError> {
        let browser = Arc::clone(&self.browser);
        let url = url.to_string();
        let selector = selector.to_string();
        let property = property.to_string();
        let timeout = self.config.wait_timeout;

        tokio::task::spawn_blocking(move || {
            let tab = browser.new_tab()?;
            let read = (|| {
                tab.navigate_to(&url)?.wait_until_navigated()?;
                let element = tab.wait_for_element_with_custom_timeout(&selector, timeout)?;
                let value = element
                    .call_js_fn(READ_PROPERTY, vec![json!(property)], false)?
                    .value;
                Ok::<_, anyhow::Error>(value.and_then(|v| v.as_str().map(str::to_string)))
            })();
            if let Err(e) = tab.close(false) {
                warn!("Failed to close secondary tab: {}", e);
            }
            read
        })
        .await?
        .map_err(|e| FetchError::Browser(e.to_string()))
    }

    /// Close the tab and shut the browser down
    pub async fn close(self) {
        let Self { browser, tab, .. } = self;
        let closed = tokio::task::spawn_blocking(move || {
            if let Err(e) = tab.close(false) {
                warn!("Failed to close tab: {}", e);
            }
            // The browser process exits when its last handle drops.
            drop(tab);
            drop(browser);
        })
        .await;

        match closed {
            Ok(()) => debug!("Browser closed"),
            Err(e) => warn!("Browser shutdown task failed: {}", e),
        }
    }
}
