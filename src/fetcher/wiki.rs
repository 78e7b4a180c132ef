//! Wiki strategy for namu.wiki articles

use crate::document::{Metadata, WebMetadata};
use crate::fetcher::generic::fetch_page;
use crate::fetcher::metadata::{extract_web_metadata, parse_selector};
use crate::fetcher::{FetchContext, FetchError, FetchStrategy, StrategyKind};
use crate::markup::{MarkdownOptions, html_to_markdown};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::warn;

/// Strategy for wiki articles
///
/// The article body is the third `div` enclosing the page's first `<h1>`.
pub struct WikiFetcher {
    url: String,
    http: reqwest::Client,
    html: Option<String>,
}

impl WikiFetcher {
    /// Create a fetcher for `url`
    pub fn new(url: &str, context: &FetchContext) -> Self {
        Self {
            url: url.to_string(),
            http: context.http.clone(),
            html: None,
        }
    }
}

/// Outer HTML of the third `div` ancestor of the first `<h1>`
pub(crate) fn article_container(html: &str, url: &str) -> String {
    let document = Html::parse_document(html);

    let Some(h1) = parse_selector("h1").and_then(|selector| document.select(&selector).next())
    else {
        warn!("Failed to find the <h1> tag in {}", url);
        return String::new();
    };

    let container = h1
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "div")
        .nth(2);

    match container {
        Some(element) => element.html(),
        None => {
            warn!("Failed to find the content div in {}", url);
            String::new()
        }
    }
}

#[async_trait]
impl FetchStrategy for WikiFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Wiki
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_markup(&mut self) -> Result<(), FetchError> {
        self.html = Some(fetch_page(&self.http, &self.url).await?);
        Ok(())
    }

    async fn extract_body(&mut self) -> Result<String, FetchError> {
        let html = self
            .html
            .as_deref()
            .ok_or_else(|| FetchError::Other("markup not fetched".to_string()))?;
        Ok(article_container(html, &self.url))
    }

    fn normalize(&self, body: &str) -> String {
        html_to_markdown(body, MarkdownOptions::rich())
    }

    async fn extract_metadata(&mut self) -> Metadata {
        match &self.html {
            Some(html) => Metadata::Web(extract_web_metadata(&self.url, html)),
            None => Metadata::Web(WebMetadata::failed()),
        }
    }
}
