//! Blog strategy for Naver blog posts

use crate::document::{Metadata, WebMetadata};
use crate::fetcher::generic::fetch_page;
use crate::fetcher::metadata::{extract_web_metadata, parse_selector};
use crate::fetcher::{FetchContext, FetchError, FetchStrategy, StrategyKind, mobile_blog_url};
use crate::markup::{MarkdownOptions, html_to_markdown};
use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, warn};

// Post containers of the current and the legacy editor.
const POST_CONTAINERS: &[&str] = &["div.se-main-container", "div._postView"];

/// Strategy for blog posts, fetched from the mobile rendering
pub struct BlogFetcher {
    url: String,
    http: reqwest::Client,
    html: Option<String>,
}

impl BlogFetcher {
    /// Create a fetcher for `url`; the URL is rewritten to the mobile host
    pub fn new(url: &str, context: &FetchContext) -> Self {
        let url = mobile_blog_url(url);
        debug!("Blog post will be fetched from {}", url);
        Self {
            url,
            http: context.http.clone(),
            html: None,
        }
    }
}

/// Outer HTML of the post container
pub(crate) fn post_container(html: &str, url: &str) -> String {
    let document = Html::parse_document(html);

    let found = POST_CONTAINERS
        .iter()
        .filter_map(|selector| parse_selector(selector))
        .find_map(|selector| document.select(&selector).next().map(|e| e.html()));

    found.unwrap_or_else(|| {
        warn!("Failed to find the post container in {}", url);
        String::new()
    })
}

#[async_trait]
impl FetchStrategy for BlogFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Blog
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
        Ok(post_container(html, &self.url))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::fetcher::FetcherConfig;
    use std::sync::Arc;

    #[test]
    fn test_current_editor_container() {
        let html = r#"<div class="se-main-container"><p>New editor</p></div>
                      <div class="_postView"><p>Legacy</p></div>"#;
        let body = post_container(html, "https://m.blog.naver.com/u/1");

        assert!(body.contains("New editor"));
        assert!(!body.contains("Legacy"));
    }

    #[test]
    fn test_legacy_container() {
        let html = r#"<div class="_postView"><p>Legacy</p></div>"#;
        assert!(post_container(html, "https://m.blog.naver.com/u/1").contains("Legacy"));
    }

    #[test]
    fn test_missing_container_is_empty() {
        assert_eq!(post_container("<p>nothing</p>", "https://m.blog.naver.com/u/1"), "");
    }

    #[test]
    fn test_url_is_rewritten() {
        let context =
            FetchContext::new(FetcherConfig::default(), Arc::new(MemoryCache::new())).unwrap();
        let fetcher = BlogFetcher::new("https://blog.naver.com/u/1", &context);

        assert_eq!(fetcher.url(), "https://m.blog.naver.com/u/1");
    }
}
