//! Generic HTML strategy
//!
//! Runs two independent extraction heuristics over the page and keeps the
//! longer result, falling back to a whole-page conversion.

use crate::document::Metadata;
use crate::fetcher::metadata::{extract_web_metadata, parse_selector};
use crate::fetcher::{FetchContext, FetchError, FetchStrategy, StrategyKind};
use crate::markup::{MarkdownOptions, html_to_markdown};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::io::Cursor;
use tracing::{debug, instrument, warn};
use url::Url;

// Candidates for the main content container, in order of preference.
const MAIN_CONTAINERS: &[&str] = &["article", "main", "[role='main']", "#content", ".content"];

// Always stripped in addition to the configured exclude selectors.
const NON_CONTENT: &[&str] = &["script", "style", "noscript", "template"];

/// GET a page, treating non-success statuses as failures
#[instrument(skip(http))]
pub(crate) async fn fetch_page(http: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = http.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let html = response.text().await?;
    debug!("Fetched {} bytes from {}", html.len(), url);
    Ok(html)
}

/// Strategy for pages without a dedicated extractor
pub struct GenericFetcher {
    url: String,
    http: reqwest::Client,
    exclude_selectors: Vec<String>,
    html: Option<String>,
}

impl GenericFetcher {
    /// Create a fetcher for `url`
    pub fn new(url: &str, context: &FetchContext) -> Self {
        Self {
            url: url.to_string(),
            http: context.http.clone(),
            exclude_selectors: context.config.exclude_selectors.clone(),
            html: None,
        }
    }
}

#[async_trait]
impl FetchStrategy for GenericFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Generic
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

        let readability = readability_extract(html, &self.url);
        let boilerplate = boilerplate_extract(html, &self.exclude_selectors);

        match select_longer(readability, boilerplate) {
            Some(body) => Ok(body),
            None => {
                debug!("Both extractors came up empty for {}, converting full page", self.url);
                Ok(full_page(html))
            }
        }
    }

    // Extraction already produced markdown.
    fn normalize(&self, body: &str) -> String {
        body.to_string()
    }

    async fn extract_metadata(&mut self) -> Metadata {
        match &self.html {
            Some(html) => Metadata::Web(extract_web_metadata(&self.url, html)),
            None => Metadata::Web(crate::document::WebMetadata::failed()),
        }
    }
}

/// Readability-style extraction, converted to markdown
pub(crate) fn readability_extract(html: &str, url: &str) -> Option<String> {
    let url = match Url::parse(url) {
        Ok(url) => url,
        Err(e) => {
            warn!("Readability skipped for unparsable URL {}: {}", url, e);
            return None;
        }
    };

    let mut cursor = Cursor::new(html.as_bytes());
    match readability::extractor::extract(&mut cursor, &url) {
        Ok(product) => non_empty(html_to_markdown(&product.content, MarkdownOptions::default())),
        Err(e) => {
            warn!("Readability extraction failed for {}: {}", url, e);
            None
        }
    }
}

/// Boilerplate-removal extraction, converted to markdown
///
/// Picks the main container, strips navigation-like elements from it and
/// converts what remains.
pub(crate) fn boilerplate_extract(html: &str, exclude_selectors: &[String]) -> Option<String> {
    let mut document = Html::parse_document(html);

    let container_id = main_container(&document)?.id();

    let doomed = {
        let container = document.tree.get(container_id).and_then(ElementRef::wrap)?;
        exclude_selectors
            .iter()
            .map(String::as_str)
            .chain(NON_CONTENT.iter().copied())
            .filter_map(parse_selector)
            .flat_map(|selector| {
                container
                    .select(&selector)
                    .map(|element| element.id())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let container = document.tree.get(container_id).and_then(ElementRef::wrap)?;
    non_empty(html_to_markdown(&container.html(), MarkdownOptions::default()))
}

fn main_container(document: &Html) -> Option<ElementRef<'_>> {
    for selector in MAIN_CONTAINERS.iter().filter_map(|s| parse_selector(s)) {
        if let Some(element) = document.select(&selector).next() {
            return Some(element);
        }
    }

    let blocks = parse_selector("div, section")?;
    let densest = document
        .select(&blocks)
        .map(|element| (paragraph_text_len(element), element))
        .filter(|(len, _)| *len > 0)
        .max_by_key(|(len, _)| *len)
        .map(|(_, element)| element);

    densest.or_else(|| {
        let body = parse_selector("body")?;
        document.select(&body).next()
    })
}

// Length of text held by direct `<p>` children.
fn paragraph_text_len(element: ElementRef<'_>) -> usize {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "p")
        .map(|p| p.text().map(str::len).sum::<usize>())
        .sum()
}

/// Pick the longer of two extraction outputs
///
/// Readability wins only when strictly longer; a lone output is used as is.
pub(crate) fn select_longer(
    readability: Option<String>,
    boilerplate: Option<String>,
) -> Option<String> {
    match (
        readability.and_then(non_empty),
        boilerplate.and_then(non_empty),
    ) {
        (Some(r), Some(b)) => {
            if r.chars().count() > b.chars().count() {
                Some(r)
            } else {
                Some(b)
            }
        }
        (Some(r), None) => Some(r),
        (None, b) => b,
    }
}

/// Convert the entire page, falling back to its plain text
///
/// Scripts, styles and other non-rendered elements are removed first, so a
/// page made only of them yields an empty body.
pub(crate) fn full_page(html: &str) -> String {
    let mut document = Html::parse_document(html);

    let doomed = NON_CONTENT
        .iter()
        .filter_map(|s| parse_selector(s))
        .flat_map(|selector| {
            document
                .select(&selector)
                .map(|element| element.id())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let markdown = html_to_markdown(&document.root_element().html(), MarkdownOptions::default());
    if !markdown.trim().is_empty() {
        return markdown;
    }

    document
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}
