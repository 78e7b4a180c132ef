//! Metadata extraction from HTML pages
//!
//! Every field is looked up on its own: a missing element or an unparsable
//! selector leaves that one field `None`.

use crate::document::WebMetadata;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

static JSON_LD_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""datePublished"\s*:\s*"([^"]+)""#).expect("valid json-ld date pattern")
});

static URL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/((?:19|20)\d{2})/(\d{1,2})/(\d{1,2})(?:/|$|[?#.-])").expect("valid url date pattern")
});

// Meta tags carrying a publication date, in order of preference.
const DATE_META_SELECTORS: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[property='og:published_time']",
    "meta[itemprop='datePublished']",
    "meta[name='datePublished']",
    "meta[name='article:published_time']",
    "meta[name='pubdate']",
    "meta[name='publishdate']",
    "meta[name='publish-date']",
    "meta[name='date']",
    "meta[name='DC.date.issued']",
    "meta[name='dc.date']",
    "meta[name='sailthru.date']",
    "meta[property='og:updated_time']",
];

const DATE_ELEMENT_SELECTORS: &[&str] = &["time[datetime]", "relative-time[datetime]"];

/// Parse a CSS selector, logging instead of failing
pub(crate) fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Failed to parse selector '{}': {}", selector, e);
            None
        }
    }
}

/// Whitespace-collapsed text of the first element matching `selector`
pub(crate) fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = parse_selector(selector)?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Attribute value of the first element matching `selector`
pub(crate) fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = parse_selector(selector)?;
    document
        .select(&selector)
        .find_map(|element| element.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Extract page metadata
///
/// # Arguments
///
/// * `url` - The URL of the page, stored as the metadata source
/// * `html` - The HTML of the page
///
/// # Returns
///
/// The extracted metadata; `summary` is always `None`
pub fn extract_web_metadata(url: &str, html: &str) -> WebMetadata {
    let document = Html::parse_document(html);

    WebMetadata {
        title: select_text(&document, "title"),
        description: select_attr(&document, "meta[name='description']", "content"),
        keywords: select_attr(&document, "meta[name='keywords']", "content"),
        published_date: find_published_date(&document, url),
        source: Some(url.to_string()),
        summary: None,
        error: None,
    }
}

/// Find the publication date of a page as `YYYY-MM-DD`
///
/// Looks at date meta tags, then `<time>`-like elements, then JSON-LD, and
/// finally a `/YYYY/MM/DD/` segment in the URL.
pub fn find_published_date(document: &Html, url: &str) -> Option<String> {
    let from_meta = DATE_META_SELECTORS
        .iter()
        .filter_map(|selector| select_attr(document, selector, "content"))
        .find_map(|raw| normalize_date(&raw));
    if from_meta.is_some() {
        return from_meta;
    }

    let from_elements = DATE_ELEMENT_SELECTORS
        .iter()
        .filter_map(|selector| select_attr(document, selector, "datetime"))
        .find_map(|raw| normalize_date(&raw));
    if from_elements.is_some() {
        return from_elements;
    }

    let from_json_ld = parse_selector("script[type='application/ld+json']").and_then(|selector| {
        document.select(&selector).find_map(|script| {
            let json = script.text().collect::<String>();
            JSON_LD_DATE
                .captures(&json)
                .and_then(|caps| normalize_date(&caps[1]))
        })
    });
    if from_json_ld.is_some() {
        return from_json_ld;
    }

    let from_url = URL_DATE.captures(url).and_then(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    if from_url.is_none() {
        debug!("No publication date found for {}", url);
    }
    from_url.map(|date| date.format("%Y-%m-%d").to_string())
}

/// Normalize a date string to `YYYY-MM-DD`
pub(crate) fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(raw) {
        return Some(datetime.date_naive().format("%Y-%m-%d").to_string());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date().format("%Y-%m-%d").to_string());
        }
    }

    // Date-only forms, possibly followed by a time we do not care about
    let head: String = raw.chars().take(10).collect();
    ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&head, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}
