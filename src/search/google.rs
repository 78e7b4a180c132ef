//! Google Custom Search engine

use crate::error::{Error, Result};
use crate::search::{DateRestriction, SearchEngine, SearchError, SearchHit};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, instrument};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

// The API rejects larger page sizes.
const MAX_PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

/// Client for the Custom Search JSON API
#[derive(Debug, Clone)]
pub struct GoogleSearch {
    http: reqwest::Client,
    api_key: String,
    engine_id: String,
    base_url: String,
}

impl GoogleSearch {
    /// Create a client with explicit credentials
    pub fn new(http: reqwest::Client, api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a client from `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`
    pub fn from_env(http: reqwest::Client) -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| Error::Auth("GOOGLE_API_KEY environment variable not set".to_string()))?;
        let engine_id = std::env::var("GOOGLE_CSE_ID")
            .map_err(|_| Error::Auth("GOOGLE_CSE_ID environment variable not set".to_string()))?;

        Ok(Self::new(http, api_key, engine_id))
    }

    /// Point the client at another host
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }
}

#[async_trait]
impl SearchEngine for GoogleSearch {
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        date_restriction: Option<DateRestriction>,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidParameters("empty query".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&max_results) {
            return Err(SearchError::InvalidParameters(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, max_results
            )));
        }

        let mut params = vec![
            ("key", self.api_key.clone()),
            ("cx", self.engine_id.clone()),
            ("q", query.to_string()),
            ("num", max_results.to_string()),
        ];
        if let Some(restriction) = date_restriction {
            params.push(("dateRestrict", restriction.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/customsearch/v1", self.base_url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed: SearchResponse = serde_json::from_str(&body)?;
            debug!("{} results for {:?}", parsed.items.len(), query);
            Ok(parsed.items)
        } else {
            error!("Search API error: {} - {}", status, body);
            if status == StatusCode::TOO_MANY_REQUESTS {
                Err(SearchError::RateLimited)
            } else {
                Err(SearchError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> GoogleSearch {
        let mut client = GoogleSearch::new(reqwest::Client::new(), "test-key", "test-cx");
        client.set_base_url(server.url());
        client
    }

    #[tokio::test]
    async fn test_search_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "test-key".into()),
                Matcher::UrlEncoded("cx".into(), "test-cx".into()),
                Matcher::UrlEncoded("q".into(), "rust async".into()),
                Matcher::UrlEncoded("num".into(), "3".into()),
                Matcher::UrlEncoded("dateRestrict".into(), "d7".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items":[
                    {"title":"A","link":"https://a.example","snippet":"first"},
                    {"title":"B","link":"https://b.example"}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let hits = client(&server)
            .search("rust async", 3, Some(DateRestriction::Days(7)))
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].link, "https://a.example");
        assert_eq!(hits[0].snippet.as_deref(), Some("first"));
        assert!(hits[1].snippet.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_items_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"kind":"customsearch#search"}"#)
            .create_async()
            .await;

        let hits = client(&server).search("nothing", 3, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let err = client(&server).search("q", 3, None).await.unwrap_err();
        assert!(matches!(err, SearchError::RateLimited));
    }

    #[tokio::test]
    async fn test_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let err = client(&server).search("q", 3, None).await.unwrap_err();
        assert!(matches!(err, SearchError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let server = Server::new_async().await;
        let client = client(&server);

        assert!(matches!(
            client.search("  ", 3, None).await,
            Err(SearchError::InvalidParameters(_))
        ));
        assert!(matches!(
            client.search("q", 0, None).await,
            Err(SearchError::InvalidParameters(_))
        ));
    }
}
