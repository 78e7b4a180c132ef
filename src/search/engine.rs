//! Search queries, hits and the engine seam

use crate::search::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Language the query is written in
    pub language: String,

    /// Query text
    pub query: String,

    /// Only return results from the last N days; zero or less means no limit
    #[serde(default = "unrestricted")]
    pub recent_days: i32,
}

fn unrestricted() -> i32 {
    -1
}

impl SearchQuery {
    /// Create an unrestricted query
    pub fn new(language: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            query: query.into(),
            recent_days: unrestricted(),
        }
    }

    /// Restrict results to the last `days` days
    pub fn recent_days(mut self, days: i32) -> Self {
        self.recent_days = days;
        self
    }

    /// The date restriction, if the query has one
    pub fn date_restriction(&self) -> Option<DateRestriction> {
        u32::try_from(self.recent_days)
            .ok()
            .filter(|days| *days > 0)
            .map(DateRestriction::Days)
    }
}

/// Recency restriction on search results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRestriction {
    /// The last N days
    Days(u32),
}

impl fmt::Display for DateRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRestriction::Days(days) => write!(f, "d{}", days),
        }
    }
}

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result URL; empty when the engine returned none
    #[serde(default)]
    pub link: String,

    /// Result title
    #[serde(default)]
    pub title: String,

    /// Result snippet
    #[serde(default)]
    pub snippet: Option<String>,
}

/// A web search backend
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run one query, returning at most `max_results` hits
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        date_restriction: Option<DateRestriction>,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_restriction() {
        let query = SearchQuery::new("en", "rust");
        assert_eq!(query.recent_days, -1);
        assert_eq!(query.date_restriction(), None);

        assert_eq!(query.clone().recent_days(0).date_restriction(), None);
        assert_eq!(
            query.recent_days(7).date_restriction().map(|r| r.to_string()),
            Some("d7".to_string())
        );
    }

    #[test]
    fn test_query_deserialization_default() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"language":"ko","query":"러스트"}"#).unwrap();
        assert_eq!(query.recent_days, -1);
    }

    #[test]
    fn test_hit_without_link() {
        let hit: SearchHit = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert!(hit.link.is_empty());
        assert!(hit.snippet.is_none());
    }
}
