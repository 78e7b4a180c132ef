//! GitHub blob strategies
//!
//! Blob views render client-side, so these strategies drive a headless
//! browser. The three blob kinds share session handling and metadata and
//! differ only in where the content lives.

use crate::document::{Metadata, WebMetadata};
use crate::fetcher::metadata::normalize_date;
use crate::fetcher::{BrowserConfig, BrowserSession, FetchContext, FetchError, FetchStrategy, StrategyKind};
use async_trait::async_trait;
use quick_xml::escape::escape;
use tracing::{debug, warn};
use url::Url;

const MARKDOWN_BODY: &str = "article.markdown-body";
const NOTEBOOK_FRAME: &str = "iframe";
const NOTEBOOK_CONTAINER: &str = "div#notebook-container";
const CODE_TEXTAREA: &str = "textarea#read-only-cursor-text-area";
const COMMIT_TIME: &str = "relative-time";

/// Which kind of blob view is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GithubBlob {
    /// Jupyter notebook rendered inside an iframe
    Notebook,
    /// Rendered markdown file
    Markdown,
    /// Source file shown in the code viewer
    Code,
}

/// Strategy for GitHub blob pages
pub struct GithubFetcher {
    url: String,
    blob: GithubBlob,
    config: BrowserConfig,
    session: Option<BrowserSession>,
}

impl GithubFetcher {
    /// Create a fetcher for a blob URL
    pub fn new(url: &str, blob: GithubBlob, context: &FetchContext) -> Self {
        Self {
            url: url.to_string(),
            blob,
            config: context.config.browser.clone(),
            session: None,
        }
    }

    fn session(&self) -> Result<&BrowserSession, FetchError> {
        self.session
            .as_ref()
            .ok_or_else(|| FetchError::Browser("browser session not started".to_string()))
    }

    async fn notebook_html(&self, session: &BrowserSession) -> Result<Option<String>, FetchError> {
        let Some(src) = session.wait_for_attribute(NOTEBOOK_FRAME, "src").await? else {
            return Ok(None);
        };
        let frame_url = Url::parse(&self.url)?.join(&src)?;
        debug!("Reading notebook frame {}", frame_url);

        session
            .property_in_new_tab(frame_url.as_str(), NOTEBOOK_CONTAINER, "innerHTML")
            .await
    }
}

/// Wrap source text so the normalizer renders it as a code block
pub(crate) fn code_block(source: &str) -> String {
    format!("<pre><code>{}</code></pre>", escape(source))
}

#[async_trait]
impl FetchStrategy for GithubFetcher {
    fn kind(&self) -> StrategyKind {
        match self.blob {
            GithubBlob::Notebook => StrategyKind::GithubNotebook,
            GithubBlob::Markdown => StrategyKind::GithubMarkdown,
            GithubBlob::Code => StrategyKind::GithubCode,
        }
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_markup(&mut self) -> Result<(), FetchError> {
        let session = self.session.insert(BrowserSession::launch(&self.config).await?);
        session.navigate(&self.url).await
    }

    async fn extract_body(&mut self) -> Result<String, FetchError> {
        let session = self.session()?;

        let content = match self.blob {
            GithubBlob::Markdown => session.wait_for_property(MARKDOWN_BODY, "innerHTML").await,
            GithubBlob::Notebook => self.notebook_html(session).await,
            GithubBlob::Code => session
                .wait_for_property(CODE_TEXTAREA, "value")
                .await
                .map(|source| source.map(|s| code_block(&s))),
        };

        match content {
            Ok(Some(html)) => Ok(html),
            Ok(None) => {
                warn!("No {:?} content found in {}", self.blob, self.url);
                Ok(String::new())
            }
            Err(e) => {
                warn!("Failed to extract {:?} content for {}: {}", self.blob, self.url, e);
                Ok(String::new())
            }
        }
    }

    async fn extract_metadata(&mut self) -> Metadata {
        let Ok(session) = self.session() else {
            return Metadata::Web(WebMetadata::failed());
        };

        let title = match session.title().await {
            Ok(title) if !title.trim().is_empty() => Some(title.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read title of {}: {}", self.url, e);
                None
            }
        };

        let published_date = session
            .poll_attribute(COMMIT_TIME, "datetime")
            .await
            .map(|raw| normalize_date(&raw).unwrap_or(raw));

        Metadata::Web(WebMetadata {
            title,
            description: None,
            keywords: None,
            published_date,
            source: Some(self.url.clone()),
            summary: None,
            error: None,
        })
    }

    async fn release_resources(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }
}
