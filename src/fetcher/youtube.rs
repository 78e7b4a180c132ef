//! YouTube video strategy
//!
//! The watch page is rendered in a headless browser to read metadata; the
//! body is the video's transcript rather than page text.

use crate::document::{Metadata, VideoMetadata};
use crate::fetcher::metadata::{find_published_date, select_attr, select_text};
use crate::fetcher::selector::VIDEO_URL;
use crate::fetcher::transcript::join_segments;
use crate::fetcher::{
    BrowserConfig, BrowserSession, FetchContext, FetchError, FetchStrategy, StrategyKind,
    TranscriptSource,
};
use crate::markup::trim_lines;
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const EXPAND_DESCRIPTION: &str = "div#snippet";
const TITLE: &str = "div#title h1 yt-formatted-string";
const DESCRIPTION_HEADER: &str = "ytd-watch-info-text#ytd-watch-info-text";
const DESCRIPTION_BODY: &str =
    "ytd-text-inline-expander#description-inline-expander yt-attributed-string";
const CHANNEL: &str = "ytd-channel-name#channel-name yt-formatted-string a";

/// Resolve the video identifier of a YouTube URL
///
/// Prefers the `v` query parameter; otherwise takes the path after the host,
/// cut at the first `?`, `&` or `#`.
pub fn video_id(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        let from_query = parsed
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
        if from_query.is_some() {
            return from_query;
        }
    }

    let captured = VIDEO_URL.captures(url)?.get(1)?.as_str();
    let id = captured
        .split(['?', '&', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    (!id.is_empty()).then(|| id.to_string())
}

/// Strategy for YouTube videos
pub struct YoutubeFetcher {
    url: String,
    config: BrowserConfig,
    languages: Vec<String>,
    transcripts: Arc<dyn TranscriptSource>,
    session: Option<BrowserSession>,
    page_source: Option<String>,
}

impl YoutubeFetcher {
    /// Create a fetcher for a video URL
    pub fn new(url: &str, context: &FetchContext) -> Self {
        Self {
            url: url.to_string(),
            config: context.config.browser.clone(),
            languages: context.config.transcript_languages.clone(),
            transcripts: Arc::clone(&context.transcripts),
            session: None,
            page_source: None,
        }
    }
}

/// Parse video metadata out of a rendered watch page
pub(crate) fn video_metadata(url: &str, page_source: &str) -> VideoMetadata {
    let document = Html::parse_document(page_source);

    let description = [
        select_text(&document, DESCRIPTION_HEADER),
        select_text(&document, DESCRIPTION_BODY),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    VideoMetadata {
        title: select_text(&document, TITLE),
        description: (!description.is_empty()).then(|| description.join("\n")),
        keywords: select_attr(&document, "meta[name='keywords']", "content"),
        channel_name: select_text(&document, CHANNEL),
        published_date: find_published_date(&document, url),
        source: Some(url.to_string()),
        summary: None,
        error: None,
    }
}

#[async_trait]
impl FetchStrategy for YoutubeFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Video
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_markup(&mut self) -> Result<(), FetchError> {
        let session = self.session.insert(BrowserSession::launch(&self.config).await?);
        session.navigate(&self.url).await?;

        match session.click(EXPAND_DESCRIPTION).await {
            Ok(()) => tokio::time::sleep(self.config.expand_delay).await,
            Err(e) => warn!("Failed to expand description of {}: {}", self.url, e),
        }

        self.page_source = Some(session.page_source().await?);
        Ok(())
    }

    async fn extract_body(&mut self) -> Result<String, FetchError> {
        let Some(id) = video_id(&self.url) else {
            warn!("No video id in {}", self.url);
            return Ok(String::new());
        };

        match self.transcripts.transcript(&id, &self.languages).await {
            Ok(segments) => {
                debug!("Transcript of {} has {} segments", id, segments.len());
                Ok(join_segments(&segments))
            }
            Err(e) => {
                warn!("Failed to fetch transcript for {}: {}", self.url, e);
                Ok(String::new())
            }
        }
    }

    fn normalize(&self, body: &str) -> String {
        trim_lines(body)
    }

    async fn extract_metadata(&mut self) -> Metadata {
        match &self.page_source {
            Some(source) => Metadata::Video(video_metadata(&self.url, source)),
            None => {
                warn!("No page source captured for {}", self.url);
                Metadata::Video(VideoMetadata::failed())
            }
        }
    }

    async fn release_resources(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::fetcher::{FetcherConfig, TranscriptSegment};
    use std::sync::Mutex;

    struct StubTranscripts {
        requested: Mutex<Vec<(String, Vec<String>)>>,
        segments: Option<Vec<&'static str>>,
    }

    #[async_trait]
    impl TranscriptSource for StubTranscripts {
        async fn transcript(
            &self,
            video_id: &str,
            languages: &[String],
        ) -> Result<Vec<TranscriptSegment>, FetchError> {
            self.requested
                .lock()
                .unwrap()
                .push((video_id.to_string(), languages.to_vec()));
            match &self.segments {
                Some(lines) => Ok(lines
                    .iter()
                    .map(|text| TranscriptSegment {
                        text: text.to_string(),
                        start: 0.0,
                        duration: 1.0,
                    })
                    .collect()),
                None => Err(FetchError::Transcript("none".to_string())),
            }
        }
    }

    fn fetcher(url: &str, segments: Option<Vec<&'static str>>) -> (YoutubeFetcher, Arc<StubTranscripts>) {
        let stub = Arc::new(StubTranscripts {
            requested: Mutex::new(Vec::new()),
            segments,
        });
        let context = FetchContext::new(FetcherConfig::default(), Arc::new(MemoryCache::new()))
            .unwrap()
            .with_transcript_source(stub.clone());
        (YoutubeFetcher::new(url, &context), stub)
    }

    #[test]
    fn test_video_id() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(video_id("https://youtu.be/abc123?t=10").as_deref(), Some("abc123"));
        assert_eq!(video_id("youtube.com/watch?v=q1").as_deref(), Some("q1"));
        assert_eq!(video_id("https://example.com/watch"), None);
    }

    #[tokio::test]
    async fn test_body_is_joined_transcript() {
        let (mut fetcher, stub) = fetcher(
            "https://www.youtube.com/watch?v=abc",
            Some(vec!["hello", "world"]),
        );

        let body = fetcher.extract_body().await.unwrap();

        assert_eq!(fetcher.normalize(&body), "hello world");
        let requested = stub.requested.lock().unwrap();
        assert_eq!(requested[0].0, "abc");
        assert_eq!(requested[0].1, vec!["ko", "en", "ja"]);
    }

    #[tokio::test]
    async fn test_missing_transcript_is_empty_body() {
        let (mut fetcher, _stub) = fetcher("https://youtu.be/abc", None);
        assert_eq!(fetcher.extract_body().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_metadata_without_page_source() {
        let (mut fetcher, _stub) = fetcher("https://youtu.be/abc", None);
        assert_eq!(
            fetcher.extract_metadata().await,
            Metadata::Video(VideoMetadata::failed())
        );
    }

    #[test]
    fn test_video_metadata_fields_are_independent() {
        let page = r#"<html><head>
            <meta name="keywords" content="rust, talk">
            <meta itemprop="datePublished" content="2024-05-01T00:00:00-07:00">
        </head><body>
            <div id="title"><h1><yt-formatted-string>Talk title</yt-formatted-string></h1></div>
            <ytd-text-inline-expander id="description-inline-expander">
                <yt-attributed-string>Full description</yt-attributed-string>
            </ytd-text-inline-expander>
        </body></html>"#;

        let metadata = video_metadata("https://youtu.be/abc", page);

        assert_eq!(metadata.title.as_deref(), Some("Talk title"));
        assert_eq!(metadata.description.as_deref(), Some("Full description"));
        assert_eq!(metadata.keywords.as_deref(), Some("rust, talk"));
        assert_eq!(metadata.published_date.as_deref(), Some("2024-05-01"));
        assert!(metadata.channel_name.is_none());
        assert!(metadata.error.is_none());
    }
}
