//! Video transcript retrieval
//!
//! Transcripts come from the timed-text endpoint, one request per language
//! in priority order. The first language with any text wins.

use crate::fetcher::FetchError;
use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use tracing::{debug, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// One caption line
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Provider of video transcripts
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript of `video_id` in the first available language
    async fn transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, FetchError>;
}

/// Client for the timed-text caption endpoint
#[derive(Debug, Clone)]
pub struct TimedTextClient {
    http: reqwest::Client,
    base_url: String,
}

impl TimedTextClient {
    /// Create a client against the public endpoint
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_language(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Vec<TranscriptSegment>, FetchError> {
        let url = format!("{}/api/timedtext", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("v", video_id), ("lang", language)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        parse_timed_text(&body)
    }
}

#[async_trait]
impl TranscriptSource for TimedTextClient {
    #[instrument(skip(self))]
    async fn transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, FetchError> {
        for language in languages {
            match self.fetch_language(video_id, language).await {
                Ok(segments) if segments.iter().any(|s| !s.text.is_empty()) => {
                    debug!("Found {} transcript for {}", language, video_id);
                    return Ok(segments);
                }
                Ok(_) => debug!("No {} transcript for {}", language, video_id),
                Err(e) => warn!("{} transcript for {} unavailable: {}", language, video_id, e),
            }
        }

        Err(FetchError::Transcript(format!(
            "no transcript for {} in {}",
            video_id,
            languages.join(", ")
        )))
    }
}

/// Parse a timed-text XML document into caption segments
///
/// Text is unescaped twice because caption bodies arrive double-escaped.
pub fn parse_timed_text(xml: &str) -> Result<Vec<TranscriptSegment>, FetchError> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<TranscriptSegment> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"text" => {
                let attribute = |name: &str| {
                    e.try_get_attribute(name)
                        .ok()
                        .flatten()
                        .and_then(|a| a.unescape_value().ok())
                        .and_then(|v| v.parse::<f64>().ok())
                        .unwrap_or_default()
                };
                current = Some(TranscriptSegment {
                    text: String::new(),
                    start: attribute("start"),
                    duration: attribute("dur"),
                });
            }
            Event::Text(t) => {
                if let Some(segment) = current.as_mut() {
                    let once = t.unescape()?.into_owned();
                    let twice = unescape(&once).map(|s| s.into_owned()).unwrap_or(once);
                    segment.text.push_str(&twice);
                }
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                if let Some(mut segment) = current.take() {
                    segment.text = segment.text.trim().to_string();
                    segments.push(segment);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(segments)
}

/// Join caption lines into one space-separated text
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
