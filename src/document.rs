//! # Document Model
//!
//! Normalized documents produced by the fetch pipeline. A document is either a
//! web page ([`WebContent`]) or a video transcript ([`VideoTranscript`]); both
//! share the [`Content`] shape of body, source URL and metadata.
//!
//! Documents are immutable once built. Derived documents, such as the result
//! of an answer-extraction pass, are created with
//! [`Document::with_page_content`].

use serde::{Deserialize, Serialize};

/// Marker stored in metadata when extraction failed as a whole
pub const METADATA_ERROR: &str = "Failed to extract metadata";

/// Shared shape of every document variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content<M> {
    /// Normalized text body
    page_content: String,

    /// URL the document was retrieved from
    source: String,

    /// Variant-specific metadata
    metadata: M,
}

impl<M> Content<M> {
    /// Create a new content payload
    pub fn new(source: impl Into<String>, page_content: impl Into<String>, metadata: M) -> Self {
        Self {
            page_content: page_content.into(),
            source: source.into(),
            metadata,
        }
    }

    /// Normalized text body
    pub fn page_content(&self) -> &str {
        &self.page_content
    }

    /// URL the document was retrieved from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variant-specific metadata
    pub fn metadata(&self) -> &M {
        &self.metadata
    }
}

/// Metadata of a web page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub published_date: Option<String>,
    pub source: Option<String>,
    pub summary: Option<String>,

    /// Set when metadata extraction failed as a whole
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Metadata of a video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub channel_name: Option<String>,
    pub published_date: Option<String>,
    pub source: Option<String>,
    pub summary: Option<String>,

    /// Set when metadata extraction failed as a whole
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebMetadata {
    /// Metadata carrying only the error marker
    pub fn failed() -> Self {
        Self {
            error: Some(METADATA_ERROR.to_string()),
            ..Default::default()
        }
    }
}

impl VideoMetadata {
    /// Metadata carrying only the error marker
    pub fn failed() -> Self {
        Self {
            error: Some(METADATA_ERROR.to_string()),
            ..Default::default()
        }
    }
}

/// Metadata produced by a fetch strategy, one variant per document kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Web(WebMetadata),
    Video(VideoMetadata),
}

/// A web page document
pub type WebContent = Content<WebMetadata>;

/// A video transcript document
pub type VideoTranscript = Content<VideoMetadata>;

/// A normalized document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Document {
    Web(WebContent),
    Video(VideoTranscript),
}

impl Document {
    /// Assemble a document from its parts; the variant follows the metadata
    pub fn new(source: impl Into<String>, page_content: impl Into<String>, metadata: Metadata) -> Self {
        match metadata {
            Metadata::Web(metadata) => Document::Web(Content::new(source, page_content, metadata)),
            Metadata::Video(metadata) => {
                Document::Video(Content::new(source, page_content, metadata))
            }
        }
    }

    /// Normalized text body
    pub fn page_content(&self) -> &str {
        match self {
            Document::Web(content) => content.page_content(),
            Document::Video(content) => content.page_content(),
        }
    }

    /// URL the document was retrieved from
    pub fn source(&self) -> &str {
        match self {
            Document::Web(content) => content.source(),
            Document::Video(content) => content.source(),
        }
    }

    /// Title, if one was extracted
    pub fn title(&self) -> Option<&str> {
        match self {
            Document::Web(content) => content.metadata().title.as_deref(),
            Document::Video(content) => content.metadata().title.as_deref(),
        }
    }

    /// Whether this is a video transcript
    pub fn is_video(&self) -> bool {
        matches!(self, Document::Video(_))
    }

    /// Copy of this document with its body replaced
    pub fn with_page_content(&self, page_content: impl Into<String>) -> Document {
        match self {
            Document::Web(content) => Document::Web(Content {
                page_content: page_content.into(),
                source: content.source.clone(),
                metadata: content.metadata.clone(),
            }),
            Document::Video(content) => Document::Video(Content {
                page_content: page_content.into(),
                source: content.source.clone(),
                metadata: content.metadata.clone(),
            }),
        }
    }

    /// Metadata as an ordered field-name mapping
    pub fn metadata_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            Document::Web(content) => {
                let m = content.metadata();
                let mut fields = vec![
                    ("title", m.title.as_deref()),
                    ("description", m.description.as_deref()),
                    ("keywords", m.keywords.as_deref()),
                    ("published_date", m.published_date.as_deref()),
                    ("source", m.source.as_deref()),
                    ("summary", m.summary.as_deref()),
                ];
                if m.error.is_some() {
                    fields.push(("error", m.error.as_deref()));
                }
                fields
            }
            Document::Video(content) => {
                let m = content.metadata();
                let mut fields = vec![
                    ("title", m.title.as_deref()),
                    ("description", m.description.as_deref()),
                    ("keywords", m.keywords.as_deref()),
                    ("channel_name", m.channel_name.as_deref()),
                    ("published_date", m.published_date.as_deref()),
                    ("source", m.source.as_deref()),
                    ("summary", m.summary.as_deref()),
                ];
                if m.error.is_some() {
                    fields.push(("error", m.error.as_deref()));
                }
                fields
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_document() -> Document {
        Document::new(
            "https://example.com/a",
            "# Title\nBody",
            Metadata::Web(WebMetadata {
                title: Some("Example".to_string()),
                source: Some("https://example.com/a".to_string()),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_variant_follows_metadata() {
        assert!(!web_document().is_video());

        let video = Document::new(
            "https://youtu.be/abc",
            "hello world",
            Metadata::Video(VideoMetadata::default()),
        );
        assert!(video.is_video());
        assert_eq!(video.source(), "https://youtu.be/abc");
    }

    #[test]
    fn test_with_page_content_keeps_original() {
        let original = web_document();
        let derived = original.with_page_content("answer");

        assert_eq!(original.page_content(), "# Title\nBody");
        assert_eq!(derived.page_content(), "answer");
        assert_eq!(derived.source(), original.source());
        assert_eq!(derived.title(), Some("Example"));
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_value(web_document()).unwrap();
        assert_eq!(json["type"], "web");
        assert_eq!(json["source"], "https://example.com/a");
        assert!(json["metadata"].get("error").is_none());
        assert!(json["metadata"]["summary"].is_null());

        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back, web_document());
    }

    #[test]
    fn test_failed_metadata_marker() {
        let doc = Document::new(
            "https://youtu.be/abc",
            "",
            Metadata::Video(VideoMetadata::failed()),
        );
        let fields = doc.metadata_fields();
        assert!(fields.contains(&("error", Some(METADATA_ERROR))));
        assert!(fields.contains(&("channel_name", None)));
    }
}
