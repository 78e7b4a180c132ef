//! Fetch strategy selection

use crate::fetcher::{
    BlogFetcher, FetchContext, FetchStrategy, GenericFetcher, GithubBlob, GithubFetcher,
    WikiFetcher, YoutubeFetcher,
};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

pub(crate) static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be)/(?:watch\?v=)?(.+)")
        .expect("valid video url pattern")
});

const CODE_HOST: &str = "github.com";
const WIKI_HOST: &str = "namu.wiki";
const BLOG_HOST: &str = "blog.naver.com";

/// The closed set of fetch strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Generic,
    Video,
    GithubNotebook,
    GithubMarkdown,
    GithubCode,
    Wiki,
    Blog,
}

impl StrategyKind {
    /// Name used as the cache key prefix
    pub fn cache_name(self) -> &'static str {
        match self {
            StrategyKind::Generic => "GenericFetcher",
            StrategyKind::Video => "YouTubeFetcher",
            StrategyKind::GithubNotebook => "GitHubNotebookFetcher",
            StrategyKind::GithubMarkdown => "GitHubMarkdownFetcher",
            StrategyKind::GithubCode => "GitHubCodeBlobFetcher",
            StrategyKind::Wiki => "NamuWikiFetcher",
            StrategyKind::Blog => "NaverBlogFetcher",
        }
    }

    /// Instantiate the strategy for `url`
    pub fn build(self, url: &str, context: &FetchContext) -> Box<dyn FetchStrategy> {
        match self {
            StrategyKind::Generic => Box::new(GenericFetcher::new(url, context)),
            StrategyKind::Video => Box::new(YoutubeFetcher::new(url, context)),
            StrategyKind::GithubNotebook => {
                Box::new(GithubFetcher::new(url, GithubBlob::Notebook, context))
            }
            StrategyKind::GithubMarkdown => {
                Box::new(GithubFetcher::new(url, GithubBlob::Markdown, context))
            }
            StrategyKind::GithubCode => Box::new(GithubFetcher::new(url, GithubBlob::Code, context)),
            StrategyKind::Wiki => Box::new(WikiFetcher::new(url, context)),
            StrategyKind::Blog => Box::new(BlogFetcher::new(url, context)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_name())
    }
}

/// Pick the fetch strategy for a URL
///
/// Total and side-effect free. The first matching rule wins:
/// video pattern, code-hosting blob, wiki host, blog host, then generic.
pub fn select(url: &str) -> StrategyKind {
    if VIDEO_URL.is_match(url) {
        return StrategyKind::Video;
    }

    let (host, path) = match Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_string(),
            parsed.path().to_string(),
        ),
        Err(_) => (String::new(), String::new()),
    };

    if host.contains(CODE_HOST) && path.contains("blob") {
        if path.ends_with(".ipynb") {
            StrategyKind::GithubNotebook
        } else if path.ends_with(".md") {
            StrategyKind::GithubMarkdown
        } else {
            StrategyKind::GithubCode
        }
    } else if host.contains(WIKI_HOST) {
        StrategyKind::Wiki
    } else if host.contains(BLOG_HOST) {
        StrategyKind::Blog
    } else {
        StrategyKind::Generic
    }
}

/// Rewrite a desktop blog URL to its mobile rendering
pub fn mobile_blog_url(url: &str) -> String {
    url.replace("/blog.naver.com/", "/m.blog.naver.com/")
}
