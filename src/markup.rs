//! Markup normalization
//!
//! Converts HTML fragments into line-trimmed Markdown, optionally dropping
//! images and links.

use html2md::parse_html;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").expect("valid image pattern"));

// Images match too (group 1 is `!`) and are left for the image option.
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)]*)\)").expect("valid link pattern"));

/// Toggles for what the Markdown output keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Keep `![alt](src)` images
    pub include_images: bool,

    /// Keep `[text](href)` links; when false only the link text remains
    pub include_links: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_images: false,
            include_links: true,
        }
    }
}

impl MarkdownOptions {
    /// Keep both images and links
    pub fn rich() -> Self {
        Self {
            include_images: true,
            include_links: true,
        }
    }
}

/// Convert HTML to line-trimmed Markdown
///
/// # Arguments
///
/// * `html` - The HTML fragment or page to convert
/// * `options` - Which inline elements to keep
///
/// # Returns
///
/// The converted Markdown, every line stripped of surrounding whitespace
pub fn html_to_markdown(html: &str, options: MarkdownOptions) -> String {
    let mut markdown = parse_html(html);

    if !options.include_images {
        markdown = IMAGE.replace_all(&markdown, "").into_owned();
    }
    if !options.include_links {
        markdown = LINK
            .replace_all(&markdown, |caps: &Captures| {
                if caps[1].is_empty() {
                    caps[2].to_string()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
    }

    trim_lines(&markdown)
}

/// Strip surrounding whitespace from every line
pub fn trim_lines(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<div>
        <h1>Heading</h1>
        <p>   Read the <a href="https://example.com/docs">docs</a> first.   </p>
        <p><img src="https://example.com/cat.png" alt="cat"></p>
    </div>"#;

    #[test]
    fn test_default_keeps_links_drops_images() {
        let markdown = html_to_markdown(HTML, MarkdownOptions::default());

        assert!(markdown.contains("Heading"));
        assert!(markdown.contains("[docs](https://example.com/docs)"));
        assert!(!markdown.contains("cat.png"));
    }

    #[test]
    fn test_rich_keeps_images() {
        let markdown = html_to_markdown(HTML, MarkdownOptions::rich());
        assert!(markdown.contains("![cat](https://example.com/cat.png)"));
    }

    #[test]
    fn test_links_stripped_to_text() {
        let options = MarkdownOptions {
            include_images: true,
            include_links: false,
        };
        let markdown = html_to_markdown(HTML, options);

        assert!(markdown.contains("docs"));
        assert!(!markdown.contains("https://example.com/docs"));
        assert!(markdown.contains("![cat](https://example.com/cat.png)"));
    }

    #[test]
    fn test_adjacent_links_stripped() {
        let options = MarkdownOptions {
            include_images: true,
            include_links: false,
        };
        let markdown = html_to_markdown(
            r#"<p><a href="https://x.test/">a</a><a href="https://y.test/">b</a></p>"#,
            options,
        );

        assert_eq!(markdown.trim(), "ab");
    }

    #[test]
    fn test_link_at_line_start_stripped() {
        let options = MarkdownOptions {
            include_images: false,
            include_links: false,
        };
        let markdown = html_to_markdown(
            r#"<p><a href="https://x.test/">first</a> then <img src="https://x.test/i.png" alt="pic"></p>"#,
            options,
        );

        assert!(markdown.starts_with("first then"));
        assert!(!markdown.contains("x.test"));
        assert!(!markdown.contains("pic"));
    }

    #[test]
    fn test_lines_are_trimmed() {
        let markdown = html_to_markdown(HTML, MarkdownOptions::default());
        for line in markdown.lines() {
            assert_eq!(line, line.trim());
        }
    }

    #[test]
    fn test_trim_lines() {
        assert_eq!(trim_lines("  a  \n\tb\n"), "a\nb");
    }
}
