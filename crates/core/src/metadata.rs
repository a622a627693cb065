use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::Document;
use crate::blocks::{BlockKind, ContentBlock};
use crate::parse::NodeRef;
use crate::postprocess::{collapse_whitespace, decode_entities};
use crate::siteconfig::SiteRule;

static BYLINE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[Bb]y\s+").unwrap());

/// Title used when the document offers none
pub const UNTITLED: &str = "Untitled";

const TITLE_SELECTORS: &[&str] = &[
    "[itemprop=headline]",
    "meta[property=\"og:title\"]",
    ".article-title",
    ".post-title",
    ".entry-title",
    "h1",
    "title",
];

const AUTHOR_SELECTORS: &[&str] = &[
    "[itemprop=author]",
    "[class*=author]",
    "[rel=author]",
    ".byline",
    ".meta-author",
    "meta[name=author]",
];

/// Candidates looked at per author selector before moving on
const AUTHOR_CANDIDATES_PER_SELECTOR: usize = 3;
const MAX_AUTHOR_CHARS: usize = 100;

const EXCERPT_MIN_CHARS: usize = 50;
const EXCERPT_MAX_CHARS: usize = 300;

/// Document-level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub excerpt: Option<String>,
}

impl Document {
    /// Extract the title with priority fallback:
    /// 1. `[itemprop=headline]` (its `content` when it is a `<meta>`)
    /// 2. Open Graph `og:title`
    /// 3. `.article-title`, `.post-title`, `.entry-title`
    /// 4. First `<h1>`
    /// 5. `<title>`
    ///
    /// Falls back to `"Untitled"`.
    pub fn extract_title(&self) -> String {
        TITLE_SELECTORS
            .iter()
            .filter_map(|selector| self.select_first(selector).ok().flatten())
            .map(|el| clean_text(&element_value(el)))
            .find(|title| !title.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Extract the author. A site rule's fixed author wins; otherwise the
    /// first non-empty candidate under 100 characters, with a leading
    /// "By " removed.
    pub fn extract_author(&self, rule: Option<&SiteRule>) -> Option<String> {
        if let Some(author) = rule.and_then(|r| r.author) {
            return Some(author.to_string());
        }

        for selector in AUTHOR_SELECTORS {
            let Ok(elements) = self.select(selector) else {
                continue;
            };
            for el in elements.into_iter().take(AUTHOR_CANDIDATES_PER_SELECTOR) {
                let text = clean_text(&element_value(el));
                if !text.is_empty() && text.chars().count() < MAX_AUTHOR_CHARS {
                    return Some(BYLINE_PREFIX_RE.replace(&text, "").into_owned());
                }
            }
        }

        None
    }

    /// Extract the site name: rule override, `og:site_name`,
    /// `application-name`, then the URL host without `www.`
    pub fn extract_site_name(&self, rule: Option<&SiteRule>) -> Option<String> {
        if let Some(name) = rule.and_then(|r| r.site_name) {
            return Some(name.to_string());
        }

        if let Some(name) = self.meta_content("og:site_name") {
            return Some(name);
        }
        if let Some(name) = self.meta_content("application-name") {
            return Some(name);
        }

        self.host().map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    /// Extract the excerpt from `og:description` or the `description` meta
    pub fn extract_excerpt(&self) -> Option<String> {
        self.meta_content("og:description").or_else(|| self.meta_content("description"))
    }

    /// Extract all metadata at once
    pub fn extract_metadata(&self, rule: Option<&SiteRule>) -> Metadata {
        Metadata {
            title: self.extract_title(),
            author: self.extract_author(rule),
            site_name: self.extract_site_name(rule),
            excerpt: self.extract_excerpt(),
        }
    }

    /// Non-empty `content` of a `<meta>` with the given name or property
    fn meta_content(&self, key: &str) -> Option<String> {
        ["name", "property"].iter().find_map(|attr| {
            let selector = format!("meta[{attr}=\"{key}\"]");
            self.select_first(&selector)
                .ok()
                .flatten()
                .and_then(|el| el.attr("content"))
                .map(clean_text)
                .filter(|content| !content.is_empty())
        })
    }
}

/// First paragraph longer than 50 characters, cut to 300
pub fn excerpt_from_blocks(blocks: &[ContentBlock]) -> Option<String> {
    let paragraph = blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Paragraph)
        .map(|b| b.content.trim())
        .find(|text| text.chars().count() > EXCERPT_MIN_CHARS)?;

    if paragraph.chars().count() > EXCERPT_MAX_CHARS {
        let cut: String = paragraph.chars().take(EXCERPT_MAX_CHARS).collect();
        Some(format!("{}...", cut.trim_end()))
    } else {
        Some(paragraph.to_string())
    }
}

/// `<meta>` elements carry their value in `content`; everything else in text
fn element_value(el: NodeRef<'_>) -> String {
    match el.tag_name() {
        Some("meta") => el.attr("content").unwrap_or_default().to_string(),
        _ => el.text(),
    }
}

fn clean_text(text: &str) -> String {
    collapse_whitespace(&decode_entities(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseConfig;
    use crate::siteconfig::BUILTIN_RULES;
    use url::Url;

    const HTML_WITH_META: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page Title</title>
            <meta name="author" content="John Doe">
            <meta name="description" content="This is a test description of the page.">
            <meta property="og:title" content="OG &amp; Title">
            <meta property="og:description" content="OG Description">
            <meta property="og:site_name" content="Example Site">
        </head>
        <body>
            <h1>Main Heading</h1>
            <p>This is the first paragraph of the content.</p>
        </body>
        </html>
    "#;

    fn parse_at(html: &str, url: &str) -> Document {
        Document::parse_with_config(html, Url::parse(url).ok(), &ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_title_prefers_og_over_headings() {
        let doc = Document::parse(HTML_WITH_META).unwrap();
        assert_eq!(doc.extract_title(), "OG & Title");
    }

    #[test]
    fn test_title_from_itemprop_headline() {
        let html = r#"<title>Page</title><h2 itemprop="headline">  Schema
            Headline </h2><h1>Heading</h1>"#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_title(), "Schema Headline");
    }

    #[test]
    fn test_title_prefers_h1_over_title_element() {
        let doc = Document::parse("<title>Site | Page</title><h1>Real Title</h1>").unwrap();
        assert_eq!(doc.extract_title(), "Real Title");
    }

    #[test]
    fn test_title_falls_back_to_title_element() {
        let doc = Document::parse("<html><head><title>Simple Page</title></head><body><p>x</p></body></html>").unwrap();
        assert_eq!(doc.extract_title(), "Simple Page");
    }

    #[test]
    fn test_title_untitled() {
        let doc = Document::parse("<p>No title anywhere</p>").unwrap();
        assert_eq!(doc.extract_title(), UNTITLED);
    }

    #[test]
    fn test_author_strips_byline_prefix() {
        let doc = Document::parse(r#"<p class="post-author">By Jane Smith</p>"#).unwrap();
        assert_eq!(doc.extract_author(None), Some("Jane Smith".to_string()));
    }

    #[test]
    fn test_author_skips_long_candidates() {
        let long = "word ".repeat(30);
        let html = format!(r#"<div class="author-bio">{long}</div><a rel="author">Ann Lee</a>"#);
        let doc = Document::parse(&html).unwrap();
        assert_eq!(doc.extract_author(None), Some("Ann Lee".to_string()));
    }

    #[test]
    fn test_author_from_meta() {
        let doc = Document::parse(HTML_WITH_META).unwrap();
        assert_eq!(doc.extract_author(None), Some("John Doe".to_string()));
    }

    #[test]
    fn test_rule_author_overrides() {
        let rule = BUILTIN_RULES.iter().find(|r| r.name == "paulgraham");
        let doc = Document::parse(HTML_WITH_META).unwrap();
        assert_eq!(doc.extract_author(rule), Some("Paul Graham".to_string()));
    }

    #[test]
    fn test_site_name_from_og() {
        let doc = Document::parse(HTML_WITH_META).unwrap();
        assert_eq!(doc.extract_site_name(None), Some("Example Site".to_string()));
    }

    #[test]
    fn test_site_name_from_host() {
        let doc = parse_at("<p>text</p>", "https://www.example.org/post");
        assert_eq!(doc.extract_site_name(None), Some("example.org".to_string()));
    }

    #[test]
    fn test_site_name_absent_without_url() {
        let doc = Document::parse("<p>text</p>").unwrap();
        assert_eq!(doc.extract_site_name(None), None);
    }

    #[test]
    fn test_excerpt_from_meta() {
        let doc = Document::parse(HTML_WITH_META).unwrap();
        assert_eq!(doc.extract_excerpt(), Some("OG Description".to_string()));
    }

    #[test]
    fn test_excerpt_from_blocks() {
        let blocks = vec![
            ContentBlock::new(BlockKind::Heading { level: 2 }, "A heading that is long enough to pass the length check"),
            ContentBlock::paragraph("Too short."),
            ContentBlock::paragraph("This paragraph is substantial enough to serve as the article excerpt."),
        ];
        let excerpt = excerpt_from_blocks(&blocks).unwrap();
        assert!(excerpt.starts_with("This paragraph"));
    }

    #[test]
    fn test_excerpt_from_blocks_truncates() {
        let blocks = vec![ContentBlock::paragraph("lorem ".repeat(100))];
        let excerpt = excerpt_from_blocks(&blocks).unwrap();
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.chars().count() <= EXCERPT_MAX_CHARS + 3);
    }

    #[test]
    fn test_extract_all_metadata() {
        let doc = parse_at(HTML_WITH_META, "https://example.com/a");
        let metadata = doc.extract_metadata(None);
        assert_eq!(metadata.title, "OG & Title");
        assert_eq!(metadata.author.as_deref(), Some("John Doe"));
        assert_eq!(metadata.site_name.as_deref(), Some("Example Site"));
        assert_eq!(metadata.excerpt.as_deref(), Some("OG Description"));
    }
}
