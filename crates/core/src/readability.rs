//! Main content extraction API.
//!
//! This module provides the primary API for turning an HTML page into an
//! [`ExtractedArticle`]. The main entry point is the [`Extractor`] struct,
//! along with the convenience function [`extract_article`].
//!
//! # Example
//!
//! ```rust
//! use sift_core::readability::extract_article;
//!
//! let html = r#"<html><head><title>Hello</title></head><body><article>
//!     <p>Readable pages keep their prose in a few well-marked paragraphs, which makes
//!     the article element the first place worth looking for the main content.</p>
//! </article></body></html>"#;
//! let article = extract_article(html, "https://example.com/hello").unwrap();
//! assert_eq!(article.title, "Hello");
//! assert_eq!(article.blocks.len(), 1);
//! ```

use url::Url;

use crate::article::ExtractedArticle;
use crate::blocks::extract_blocks;
use crate::extract::{ExtractConfig, locate_main_content};
use crate::metadata::excerpt_from_blocks;
use crate::parse::{Document, ParseConfig};
use crate::postprocess::{NormalizeConfig, normalize_blocks};
use crate::scoring::{CandidateConfig, ScoreConfig, calculate_score};
use crate::siteconfig::{SiteRule, builtin_rules, find_rule};
use crate::{Result, SiftError};

/// Tags looked at by [`Extractor::is_probably_readable`]
const READABLE_CANDIDATE_TAGS: &[&str] = &["p", "div", "article", "section", "main"];

/// Configuration for the [`Extractor`].
///
/// # Example
///
/// ```rust
/// use sift_core::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .max_nodes(20_000)
///     .min_text_length(300)
///     .words_per_minute(200.0)
///     .build();
/// assert_eq!(config.parse.max_nodes, 20_000);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Largest accepted input in bytes (default: 10 MiB).
    pub max_input_bytes: usize,

    /// Node and depth caps plus preprocessing.
    pub parse: ParseConfig,

    /// Scoring weights and candidate gates.
    pub extract: ExtractConfig,

    /// Block clean-up and reading speed.
    pub normalize: NormalizeConfig,

    /// Site rules consulted before the generic stages.
    pub rules: &'static [SiteRule],
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 10 * 1024 * 1024,
            parse: ParseConfig::default(),
            extract: ExtractConfig::default(),
            normalize: NormalizeConfig::default(),
            rules: builtin_rules(),
        }
    }
}

impl ExtractorConfig {
    /// Creates a new builder for ExtractorConfig.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractorConfig::default() }
    }

    /// Sets the input size limit in bytes.
    pub fn max_input_bytes(mut self, value: usize) -> Self {
        self.config.max_input_bytes = value;
        self
    }

    /// Sets the node cap.
    pub fn max_nodes(mut self, value: usize) -> Self {
        self.config.parse.max_nodes = value;
        self
    }

    /// Sets the nesting depth cap.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.config.parse.max_depth = value;
        self
    }

    /// Replaces the scoring weights.
    pub fn score(mut self, value: ScoreConfig) -> Self {
        self.config.extract.score = value;
        self
    }

    /// Replaces the candidate gates.
    pub fn candidate(mut self, value: CandidateConfig) -> Self {
        self.config.extract.candidate = value;
        self
    }

    /// Sets the minimum visible text length for a candidate.
    pub fn min_text_length(mut self, value: usize) -> Self {
        self.config.extract.candidate.min_text_length = value;
        self
    }

    /// Sets the maximum link ratio for a candidate.
    pub fn max_link_ratio(mut self, value: f64) -> Self {
        self.config.extract.candidate.max_link_ratio = value;
        self
    }

    /// Replaces the boilerplate phrase list.
    pub fn boilerplate_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.normalize.boilerplate_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the reading speed.
    pub fn words_per_minute(mut self, value: f64) -> Self {
        self.config.normalize.words_per_minute = value;
        self
    }

    /// Sets the site rule table; pass `&[]` to disable site rules.
    pub fn rules(mut self, rules: &'static [SiteRule]) -> Self {
        self.config.rules = rules;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

/// Main entry point for content extraction.
///
/// An extractor holds only configuration; every call is independent.
///
/// # Example
///
/// ```rust
/// use sift_core::Extractor;
///
/// let extractor = Extractor::new();
/// let html = "<html><body><p>Too short to be an article.</p></body></html>";
/// let article = extractor.extract(html, "https://example.com").unwrap();
/// assert_eq!(article.title, "Untitled");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with a custom configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the main article from `html`.
    ///
    /// `source_url` selects site rules and resolves relative image sources.
    /// A URL that does not parse is not an error: extraction continues
    /// without either.
    ///
    /// # Errors
    ///
    /// - [`SiftError::InputTooLarge`] when the input, node count, or nesting depth exceeds its cap
    /// - [`SiftError::MalformedInput`] when nothing is left after preprocessing
    /// - [`SiftError::NoContentFound`] when no stage finds content, or nothing survives normalization
    pub fn extract(&self, html: &str, source_url: &str) -> Result<ExtractedArticle> {
        if html.len() > self.config.max_input_bytes {
            return Err(SiftError::InputTooLarge { what: "input bytes", limit: self.config.max_input_bytes });
        }

        let base_url = match Url::parse(source_url) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!(source_url, error = %e, "source URL does not parse; host rules disabled");
                None
            }
        };

        let doc = Document::parse_with_config(html, base_url, &self.config.parse)?;
        tracing::debug!(nodes = doc.tree().len(), "parsed document");

        let rule = find_rule(self.config.rules, &doc);
        let mut metadata = doc.extract_metadata(rule);

        let main = locate_main_content(&doc, rule, &self.config.extract)?;
        let blocks = extract_blocks(&main.tree, main.node);
        let blocks = normalize_blocks(blocks, &metadata.title, doc.base_url(), &self.config.normalize);
        if blocks.is_empty() {
            tracing::debug!(stage = ?main.stage, "no blocks left after normalization");
            return Err(SiftError::NoContentFound);
        }

        if metadata.excerpt.is_none() {
            metadata.excerpt = excerpt_from_blocks(&blocks);
        }

        tracing::debug!(stage = ?main.stage, blocks = blocks.len(), "extracted article");
        Ok(ExtractedArticle::new(metadata, source_url, blocks, main.stage, self.config.normalize.words_per_minute))
    }

    /// Checks if a page appears readable without full extraction.
    ///
    /// True when some paragraph or container scores at least `20.0` with
    /// the configured weights.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift_core::Extractor;
    ///
    /// let reader = Extractor::new();
    /// let prose = "Plenty of words make a paragraph worth reading here. ".repeat(4);
    /// let html_article = format!("<html><body><article><p>{prose}</p></article></body></html>");
    /// let html_nav = "<html><body><nav><a href=\"#\">Link</a></nav></body></html>";
    ///
    /// assert!(reader.is_probably_readable(&html_article));
    /// assert!(!reader.is_probably_readable(html_nav));
    /// ```
    pub fn is_probably_readable(&self, html: &str) -> bool {
        self.is_probably_readable_with_threshold(html, 20.0)
    }

    fn is_probably_readable_with_threshold(&self, html: &str, threshold: f64) -> bool {
        if html.len() > self.config.max_input_bytes {
            return false;
        }
        let Ok(doc) = Document::parse_with_config(html, None, &self.config.parse) else {
            return false;
        };

        let tree = doc.tree();
        let score_config = &self.config.extract.score;

        tree.descendants(crate::DomTree::ROOT)
            .filter(|id| tree.tag_name(*id).is_some_and(|tag| READABLE_CANDIDATE_TAGS.contains(&tag)))
            .filter(|id| tree.text_len(*id) >= 25)
            .any(|id| calculate_score(tree, id, score_config).final_score >= threshold)
    }
}

/// Extracts an article with default settings.
///
/// # Errors
///
/// See [`Extractor::extract`].
pub fn extract_article(html: &str, source_url: &str) -> Result<ExtractedArticle> {
    Extractor::new().extract(html, source_url)
}

/// Extracts an article with a custom configuration.
pub fn extract_article_with_config(html: &str, source_url: &str, config: ExtractorConfig) -> Result<ExtractedArticle> {
    Extractor::with_config(config).extract(html, source_url)
}

/// Convenience function for a quick readability check with defaults.
pub fn is_probably_readable(html: &str) -> bool {
    Extractor::new().is_probably_readable(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockKind;
    use crate::extract::LocatorStage;

    fn prose(sentences: usize) -> String {
        "The quick brown fox jumps over the lazy dog near the quiet river bank. ".repeat(sentences)
    }

    #[test]
    fn test_extract_semantic_article() {
        let html = format!(
            r#"<html><head><title>Doc</title></head><body>
                <nav><a href="/">Home</a></nav>
                <article><h1>Doc</h1><p>{}</p><p>Second paragraph here.</p></article>
            </body></html>"#,
            prose(3)
        );
        let article = extract_article(&html, "https://example.com/doc").unwrap();

        assert_eq!(article.title, "Doc");
        assert_eq!(article.stage, LocatorStage::Semantic);
        assert_eq!(article.blocks.len(), 2);
        assert!(article.blocks.iter().all(|b| b.kind == BlockKind::Paragraph));
        assert_eq!(article.site_name.as_deref(), Some("example.com"));
        assert!(article.excerpt.as_deref().is_some_and(|e| e.starts_with("The quick brown fox")));
    }

    #[test]
    fn test_input_too_large() {
        let config = ExtractorConfig::builder().max_input_bytes(10).build();
        let result = extract_article_with_config("<p>more than ten bytes</p>", "https://example.com", config);
        assert_eq!(result, Err(SiftError::InputTooLarge { what: "input bytes", limit: 10 }));
    }

    #[test]
    fn test_malformed_input() {
        let result = extract_article("<script>var a = 1;</script><!-- nothing -->", "https://example.com");
        assert_eq!(result, Err(SiftError::MalformedInput));
    }

    #[test]
    fn test_invalid_url_is_not_an_error() {
        let html = format!("<body><article><p>{}</p><img src=\"a.png\"></article></body>", prose(3));
        let article = extract_article(&html, "not a url").unwrap();
        assert_eq!(article.source_url, "not a url");
        assert_eq!(article.site_name, None);
        assert!(article.blocks.iter().any(|b| b.is_image() && b.content == "a.png"));
    }

    #[test]
    fn test_image_urls_resolved() {
        let html = format!("<body><article><p>{}</p><img src=\"/img/a.png\"></article></body>", prose(3));
        let article = extract_article(&html, "https://example.com/posts/1").unwrap();
        assert!(article.blocks.iter().any(|b| b.content == "https://example.com/img/a.png"));
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let html = format!(
            r#"<body><table><tr><td><font>{}</font></td></tr></table><article><p>{}</p></article></body>"#,
            prose(2),
            prose(3)
        );
        let with_rules = extract_article(&html, "https://paulgraham.com/x.html").unwrap();
        assert_eq!(with_rules.stage, LocatorStage::SiteRule);
        assert_eq!(with_rules.author.as_deref(), Some("Paul Graham"));

        let config = ExtractorConfig::builder().rules(&[]).build();
        let without = extract_article_with_config(&html, "https://paulgraham.com/x.html", config).unwrap();
        assert_eq!(without.stage, LocatorStage::Semantic);
        assert_eq!(without.author, None);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = ExtractorConfig::builder()
            .max_input_bytes(1024)
            .max_nodes(10)
            .max_depth(5)
            .min_text_length(50)
            .max_link_ratio(0.3)
            .boilerplate_phrases(["promo"])
            .words_per_minute(100.0)
            .build();

        assert_eq!(config.max_input_bytes, 1024);
        assert_eq!(config.parse.max_nodes, 10);
        assert_eq!(config.parse.max_depth, 5);
        assert_eq!(config.extract.candidate.min_text_length, 50);
        assert_eq!(config.extract.candidate.max_link_ratio, 0.3);
        assert_eq!(config.normalize.boilerplate_phrases, vec!["promo".to_string()]);
        assert_eq!(config.normalize.words_per_minute, 100.0);
    }

    #[test]
    fn test_form_wrapped_page_yields_blocks() {
        let html = format!(
            r#"<html><body><form id="aspnetForm"><p>{}</p><p>{}</p></form></body></html>"#,
            prose(8),
            "A second paragraph with its own wording keeps both blocks apart. ".repeat(6)
        );
        let article = extract_article(&html, "https://example.com/page.aspx").unwrap();
        assert_eq!(article.stage, LocatorStage::Density);
        assert_eq!(article.blocks.len(), 2);
    }

    #[test]
    fn test_only_boilerplate_is_no_content() {
        let html = "<body><article><p>Subscribe to our newsletter</p><p>All rights reserved</p></article></body>";
        assert_eq!(extract_article(html, "https://example.com"), Err(SiftError::NoContentFound));
    }

    #[test]
    fn test_is_probably_readable() {
        let html = format!("<html><body><article><p>{}</p></article></body></html>", prose(2));
        assert!(is_probably_readable(&html));
        assert!(!is_probably_readable("<html><body><nav><a href=\"#\">Link</a></nav></body></html>"));
        assert!(!is_probably_readable(""));
    }
}
