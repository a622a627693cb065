//! Article output type with content blocks, metadata, and format conversion.
//!
//! This module defines the [`ExtractedArticle`] struct which represents the
//! complete result of content extraction: the typed blocks of the main
//! content, document metadata, and derived metrics.

use serde::Serialize;

use crate::Result;
use crate::blocks::ContentBlock;
use crate::extract::LocatorStage;
use crate::formatters::{JsonConfig, MarkdownConfig, TextConfig, convert_to_json, convert_to_markdown, convert_to_text};
use crate::metadata::Metadata;
use crate::postprocess::reading_seconds;
use crate::scoring::count_words;

/// Output format options for an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown, optionally with TOML frontmatter.
    Markdown,
    /// Plain text.
    PlainText,
    /// JSON (structured data).
    Json,
}

/// The complete result of reading an HTML document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedArticle {
    /// Article title; `"Untitled"` when the page has none.
    pub title: String,

    pub author: Option<String>,

    pub site_name: Option<String>,

    /// Short summary from the page's description meta or first paragraph.
    pub excerpt: Option<String>,

    /// Source URL as supplied by the caller.
    pub source_url: String,

    /// Main content in document order.
    pub blocks: Vec<ContentBlock>,

    /// Word count over all textual blocks.
    pub word_count: usize,

    /// Estimated reading time in seconds.
    pub estimated_reading_seconds: f64,

    /// Locator stage that produced the content.
    pub stage: LocatorStage,
}

impl ExtractedArticle {
    /// Builds an article from its parts, deriving word count and reading time.
    pub fn new(
        metadata: Metadata, source_url: impl Into<String>, blocks: Vec<ContentBlock>, stage: LocatorStage,
        words_per_minute: f64,
    ) -> Self {
        let word_count = blocks.iter().filter(|b| !b.is_image()).map(|b| count_words(&b.content)).sum();
        let Metadata { title, author, site_name, excerpt } = metadata;

        Self {
            title,
            author,
            site_name,
            excerpt,
            source_url: source_url.into(),
            blocks,
            word_count,
            estimated_reading_seconds: reading_seconds(word_count, words_per_minute),
            stage,
        }
    }

    /// Reading time in whole minutes, never less than one.
    pub fn reading_minutes(&self) -> u64 {
        ((self.estimated_reading_seconds / 60.0).ceil() as u64).max(1)
    }

    /// The metadata fields of this article.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            title: self.title.clone(),
            author: self.author.clone(),
            site_name: self.site_name.clone(),
            excerpt: self.excerpt.clone(),
        }
    }

    /// Converts the article to the specified format with default settings.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::PlainText => Ok(self.to_text()),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// Markdown without frontmatter.
    pub fn to_markdown(&self) -> String {
        convert_to_markdown(self, &MarkdownConfig::default())
    }

    /// Markdown with custom configuration.
    pub fn to_markdown_with_config(&self, config: &MarkdownConfig) -> String {
        convert_to_markdown(self, config)
    }

    /// Plain text, unwrapped and without a header.
    pub fn to_text(&self) -> String {
        convert_to_text(self, &TextConfig::default())
    }

    /// Compact JSON.
    pub fn to_json(&self) -> Result<String> {
        convert_to_json(self, &JsonConfig::default())
    }
}
