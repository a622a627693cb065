use crate::article::ExtractedArticle;
use crate::blocks::{BlockKind, BlockMetadata, ContentBlock};

/// Configuration for Markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Include TOML frontmatter with metadata
    pub include_frontmatter: bool,
    /// Include title as H1 heading at the start of content
    pub include_title_heading: bool,
    /// Strip images from output
    pub strip_images: bool,
}

/// Convert an article's blocks to Markdown with optional frontmatter
pub fn convert_to_markdown(article: &ExtractedArticle, config: &MarkdownConfig) -> String {
    let mut output = String::new();

    if config.include_frontmatter {
        output.push_str(&generate_frontmatter(article));
        output.push('\n');
    }

    if config.include_title_heading {
        output.push_str(&format!("# {}\n\n", article.title));
    }

    let blocks = article.blocks.iter().filter(|b| !(config.strip_images && b.is_image()));
    output.push_str(&render_blocks(blocks));
    output
}

/// Render blocks separated by blank lines. Consecutive list items of the
/// same kind form one list.
fn render_blocks<'a>(blocks: impl Iterator<Item = &'a ContentBlock>) -> String {
    let mut output = String::new();
    let mut previous: Option<&BlockKind> = None;
    let mut item_number = 0;

    for block in blocks {
        let continues_list = matches!(
            (previous, &block.kind),
            (Some(BlockKind::List { ordered: a }), BlockKind::List { ordered: b }) if a == b
        );
        item_number = if continues_list { item_number + 1 } else { 1 };

        if previous.is_some() {
            output.push_str(if continues_list { "\n" } else { "\n\n" });
        }
        output.push_str(&render_block(block, item_number));
        previous = Some(&block.kind);
    }

    if !output.is_empty() {
        output.push('\n');
    }
    output
}

fn render_block(block: &ContentBlock, item_number: usize) -> String {
    let text = || emphasize(&block.content, block.metadata);
    match &block.kind {
        BlockKind::Paragraph => text(),
        BlockKind::Heading { level } => format!("{} {}", "#".repeat(usize::from((*level).clamp(1, 6))), text()),
        BlockKind::Quote => text().lines().map(|line| format!("> {line}")).collect::<Vec<_>>().join("\n"),
        BlockKind::List { ordered: true } => format!("{item_number}. {}", text()),
        BlockKind::List { ordered: false } => format!("- {}", text()),
        BlockKind::Code => {
            let fence = code_fence(&block.content);
            format!("{fence}\n{}\n{fence}", block.content)
        }
        BlockKind::Image { alt } => {
            format!("![{}]({})", escape_brackets(alt.as_deref().unwrap_or_default()), block.content)
        }
    }
}

fn emphasize(text: &str, metadata: BlockMetadata) -> String {
    match (metadata.bold, metadata.emphasis) {
        (true, true) => format!("***{text}***"),
        (true, false) => format!("**{text}**"),
        (false, true) => format!("*{text}*"),
        (false, false) => text.to_string(),
    }
}

/// A backtick fence longer than any backtick run inside the code
fn code_fence(code: &str) -> String {
    let longest = code.split(|c| c != '`').map(str::len).max().unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn escape_brackets(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}

/// Generate TOML frontmatter from article metadata
fn generate_frontmatter(article: &ExtractedArticle) -> String {
    let mut frontmatter = String::from("+++");

    frontmatter.push_str(&format!("\ntitle = {}", toml_escape_string(&article.title)));

    if let Some(author) = &article.author {
        frontmatter.push_str(&format!("\nauthor = {}", toml_escape_string(author)));
    }

    if let Some(site) = &article.site_name {
        frontmatter.push_str(&format!("\nsite = {}", toml_escape_string(site)));
    }

    if let Some(excerpt) = &article.excerpt {
        frontmatter.push_str(&format!("\nexcerpt = {}", toml_escape_string(excerpt)));
    }

    if !article.source_url.is_empty() {
        frontmatter.push_str(&format!("\nsource_url = {}", toml_escape_string(&article.source_url)));
    }

    frontmatter.push_str(&format!("\nword_count = {}", article.word_count));
    frontmatter.push_str(&format!("\nreading_time_minutes = {}", article.reading_minutes()));
    frontmatter.push_str("\n+++\n");

    frontmatter
}

/// Escape a string as a TOML basic string
fn toml_escape_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    format!("\"{escaped}\"")
}

/// Markdown formatter with configurable options
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, article: &ExtractedArticle) -> String {
        convert_to_markdown(article, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::LocatorStage;
    use crate::metadata::Metadata;

    fn article(blocks: Vec<ContentBlock>) -> ExtractedArticle {
        let metadata = Metadata {
            title: "A \"quoted\" title".to_string(),
            author: Some("Jane".to_string()),
            ..Default::default()
        };
        ExtractedArticle::new(metadata, "https://example.com/post", blocks, LocatorStage::Semantic, 250.0)
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let blocks = vec![
            ContentBlock::new(BlockKind::Heading { level: 2 }, "Section"),
            ContentBlock::paragraph("This is a paragraph."),
        ];
        let markdown = convert_to_markdown(&article(blocks), &MarkdownConfig::default());
        assert_eq!(markdown, "## Section\n\nThis is a paragraph.\n");
    }

    #[test]
    fn test_formatting_metadata() {
        let bold = BlockMetadata { bold: true, emphasis: false };
        let both = BlockMetadata { bold: true, emphasis: true };
        let blocks = vec![
            ContentBlock::paragraph("strong").with_metadata(bold),
            ContentBlock::paragraph("loud").with_metadata(both),
        ];
        let markdown = convert_to_markdown(&article(blocks), &MarkdownConfig::default());
        assert_eq!(markdown, "**strong**\n\n***loud***\n");
    }

    #[test]
    fn test_consecutive_list_items_form_one_list() {
        let blocks = vec![
            ContentBlock::new(BlockKind::List { ordered: true }, "one"),
            ContentBlock::new(BlockKind::List { ordered: true }, "two"),
            ContentBlock::new(BlockKind::List { ordered: false }, "dot"),
        ];
        let markdown = convert_to_markdown(&article(blocks), &MarkdownConfig::default());
        assert_eq!(markdown, "1. one\n2. two\n\n- dot\n");
    }

    #[test]
    fn test_code_and_quote() {
        let blocks = vec![
            ContentBlock::new(BlockKind::Code, "let x = `y`;\nx"),
            ContentBlock::new(BlockKind::Quote, "wise words"),
        ];
        let markdown = convert_to_markdown(&article(blocks), &MarkdownConfig::default());
        assert_eq!(markdown, "```\nlet x = `y`;\nx\n```\n\n> wise words\n");
    }

    #[test]
    fn test_images() {
        let blocks = vec![ContentBlock::new(BlockKind::Image { alt: Some("A [photo]".to_string()) }, "photo.jpg")];
        let markdown = convert_to_markdown(&article(blocks.clone()), &MarkdownConfig::default());
        assert_eq!(markdown, "![A \\[photo\\]](photo.jpg)\n");

        let config = MarkdownConfig { strip_images: true, ..Default::default() };
        assert_eq!(convert_to_markdown(&article(blocks), &config), "");
    }

    #[test]
    fn test_frontmatter() {
        let config = MarkdownConfig { include_frontmatter: true, include_title_heading: true, ..Default::default() };
        let markdown = convert_to_markdown(&article(vec![ContentBlock::paragraph("Body")]), &config);

        assert!(markdown.starts_with("+++\ntitle = \"A \\\"quoted\\\" title\"\nauthor = \"Jane\""));
        assert!(markdown.contains("source_url = \"https://example.com/post\""));
        assert!(markdown.contains("word_count = 1\nreading_time_minutes = 1\n+++\n"));
        assert!(markdown.ends_with("# A \"quoted\" title\n\nBody\n"));
    }

    #[test]
    fn test_toml_escape_string() {
        assert_eq!(toml_escape_string("plain"), "\"plain\"");
        assert_eq!(toml_escape_string("a\\b\n"), "\"a\\\\b\\n\"");
    }
}
