use crate::article::ExtractedArticle;
use crate::blocks::{BlockKind, ContentBlock};
use crate::postprocess::collapse_blank_lines;

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// Wrap lines at specified width (0 = no wrapping)
    pub line_width: usize,

    /// Include metadata header
    pub include_header: bool,
}

/// Plain text formatter for articles
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, article: &ExtractedArticle) -> String {
        convert_to_text(article, &self.config)
    }
}

/// Convert an article to plain text. Blocks are separated by blank lines,
/// list items by single newlines; code keeps its layout and is never wrapped.
pub fn convert_to_text(article: &ExtractedArticle, config: &TextConfig) -> String {
    let mut output = String::new();

    if config.include_header {
        output.push_str(&generate_header(article));
    }

    let mut previous_was_list = false;
    for block in &article.blocks {
        let Some(text) = render_block(block, config.line_width) else {
            continue;
        };
        let is_list = matches!(block.kind, BlockKind::List { .. });
        if !output.is_empty() {
            output.push_str(if is_list && previous_was_list { "\n" } else { "\n\n" });
        }
        output.push_str(&text);
        previous_was_list = is_list;
    }

    collapse_blank_lines(output.trim_end())
}

fn render_block(block: &ContentBlock, width: usize) -> Option<String> {
    let text = match &block.kind {
        BlockKind::Code => return Some(block.content.clone()),
        BlockKind::Image { alt } => return alt.as_deref().filter(|a| !a.is_empty()).map(|a| format!("[Image: {a}]")),
        BlockKind::List { .. } => return Some(indent_wrapped("- ", &block.content, width)),
        BlockKind::Quote => return Some(indent_wrapped("  ", &block.content, width)),
        BlockKind::Heading { .. } | BlockKind::Paragraph => &block.content,
    };
    Some(wrap_text(text, width))
}

/// Generate a header from article metadata
fn generate_header(article: &ExtractedArticle) -> String {
    let mut header = String::new();

    header.push_str(&article.title);
    header.push('\n');
    header.push_str(&"=".repeat(article.title.chars().count()));
    header.push('\n');

    let mut meta_parts = Vec::new();

    if let Some(author) = &article.author {
        meta_parts.push(format!("By: {}", author));
    }

    if let Some(site) = &article.site_name {
        meta_parts.push(format!("Site: {}", site));
    }

    meta_parts.push(format!("{} min read", article.reading_minutes()));

    header.push_str(&meta_parts.join(" | "));
    header
}

/// Prefix the first line with `marker` and indent continuation lines to match
fn indent_wrapped(marker: &str, text: &str, width: usize) -> String {
    let inner = if width > marker.len() { width - marker.len() } else { 0 };
    let padding = " ".repeat(marker.len());
    wrap_text(text, inner)
        .lines()
        .enumerate()
        .map(|(i, line)| if i == 0 { format!("{marker}{line}") } else { format!("{padding}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap text to specified line width
fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    wrap_words(&words, width)
}

/// Wrap a slice of words to specified width
fn wrap_words(words: &[&str], width: usize) -> String {
    let mut lines = Vec::new();
    let mut current_line = Vec::new();
    let mut current_length = 0;

    for &word in words {
        let word_len = word.chars().count();

        if current_length == 0 {
            current_line.push(word);
            current_length = word_len;
        } else if current_length + 1 + word_len <= width {
            current_length += 1 + word_len;
            current_line.push(word);
        } else {
            lines.push(current_line.join(" "));
            current_line = vec![word];
            current_length = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line.join(" "));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::LocatorStage;
    use crate::metadata::Metadata;

    fn article(blocks: Vec<ContentBlock>) -> ExtractedArticle {
        let metadata = Metadata {
            title: "Title".to_string(),
            author: Some("Author".to_string()),
            site_name: Some("Site".to_string()),
            ..Default::default()
        };
        ExtractedArticle::new(metadata, "https://example.com", blocks, LocatorStage::SiteRule, 250.0)
    }

    #[test]
    fn test_blocks_separated_by_blank_lines() {
        let blocks = vec![
            ContentBlock::new(BlockKind::Heading { level: 2 }, "Heading"),
            ContentBlock::paragraph("First paragraph."),
            ContentBlock::new(BlockKind::List { ordered: false }, "one"),
            ContentBlock::new(BlockKind::List { ordered: true }, "two"),
            ContentBlock::paragraph("After."),
        ];
        let text = convert_to_text(&article(blocks), &TextConfig::default());
        assert_eq!(text, "Heading\n\nFirst paragraph.\n\n- one\n- two\n\nAfter.");
    }

    #[test]
    fn test_code_is_not_wrapped() {
        let code = "fn main() { let a_long_identifier = another_long_identifier; }";
        let blocks = vec![ContentBlock::new(BlockKind::Code, code)];
        let config = TextConfig { line_width: 10, ..Default::default() };
        assert_eq!(convert_to_text(&article(blocks), &config), code);
    }

    #[test]
    fn test_images_render_alt_text_only() {
        let blocks = vec![
            ContentBlock::new(BlockKind::Image { alt: Some("A cat".to_string()) }, "cat.png"),
            ContentBlock::new(BlockKind::Image { alt: None }, "dog.png"),
        ];
        assert_eq!(convert_to_text(&article(blocks), &TextConfig::default()), "[Image: A cat]");
    }

    #[test]
    fn test_header() {
        let config = TextConfig { include_header: true, ..Default::default() };
        let text = convert_to_text(&article(vec![ContentBlock::paragraph("Body")]), &config);
        assert_eq!(text, "Title\n=====\nBy: Author | Site: Site | 1 min read\n\nBody");
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a long line of text that should be wrapped";
        let wrapped = wrap_text(text, 20);
        assert!(wrapped.lines().all(|line| line.chars().count() <= 20));
        assert_eq!(wrapped.split_whitespace().collect::<Vec<_>>().join(" "), text);
    }

    #[test]
    fn test_list_item_continuation_is_indented() {
        assert_eq!(indent_wrapped("- ", "alpha beta gamma", 12), "- alpha beta\n  gamma");
    }
}
