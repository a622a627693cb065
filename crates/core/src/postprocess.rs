use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use crate::blocks::{BlockKind, ContentBlock};

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});").unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());

/// Named entities decoded by [`decode_entities`]
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("nbsp", " "),
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("hellip", "\u{2026}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201C}"),
    ("rdquo", "\u{201D}"),
    ("copy", "\u{00A9}"),
    ("reg", "\u{00AE}"),
    ("trade", "\u{2122}"),
    ("middot", "\u{00B7}"),
    ("bull", "\u{2022}"),
];

/// Phrases that mark newsletter and social chrome rather than article text
pub const DEFAULT_BOILERPLATE_PHRASES: &[&str] = &[
    "subscribe",
    "share this post",
    "copyright",
    "all rights reserved",
    "privacy policy",
    "terms of service",
    "skip to content",
    "min read",
    "discussion about this post",
    "copy link",
    "discover more from",
    "continue reading",
    "ready for more?",
    "get the app",
    "start writing",
    "collection notice",
    "restacks",
];

/// Configuration for block normalization
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Lowercase phrases; a textual block containing any of them is dropped
    pub boilerplate_phrases: Vec<String>,
    /// Reading speed used for the reading-time estimate
    pub words_per_minute: f64,
    /// Whether to resolve relative image sources against the page URL
    pub resolve_image_urls: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            boilerplate_phrases: DEFAULT_BOILERPLATE_PHRASES.iter().map(|s| s.to_string()).collect(),
            words_per_minute: 250.0,
            resolve_image_urls: true,
        }
    }
}

/// Clean extracted blocks: decode and collapse text, drop break markers and
/// empty blocks, filter boilerplate and duplicates, drop the heading that
/// repeats the title, and resolve image sources.
pub fn normalize_blocks(
    blocks: Vec<ContentBlock>, title: &str, base_url: Option<&Url>, config: &NormalizeConfig,
) -> Vec<ContentBlock> {
    let cleaned: Vec<ContentBlock> = blocks.into_iter().map(clean_block).filter(|b| !is_empty_block(b)).collect();
    let before = cleaned.len();

    let filtered = filter_boilerplate(cleaned, &config.boilerplate_phrases);
    let mut blocks = remove_title_heading(dedupe_blocks(filtered), title);

    if config.resolve_image_urls
        && let Some(base) = base_url
    {
        resolve_image_urls(&mut blocks, base);
    }

    tracing::debug!(before, after = blocks.len(), "normalized blocks");
    blocks
}

/// Decode the HTML entities that survive in raw text
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = match body.strip_prefix('#') {
                Some(number) => decode_numeric(number).map(String::from),
                None => NAMED_ENTITIES
                    .iter()
                    .find(|(name, _)| *name == body)
                    .map(|(_, value)| value.to_string()),
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_numeric(number: &str) -> Option<char> {
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse().ok()?,
    };
    match code {
        0xA0 => Some(' '),
        _ => char::from_u32(code),
    }
}

/// Collapse every whitespace run, newlines included, to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce three or more consecutive line breaks to one blank line
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINES_RE.replace_all(text, "\n\n").into_owned()
}

/// Code keeps its layout: only line endings are normalized and blank
/// leading/trailing lines trimmed.
fn normalize_code(text: &str) -> String {
    let text = decode_entities(&text.replace("\r\n", "\n"));
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.trim().is_empty()).map_or(start, |i| i + 1);
    lines[start..end].iter().map(|l| l.trim_end()).collect::<Vec<_>>().join("\n")
}

fn clean_block(mut block: ContentBlock) -> ContentBlock {
    block.content = match &mut block.kind {
        BlockKind::Code => normalize_code(&block.content),
        BlockKind::Image { alt } => {
            if let Some(text) = alt {
                *text = collapse_whitespace(&decode_entities(text));
            }
            decode_entities(block.content.trim())
        }
        _ => collapse_whitespace(&decode_entities(&block.content)),
    };
    block
}

/// Break markers and text blocks with nothing left. Images survive even
/// with an empty source.
fn is_empty_block(block: &ContentBlock) -> bool {
    !block.is_image() && block.content.trim().is_empty()
}

/// Drop textual blocks whose content contains a boilerplate phrase,
/// case-insensitively. Images are never filtered.
pub fn filter_boilerplate(blocks: Vec<ContentBlock>, phrases: &[String]) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .filter(|block| {
            if block.is_image() {
                return true;
            }
            let lower = block.content.trim().to_lowercase();
            let hit = phrases.iter().find(|phrase| lower.contains(phrase.to_lowercase().as_str()));
            if let Some(phrase) = hit {
                tracing::trace!(phrase = phrase.as_str(), "dropping boilerplate block");
            }
            hit.is_none()
        })
        .collect()
}

/// Keep only the first block for each distinct trimmed content.
/// Images without a source have nothing to compare and are all kept.
pub fn dedupe_blocks(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut seen = HashSet::new();
    blocks
        .into_iter()
        .filter(|block| {
            let key = block.content.trim();
            (block.is_image() && key.is_empty()) || seen.insert(key.to_string())
        })
        .collect()
}

/// Drop the first heading whose text equals the article title
pub fn remove_title_heading(mut blocks: Vec<ContentBlock>, title: &str) -> Vec<ContentBlock> {
    let title = collapse_whitespace(title);
    if let Some(index) = blocks
        .iter()
        .position(|b| matches!(b.kind, BlockKind::Heading { .. }) && b.content.trim() == title)
    {
        blocks.remove(index);
    }
    blocks
}

/// Resolve relative image sources against the page URL. Sources that
/// fail to resolve are left as they are.
pub fn resolve_image_urls(blocks: &mut [ContentBlock], base: &Url) {
    for block in blocks.iter_mut().filter(|b| b.is_image() && !b.content.is_empty()) {
        if Url::parse(&block.content).is_ok() {
            continue;
        }
        if let Ok(resolved) = base.join(&block.content) {
            block.content = resolved.to_string();
        }
    }
}

/// Reading time in seconds at `words_per_minute`
pub fn reading_seconds(word_count: usize, words_per_minute: f64) -> f64 {
    if words_per_minute <= 0.0 {
        return 0.0;
    }
    word_count as f64 / words_per_minute * 60.0
}
