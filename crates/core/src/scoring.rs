use std::sync::LazyLock;

use regex::Regex;

use crate::dom_tree::{DomTree, NodeId};

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").unwrap());

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Configuration for content scoring algorithm
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Points per paragraph element
    pub paragraph_weight: f64,
    /// Points per heading element
    pub heading_weight: f64,
    /// Points subtracted per link
    pub link_penalty: f64,
    /// Bonus for `<article>`
    pub article_bonus: f64,
    /// Bonus for `<main>`
    pub main_bonus: f64,
    /// Bonus for `<div>`
    pub div_bonus: f64,
    /// Bonus for every other tag (usually negative)
    pub other_bonus: f64,
    /// Nodes with this many words or fewer score zero
    pub min_words: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            paragraph_weight: 30.0,
            heading_weight: 20.0,
            link_penalty: 5.0,
            article_bonus: 100.0,
            main_bonus: 80.0,
            div_bonus: 0.0,
            other_bonus: -20.0,
            min_words: 10,
        }
    }
}

/// Result of scoring an element
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// The element's tag name
    pub tag_name: String,
    /// Words in the visible text
    pub word_count: usize,
    /// `<p>` elements, the node itself included
    pub paragraph_count: usize,
    /// `<h1>`..`<h6>` elements, the node itself included
    pub heading_count: usize,
    /// `<a>` elements, the node itself included
    pub link_count: usize,
    /// Bonus from the element's own tag
    pub tag_bonus: f64,
    /// Final calculated score
    pub final_score: f64,
}

/// Thresholds a node must pass before the semantic and dynamic locator
/// stages accept it
#[derive(Debug, Clone)]
pub struct CandidateConfig {
    /// Minimum visible text length in characters
    pub min_text_length: usize,
    /// Minimum ratio of text length to inner HTML length
    pub min_text_density: f64,
    /// Maximum ratio of anchor text to all text
    pub max_link_ratio: f64,
    /// Any element with more text than this is a dynamic-content candidate
    pub dynamic_text_threshold: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self { min_text_length: 140, min_text_density: 0.2, max_link_ratio: 0.5, dynamic_text_threshold: 1000 }
    }
}

/// Count words in text using a simple regex pattern
pub fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// Bonus for the element's own tag:
/// - ARTICLE: +100
/// - MAIN: +80
/// - DIV: 0
/// - anything else: -20
pub fn tag_bonus(tag: &str, config: &ScoreConfig) -> f64 {
    match tag {
        "article" => config.article_bonus,
        "main" => config.main_bonus,
        "div" => config.div_bonus,
        _ => config.other_bonus,
    }
}

/// Calculate the final score for an element
///
/// `words + 30 * paragraphs + 20 * headings - 5 * links + tag bonus`, or zero
/// when the node has too few words to be an article. Scores are only
/// meaningful relative to each other and may be negative.
pub fn calculate_score(tree: &DomTree, node: NodeId, config: &ScoreConfig) -> ScoreResult {
    let tag_name = tree.tag_name(node).unwrap_or_default().to_string();
    let word_count = count_words(&tree.text(node));

    let (mut paragraph_count, mut heading_count, mut link_count) = (0, 0, 0);
    for id in tree.subtree(node) {
        match tree.tag_name(id) {
            Some("p") => paragraph_count += 1,
            Some("a") => link_count += 1,
            Some(tag) if HEADING_TAGS.contains(&tag) => heading_count += 1,
            _ => {}
        }
    }

    let bonus = tag_bonus(&tag_name, config);
    let final_score = if word_count <= config.min_words {
        0.0
    } else {
        word_count as f64 + config.paragraph_weight * paragraph_count as f64
            + config.heading_weight * heading_count as f64
            - config.link_penalty * link_count as f64
            + bonus
    };

    ScoreResult { tag_name, word_count, paragraph_count, heading_count, link_count, tag_bonus: bonus, final_score }
}

/// Calculate the link density of an element
///
/// Link density is the ratio of link text characters to total text characters.
/// Returns a value from 0.0 (no links) to 1.0 (all text is in links).
pub fn link_density(tree: &DomTree, node: NodeId) -> f64 {
    let text_length = tree.text_len(node);
    if text_length == 0 {
        return 0.0;
    }

    let link_text_length = tree
        .subtree(node)
        .filter(|id| tree.is_tag(*id, "a"))
        .filter(|id| !tree.ancestors(*id).take_while(|a| *a != node).any(|a| tree.is_tag(a, "a")))
        .map(|id| tree.text_len(id))
        .sum::<usize>();

    (link_text_length as f64 / text_length as f64).min(1.0)
}

/// Ratio of visible text length to serialized inner HTML length
pub fn text_density(tree: &DomTree, node: NodeId) -> f64 {
    let html_length = tree.inner_html(node).chars().count();
    if html_length == 0 {
        return 0.0;
    }
    tree.text_len(node) as f64 / html_length as f64
}

/// Length, text-density, and link-ratio gates, each checked independently
/// of the score.
pub fn is_valid_candidate(tree: &DomTree, node: NodeId, config: &CandidateConfig) -> bool {
    let text_length = tree.text_len(node);
    if text_length < config.min_text_length {
        return false;
    }

    let density = text_density(tree, node);
    let links = link_density(tree, node);
    tracing::trace!(tag = tree.tag_name(node), text_length, density, links, "candidate gates");

    density >= config.min_text_density && links <= config.max_link_ratio
}
