use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use serde::Serialize;

use crate::dom_tree::{DomTree, NodeId};
use crate::parse::Document;
use crate::scoring::{CandidateConfig, ScoreConfig, calculate_score, is_valid_candidate};
use crate::selector::{Selector, parse_all, query_selector_all};
use crate::siteconfig::SiteRule;
use crate::{Result, SiftError};

/// Containers that usually hold the article, most specific first
pub const SEMANTIC_SELECTORS: &[&str] = &[
    "article",
    "[role=article]",
    "[role=main]",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    "#article-content",
    "#post-content",
    ".content",
];

/// Markers left by client-side renderers around late-loaded text
pub const DYNAMIC_SELECTORS: &[&str] =
    &["[data-content]", "[data-text-content]", "[data-article]", ".dynamic-content", ".lazy-content"];

static SEMANTIC: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(SEMANTIC_SELECTORS));
static DYNAMIC: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(DYNAMIC_SELECTORS));

/// Configuration for content extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    pub score: ScoreConfig,
    pub candidate: CandidateConfig,
}

/// Which fallback stage produced the main content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStage {
    SiteRule,
    Semantic,
    Density,
    Dynamic,
}

impl LocatorStage {
    /// False for the best-effort density pick
    pub fn is_confident(self) -> bool {
        !matches!(self, LocatorStage::Density)
    }
}

/// The chosen main-content subtree.
///
/// Site rules hand back a stripped copy of the document; every other stage
/// borrows the original tree.
#[derive(Debug, Clone)]
pub struct MainContent<'a> {
    pub tree: Cow<'a, DomTree>,
    pub node: NodeId,
    pub stage: LocatorStage,
}

impl MainContent<'_> {
    pub fn text(&self) -> String {
        self.tree.text(self.node)
    }
}

/// A scored density-stage candidate
#[derive(Debug, Clone, Copy)]
struct Candidate {
    node: NodeId,
    score: f64,
}

/// Locate the main content of a document.
///
/// Stages run in order and stop at the first that yields a node: the site
/// rule, the semantic selector list, the highest-scoring element under
/// `<body>`, and, when that winner is implausibly small, the dynamic-content
/// heuristic.
pub fn locate_main_content<'a>(
    doc: &'a Document, rule: Option<&SiteRule>, config: &ExtractConfig,
) -> Result<MainContent<'a>> {
    if let Some(rule) = rule
        && let Some(found) = from_site_rule(doc, rule)
    {
        tracing::debug!(rule = rule.name, "main content from site rule");
        return Ok(found);
    }

    let tree = doc.tree();

    if let Some(node) = first_valid(tree, &SEMANTIC, &config.candidate) {
        tracing::debug!(tag = tree.tag_name(node), "main content from semantic selector");
        return Ok(MainContent { tree: Cow::Borrowed(tree), node, stage: LocatorStage::Semantic });
    }

    let best = best_by_density(doc, &config.score);
    let implausible = best.is_none_or(|c| c.score <= 0.0 || tree.text_len(c.node) < config.candidate.min_text_length);

    if implausible && let Some(node) = from_dynamic(tree, &config.candidate) {
        tracing::debug!(tag = tree.tag_name(node), "main content from dynamic heuristic");
        return Ok(MainContent { tree: Cow::Borrowed(tree), node, stage: LocatorStage::Dynamic });
    }

    match best {
        Some(candidate) => {
            tracing::debug!(tag = tree.tag_name(candidate.node), score = candidate.score, "main content from density");
            Ok(MainContent { tree: Cow::Borrowed(tree), node: candidate.node, stage: LocatorStage::Density })
        }
        None => Err(SiftError::NoContentFound),
    }
}

/// First match of the rule's content selectors with visible text, copied
/// without the rule's strip selectors. Validity gates do not apply.
fn from_site_rule<'a>(doc: &'a Document, rule: &SiteRule) -> Option<MainContent<'a>> {
    let tree = doc.tree();
    let strip = parse_all(rule.strip_selectors);

    for selector in parse_all(rule.content_selectors) {
        for node in query_selector_all(tree, DomTree::ROOT, &selector) {
            if tree.text_len(node) == 0 {
                continue;
            }

            let skip: HashSet<NodeId> = strip
                .iter()
                .flat_map(|s| query_selector_all(tree, node, s))
                .filter(|id| *id != node)
                .collect();
            let copy = tree.clone_subtree(node, &skip);
            let Some(root) = copy.children(DomTree::ROOT).first().copied() else {
                continue;
            };
            if copy.text_len(root) == 0 {
                continue;
            }
            return Some(MainContent { tree: Cow::Owned(copy), node: root, stage: LocatorStage::SiteRule });
        }
    }
    None
}

/// The first match, list order then document order, passing the gates
fn first_valid(tree: &DomTree, selectors: &[Selector], config: &CandidateConfig) -> Option<NodeId> {
    selectors
        .iter()
        .flat_map(|selector| query_selector_all(tree, DomTree::ROOT, selector))
        .find(|node| is_valid_candidate(tree, *node, config))
}

/// Highest-scoring element under `<body>` (the whole document without one).
/// Ties keep the first in document order. When nothing scores above zero,
/// the body itself wins if it has any text.
fn best_by_density(doc: &Document, config: &ScoreConfig) -> Option<Candidate> {
    let tree = doc.tree();
    let scope = doc.body().unwrap_or(DomTree::ROOT);

    let mut best: Option<Candidate> = None;
    for node in tree.descendants(scope).filter(|id| tree.is_element(*id)) {
        let score = calculate_score(tree, node, config).final_score;
        tracing::trace!(tag = tree.tag_name(node), score, "density candidate");
        if score > best.map_or(0.0, |c| c.score) {
            best = Some(Candidate { node, score });
        }
    }

    best.or_else(|| (tree.text_len(scope) > 0).then_some(Candidate { node: scope, score: 0.0 }))
}

fn from_dynamic(tree: &DomTree, config: &CandidateConfig) -> Option<NodeId> {
    first_valid(tree, &DYNAMIC, config).or_else(|| {
        tree.descendants(DomTree::ROOT)
            .filter(|id| tree.is_element(*id))
            .filter(|id| tree.text_len(*id) > config.dynamic_text_threshold)
            .find(|id| is_valid_candidate(tree, *id, config))
    })
}
