//! A small selector engine over [`DomTree`].
//!
//! Supported syntax: tag names and `*`, `.class`, `#id`, the attribute forms
//! `[a]`, `[a=v]`, `[a*=v]`, `[a^=v]`, `[a$=v]` (values optionally quoted),
//! descendant (`a b`) and child (`a > b`) combinators, and comma-separated
//! lists. Class selectors match any class token that *contains* the name, so
//! `.post` matches `class="post-body"`.

use std::str::FromStr;

use crate::dom_tree::{DomTree, NodeId};
use crate::{Result, SiftError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    op: AttrOp,
}

impl AttrMatcher {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(expected) => value == expected,
            AttrOp::Contains(part) => value.contains(part.as_str()),
            AttrOp::Prefix(part) => value.starts_with(part.as_str()),
            AttrOp::Suffix(part) => value.ends_with(part.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        if node == DomTree::ROOT {
            return false;
        }
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag
            && expected != "*"
            && expected != tag
        {
            return false;
        }
        if !self.ids.iter().all(|id| tree.attr(node, "id") == Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|class| tree.classes(node).any(|token| token.contains(class.as_str()))) {
            return false;
        }
        self.attrs.iter().all(|attr| attr.matches(tree.attr(node, &attr.name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds joined by combinators; `combinators[i]` links
/// `compounds[i]` to `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let last = self.compounds.len() - 1;
        self.compounds[last].matches(tree, node) && self.matches_left_of(tree, node, last)
    }

    /// `node` already matches `compounds[index]`; check everything to its left.
    fn matches_left_of(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        if index == 0 {
            return true;
        }
        let left = &self.compounds[index - 1];
        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|parent| left.matches(tree, parent) && self.matches_left_of(tree, parent, index - 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .any(|ancestor| left.matches(tree, ancestor) && self.matches_left_of(tree, ancestor, index - 1)),
        }
    }
}

/// A parsed selector list.
///
/// # Example
///
/// ```rust
/// use sift_core::selector::Selector;
///
/// let selector: Selector = "article.post, div[class*=content] > p".parse().unwrap();
/// assert!("div[".parse::<Selector>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || SiftError::InvalidSelector(input.to_string());
        let alternatives = split_list(input)
            .ok_or_else(invalid)?
            .into_iter()
            .map(|part| parse_complex(part).ok_or_else(invalid))
            .collect::<Result<Vec<_>>>()?;
        if alternatives.is_empty() {
            return Err(invalid());
        }
        Ok(Self { alternatives })
    }

    /// True if `node` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.alternatives.iter().any(|complex| complex.matches(tree, node))
    }
}

impl FromStr for Selector {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// First match in the subtree at `root` (root included), in document order
pub fn query_selector(tree: &DomTree, root: NodeId, selector: &Selector) -> Option<NodeId> {
    tree.subtree(root).find(|id| selector.matches(tree, *id))
}

/// Every match in the subtree at `root` (root included), in document order
pub fn query_selector_all(tree: &DomTree, root: NodeId, selector: &Selector) -> Vec<NodeId> {
    tree.subtree(root).filter(|id| selector.matches(tree, *id)).collect()
}

/// Parse a fixed selector table, dropping entries that fail to parse.
pub fn parse_all(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(err) => {
                tracing::warn!(selector = *s, error = %err, "skipping selector");
                None
            }
        })
        .collect()
}

/// Split on top-level commas, ignoring commas inside brackets or quotes
fn split_list(input: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, ',') if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() || depth != 0 {
        return None;
    }
    parts.push(input[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(src: &str) -> Self {
        Self { chars: src.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }

    fn attr_value(&mut self) -> Option<String> {
        match self.peek()? {
            q @ ('"' | '\'') => {
                self.pos += 1;
                let start = self.pos;
                while self.peek()? != q {
                    self.pos += 1;
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Some(value)
            }
            _ => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ']' && !c.is_whitespace()) {
                    self.pos += 1;
                }
                (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
            }
        }
    }

    fn attribute(&mut self) -> Option<AttrMatcher> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let kind = match self.bump()? {
            ']' => return Some(AttrMatcher { name, op: AttrOp::Exists }),
            '=' => '=',
            marker @ ('*' | '^' | '$') if self.eat('=') => marker,
            _ => return None,
        };

        self.skip_whitespace();
        let value = self.attr_value()?;
        self.skip_whitespace();
        if !self.eat(']') {
            return None;
        }

        let op = match kind {
            '*' => AttrOp::Contains(value),
            '^' => AttrOp::Prefix(value),
            '$' => AttrOp::Suffix(value),
            _ => AttrOp::Equals(value),
        };
        Some(AttrMatcher { name, op })
    }

    fn compound(&mut self) -> Option<Compound> {
        let mut compound = Compound::default();

        if self.eat('*') {
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.pos += 1;
                    compound.ids.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                _ => break,
            }
        }

        (!compound.is_empty()).then_some(compound)
    }
}

fn parse_complex(input: &str) -> Option<Complex> {
    let mut cursor = Cursor::new(input);
    let mut compounds = vec![cursor.compound()?];
    let mut combinators = Vec::new();

    loop {
        let spaced = cursor.skip_whitespace();
        match cursor.peek() {
            None => break,
            Some('>') => {
                cursor.pos += 1;
                cursor.skip_whitespace();
                combinators.push(Combinator::Child);
            }
            Some(_) if spaced => combinators.push(Combinator::Descendant),
            Some(_) => return None,
        }
        compounds.push(cursor.compound()?);
    }

    Some(Complex { compounds, combinators })
}
