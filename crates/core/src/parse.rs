//! HTML parsing and tree queries.
//!
//! This module provides [`parse_html`], a forgiving single-pass tree builder,
//! and the [`Document`] / [`NodeRef`] wrappers used by the rest of the crate
//! for selector queries.
//!
//! # Example
//!
//! ```rust
//! use sift_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs[0].text(), "Paragraph");
//! ```

use std::collections::BTreeMap;

use url::Url;

use crate::dom_tree::{DomTree, NodeId, is_inline_tag, is_void_tag};
use crate::preprocess::{PreprocessConfig, strip_non_content};
use crate::selector::{Selector, query_selector, query_selector_all};
use crate::{Result, SiftError};

/// Elements whose body is text up to the literal closing tag
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements where whitespace-only text is kept
const PREFORMATTED_TAGS: &[&str] = &["pre", "textarea"];

/// Elements whose start tag closes an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figcaption", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre", "section", "table",
    "ul",
];

/// Limits applied while building the tree
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Maximum number of nodes, excluding the document root (default: 5000)
    pub max_nodes: usize,
    /// Maximum number of simultaneously open elements (default: 500)
    pub max_depth: usize,
    /// Preprocessing applied before tokenizing
    pub preprocess: PreprocessConfig,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self { max_nodes: 5000, max_depth: 500, preprocess: PreprocessConfig::default() }
    }
}

/// Parse an HTML string into a [`DomTree`].
///
/// Unbalanced or missing closing tags are tolerated. Fails with
/// [`SiftError::MalformedInput`] when nothing is left after preprocessing and
/// with [`SiftError::InputTooLarge`] when a node or depth cap is exceeded.
pub fn parse_html(html: &str, config: &ParseConfig) -> Result<DomTree> {
    let cleaned = strip_non_content(html, &config.preprocess);
    if cleaned.trim().is_empty() {
        return Err(SiftError::MalformedInput);
    }

    let mut builder = TreeBuilder::new(config);
    builder.run(&cleaned)?;
    Ok(builder.tree)
}

struct TreeBuilder<'c> {
    tree: DomTree,
    stack: Vec<NodeId>,
    config: &'c ParseConfig,
}

impl<'c> TreeBuilder<'c> {
    fn new(config: &'c ParseConfig) -> Self {
        Self { tree: DomTree::new(), stack: vec![DomTree::ROOT], config }
    }

    fn run(&mut self, html: &str) -> Result<()> {
        let bytes = html.as_bytes();
        let mut pos = 0;
        let mut text_start = 0;

        while pos < bytes.len() {
            if bytes[pos] != b'<' {
                pos += 1;
                continue;
            }

            match bytes.get(pos + 1) {
                Some(b'/') if bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic) => {
                    self.text(&html[text_start..pos])?;
                    let Some(end) = find_tag_end(bytes, pos + 2) else {
                        return self.text(&html[pos..]);
                    };
                    let name = tag_name(&html[pos + 2..end]);
                    self.close(&name);
                    pos = end + 1;
                }
                Some(b'!') if bytes[pos..].starts_with(b"<!--") => {
                    self.text(&html[text_start..pos])?;
                    pos = match html[pos + 4..].find("-->") {
                        Some(offset) => pos + 4 + offset + 3,
                        None => bytes.len(),
                    };
                }
                Some(b'!' | b'?' | b'/') => {
                    self.text(&html[text_start..pos])?;
                    pos = match bytes[pos..].iter().position(|b| *b == b'>') {
                        Some(offset) => pos + offset + 1,
                        None => bytes.len(),
                    };
                }
                Some(next) if next.is_ascii_alphabetic() => {
                    self.text(&html[text_start..pos])?;
                    let Some(end) = find_tag_end(bytes, pos + 1) else {
                        return self.text(&html[pos..]);
                    };
                    let body = &html[pos + 1..end];
                    let (name, attrs, self_closing) = parse_tag(body);
                    pos = end + 1;

                    if RAW_TEXT_TAGS.contains(&name.as_str()) && !self_closing {
                        let close = find_closing_tag(bytes, pos, &name).unwrap_or(bytes.len());
                        let id = self.open(name, attrs, true)?;
                        self.append_text(id, &html[pos..close])?;
                        pos = match bytes[close..].iter().position(|b| *b == b'>') {
                            Some(offset) => close + offset + 1,
                            None => bytes.len(),
                        };
                    } else {
                        self.open(name, attrs, self_closing)?;
                    }
                }
                _ => {
                    pos += 1;
                    continue;
                }
            }
            text_start = pos;
        }

        self.text(&html[text_start..])
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(DomTree::ROOT)
    }

    fn check_node_cap(&self) -> Result<()> {
        if self.tree.len() > self.config.max_nodes {
            return Err(SiftError::InputTooLarge { what: "node count", limit: self.config.max_nodes });
        }
        Ok(())
    }

    /// Append an element under the current node and push it unless it is
    /// void or written self-closing. `leaf` forces the no-push path.
    fn open(&mut self, name: String, attrs: BTreeMap<String, String>, leaf: bool) -> Result<NodeId> {
        self.close_implied_by(&name);
        self.check_node_cap()?;

        let push = !leaf && !is_void_tag(&name);
        let parent = self.current();
        let id = self.tree.append_element(parent, name, attrs);

        if push {
            if self.stack.len() > self.config.max_depth {
                return Err(SiftError::InputTooLarge { what: "nesting depth", limit: self.config.max_depth });
            }
            self.stack.push(id);
        }
        Ok(id)
    }

    /// Pop up to and including the nearest open element named `name`.
    /// A closer with no matching open element is ignored.
    fn close(&mut self, name: &str) {
        if let Some(index) = self.stack.iter().rposition(|id| self.tree.is_tag(*id, name)) {
            self.stack.truncate(index);
        }
    }

    /// Close the nearest open element in `targets` unless a `boundary`
    /// element is reached first.
    fn close_open(&mut self, targets: &[&str], boundary: &[&str]) {
        for index in (1..self.stack.len()).rev() {
            let tag = self.tree.tag_name(self.stack[index]).unwrap_or_default();
            if targets.contains(&tag) {
                self.stack.truncate(index);
                return;
            }
            if boundary.contains(&tag) {
                return;
            }
        }
    }

    fn close_implied_by(&mut self, name: &str) {
        if CLOSES_PARAGRAPH.contains(&name) && self.tree.is_tag(self.current(), "p") {
            self.stack.pop();
        }

        match name {
            "li" => self.close_open(&["li"], &["ul", "ol", "menu"]),
            "dt" | "dd" => self.close_open(&["dt", "dd"], &["dl"]),
            "td" | "th" => self.close_open(&["td", "th"], &["tr", "table"]),
            "tr" => self.close_open(&["tr"], &["table", "tbody", "thead", "tfoot"]),
            "option" => {
                if self.tree.is_tag(self.current(), "option") {
                    self.stack.pop();
                }
            }
            _ => {}
        }
    }

    fn in_preformatted(&self) -> bool {
        self.stack
            .iter()
            .any(|id| self.tree.tag_name(*id).is_some_and(|tag| PREFORMATTED_TAGS.contains(&tag)))
    }

    /// Whitespace-only runs are dropped, except inside preformatted
    /// elements and right after an inline element, where they shrink to a
    /// single space so neighbouring words stay apart.
    fn text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let parent = self.current();
        if text.trim().is_empty() && !self.in_preformatted() {
            let after_inline = self
                .tree
                .children(parent)
                .last()
                .and_then(|last| self.tree.tag_name(*last))
                .is_some_and(is_inline_tag);
            if after_inline {
                return self.append_text(parent, " ");
            }
            return Ok(());
        }
        self.append_text(parent, text)
    }

    fn append_text(&mut self, parent: NodeId, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.check_node_cap()?;
        self.tree.append_text(parent, text);
        Ok(())
    }
}

/// Index of the `>` ending a tag that starts before `from`.
///
/// Quotes only open a value right after `=`, so a stray apostrophe in a
/// broken tag does not swallow the rest of the document.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut after_equals = false;

    for (offset, byte) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) if *byte == q => quote = None,
            Some(_) => {}
            None => match byte {
                b'>' => return Some(from + offset),
                b'"' | b'\'' if after_equals => quote = Some(*byte),
                b'=' => {
                    after_equals = true;
                    continue;
                }
                b if b.is_ascii_whitespace() => continue,
                _ => {}
            },
        }
        after_equals = false;
    }
    None
}

/// Start of the literal closing tag `</name` (any case) at or after `from`
fn find_closing_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let needle = name.as_bytes();
    let mut pos = from;
    while pos + 2 + needle.len() <= bytes.len() {
        let offset = bytes[pos..].iter().position(|b| *b == b'<')?;
        pos += offset;
        let end = pos + 2 + needle.len();
        if end <= bytes.len()
            && bytes[pos + 1] == b'/'
            && bytes[pos + 2..end].eq_ignore_ascii_case(needle)
            && bytes.get(end).is_none_or(|b| *b == b'>' || b.is_ascii_whitespace() || *b == b'/')
        {
            return Some(pos);
        }
        pos += 1;
    }
    None
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && c != '/' && c != '>'
}

fn tag_name(body: &str) -> String {
    body.chars().take_while(|c| is_name_char(*c)).collect::<String>().to_ascii_lowercase()
}

/// Split a tag body (between `<` and `>`) into name, attributes, and the
/// self-closing flag. Attribute names are lowercased and the first
/// occurrence of a repeated name wins. Malformed attributes are skipped.
fn parse_tag(body: &str) -> (String, BTreeMap<String, String>, bool) {
    let name = tag_name(body);
    let self_closing = body.trim_end().ends_with('/');
    let mut attrs = BTreeMap::new();

    let chars: Vec<char> = body.chars().skip(name.chars().count()).collect();
    let mut i = 0;
    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && !matches!(chars[i], '=' | '/' | '"' | '\'') {
            i += 1;
        }
        if i == start {
            i += 1;
            continue;
        }
        let key: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();

        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }

        if j < chars.len() && chars[j] == '=' {
            j += 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            match chars.get(j) {
                Some(q @ ('"' | '\'')) => {
                    let open = j + 1;
                    let Some(len) = chars[open..].iter().position(|c| c == q) else {
                        break;
                    };
                    attrs.entry(key).or_insert_with(|| chars[open..open + len].iter().collect());
                    i = open + len + 1;
                }
                Some(_) => {
                    let open = j;
                    while j < chars.len() && !chars[j].is_whitespace() {
                        j += 1;
                    }
                    let value: String = chars[open..j].iter().collect();
                    let value = match value.strip_suffix('/') {
                        Some(stripped) if j == chars.len() => stripped.to_string(),
                        _ => value,
                    };
                    attrs.entry(key).or_insert(value);
                    i = j;
                }
                None => {
                    attrs.entry(key).or_default();
                    i = j;
                }
            }
        } else {
            attrs.entry(key).or_default();
        }
    }

    (name, attrs, self_closing)
}

/// Represents a parsed HTML document.
///
/// A Document owns the parsed tree together with the page's source URL and
/// provides selector queries over it.
///
/// # Example
///
/// ```rust
/// use sift_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML with the default limits and no source URL.
    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with_config(html, None, &ParseConfig::default())
    }

    /// Parses HTML with explicit limits and an optional source URL.
    pub fn parse_with_config(html: &str, base_url: Option<Url>, config: &ParseConfig) -> Result<Self> {
        let tree = parse_html(html, config)?;
        Ok(Self { tree, base_url })
    }

    pub fn from_tree(tree: DomTree, base_url: Option<Url>) -> Self {
        Self { tree, base_url }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Host of the source URL, if it has one
    pub fn host(&self) -> Option<&str> {
        self.base_url.as_ref().and_then(Url::host_str)
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: &self.tree, id: DomTree::ROOT }
    }

    /// The first `<body>` element, if the markup has one
    pub fn body(&self) -> Option<NodeId> {
        self.tree.descendants(DomTree::ROOT).find(|id| self.tree.is_tag(*id, "body"))
    }

    /// Selects elements using a selector.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidSelector`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeRef<'_>>> {
        self.root().select(selector)
    }

    /// The first element matching `selector`
    pub fn select_first(&self, selector: &str) -> Result<Option<NodeRef<'_>>> {
        self.root().select_first(selector)
    }

    /// Text of the `<title>` element, if present
    pub fn title(&self) -> Option<String> {
        self.select_first("title").ok().flatten().map(|el| el.text())
    }

    /// Visible text of the whole document
    pub fn text_content(&self) -> String {
        self.tree.text(DomTree::ROOT)
    }
}

/// A borrowed handle to one node of a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn new(tree: &'a DomTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a DomTree {
        self.tree
    }

    pub fn tag_name(&self) -> Option<&'a str> {
        self.tree.tag_name(self.id)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.tree.attr(self.id, name)
    }

    /// Visible text with whitespace collapsed
    pub fn text(&self) -> String {
        self.tree.text(self.id)
    }

    pub fn inner_html(&self) -> String {
        self.tree.inner_html(self.id)
    }

    pub fn outer_html(&self) -> String {
        self.tree.outer_html(self.id)
    }

    /// Matching nodes in this subtree, this node included, in document order
    pub fn select(&self, selector: &str) -> Result<Vec<NodeRef<'a>>> {
        let selector: Selector = selector.parse()?;
        Ok(query_selector_all(self.tree, self.id, &selector)
            .into_iter()
            .map(|id| NodeRef { tree: self.tree, id })
            .collect())
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<NodeRef<'a>>> {
        let selector: Selector = selector.parse()?;
        Ok(query_selector(self.tree, self.id, &selector).map(|id| NodeRef { tree: self.tree, id }))
    }
}
