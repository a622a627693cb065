//! Arena-backed HTML tree.
//!
//! Every node lives in a single `Vec` owned by [`DomTree`] and is addressed by
//! a [`NodeId`]. Children are stored top-down; the parent link is a plain
//! index used for lookups only. The synthetic document root is always
//! [`DomTree::ROOT`] and carries the tag name `#document`.

use std::collections::{BTreeMap, HashSet};

/// Tag name of the synthetic root element.
pub const DOCUMENT_TAG: &str = "#document";

/// Elements that never have children or a closing tag.
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose boundaries separate words in visible text.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hgroup", "hr", "html", "li", "main", "nav", "ol", "option", "p", "pre", "section", "summary", "table", "tbody",
    "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Phrasing elements that flow inside running text.
pub const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "font", "i", "ins", "kbd", "label",
    "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

pub fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// Index of a node inside its [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a node: an element with attributes, or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element { tag: String, attrs: BTreeMap<String, String> },
    Text(String),
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Visit order used by the iterative walkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Exit(NodeId),
}

/// An owned HTML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only the document root
    pub fn new() -> Self {
        let root = DomNode {
            data: NodeData::Element { tag: DOCUMENT_TAG.to_string(), attrs: BTreeMap::new() },
            parent: None,
            children: Vec::new(),
        };
        Self { nodes: vec![root] }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode { data, parent: Some(parent), children: Vec::new() });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element as the last child of `parent`
    pub fn append_element(
        &mut self, parent: NodeId, tag: impl Into<String>, attrs: BTreeMap<String, String>,
    ) -> NodeId {
        self.push(parent, NodeData::Element { tag: tag.into(), attrs })
    }

    /// Append a text node as the last child of `parent`.
    ///
    /// Empty text is never stored; `None` is returned instead.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> Option<NodeId> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }
        Some(self.push(parent, NodeData::Text(text)))
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children only, in document order
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(|child| self.is_element(*child))
    }

    /// Lowercase tag name, or `None` for text nodes
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Element { .. })
    }

    /// True for real elements; the document root is excluded
    pub fn is_tag(&self, id: NodeId, name: &str) -> bool {
        id != Self::ROOT && self.tag_name(id) == Some(name)
    }

    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    pub fn attrs(&self, id: NodeId) -> Option<&BTreeMap<String, String>> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => Some(attrs),
            NodeData::Text(_) => None,
        }
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attr(id, "class").unwrap_or_default().split_whitespace()
    }

    /// Ancestors from the parent up to the document root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Strict descendants of `id` in pre-order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// `id` followed by its descendants in pre-order
    pub fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(id).chain(self.descendants(id))
    }

    /// Depth-first enter/exit events for the subtree rooted at `id`
    pub fn walk(&self, id: NodeId) -> Walk<'_> {
        Walk { tree: self, stack: vec![WalkEvent::Enter(id)] }
    }

    /// Visible text: text nodes joined, a space at block boundaries and `<br>`,
    /// whitespace collapsed and trimmed.
    pub fn text(&self, id: NodeId) -> String {
        let mut raw = String::new();
        for event in self.walk(id) {
            match event {
                WalkEvent::Enter(node) => match &self.nodes[node.0].data {
                    NodeData::Text(text) => raw.push_str(text),
                    NodeData::Element { tag, .. } if tag == "br" || is_block_tag(tag) => raw.push(' '),
                    NodeData::Element { .. } => {}
                },
                WalkEvent::Exit(node) => {
                    if let Some(tag) = self.tag_name(node)
                        && is_block_tag(tag)
                    {
                        raw.push(' ');
                    }
                }
            }
        }
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Text nodes concatenated verbatim
    pub fn raw_text(&self, id: NodeId) -> String {
        self.subtree(id).filter_map(|node| self.text_content(node)).collect()
    }

    /// Character count of [`DomTree::text`]
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).chars().count()
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.serialize_into(*child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(id, &mut out);
        out
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        for event in self.walk(id) {
            match event {
                WalkEvent::Enter(node) => match &self.nodes[node.0].data {
                    NodeData::Text(text) => out.push_str(text),
                    NodeData::Element { tag, .. } if tag == DOCUMENT_TAG => {}
                    NodeData::Element { tag, attrs } => {
                        out.push('<');
                        out.push_str(tag);
                        for (name, value) in attrs {
                            out.push(' ');
                            out.push_str(name);
                            out.push_str("=\"");
                            out.push_str(&value.replace('"', "&quot;"));
                            out.push('"');
                        }
                        out.push('>');
                    }
                },
                WalkEvent::Exit(node) => {
                    if let Some(tag) = self.tag_name(node)
                        && tag != DOCUMENT_TAG
                        && !is_void_tag(tag)
                    {
                        out.push_str("</");
                        out.push_str(tag);
                        out.push('>');
                    }
                }
            }
        }
    }

    /// Copy the subtree at `id` into a fresh tree, leaving out every node in
    /// `skip` together with its descendants. The copy of `id` becomes the
    /// only child of the new root.
    pub fn clone_subtree(&self, id: NodeId, skip: &HashSet<NodeId>) -> DomTree {
        let mut copy = DomTree::new();
        if skip.contains(&id) {
            return copy;
        }

        let mut stack = vec![(id, Self::ROOT)];
        while let Some((source, target_parent)) = stack.pop() {
            let target = copy.push(target_parent, self.nodes[source.0].data.clone());
            for child in self.children(source).iter().rev() {
                if !skip.contains(child) {
                    stack.push((*child, target));
                }
            }
        }
        copy
    }

    /// Total number of nodes, the document root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the document root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator returned by [`DomTree::descendants`]
pub struct Descendants<'t> {
    tree: &'t DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Enter/exit iterator returned by [`DomTree::walk`]
pub struct Walk<'t> {
    tree: &'t DomTree,
    stack: Vec<WalkEvent>,
}

impl Iterator for Walk<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        let event = self.stack.pop()?;
        if let WalkEvent::Enter(id) = event {
            self.stack.push(WalkEvent::Exit(id));
            self.stack.extend(self.tree.children(id).iter().rev().map(|child| WalkEvent::Enter(*child)));
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let mut attrs = BTreeMap::new();
        attrs.insert("class".to_string(), "post featured".to_string());
        let div = tree.append_element(DomTree::ROOT, "div", attrs);
        let p = tree.append_element(div, "p", BTreeMap::new());
        tree.append_text(p, "Hello");
        let b = tree.append_element(p, "b", BTreeMap::new());
        tree.append_text(b, "world");
        let p2 = tree.append_element(div, "p", BTreeMap::new());
        tree.append_text(p2, "Second");
        (tree, div)
    }

    #[test]
    fn test_root_is_document() {
        let tree = DomTree::new();
        assert_eq!(tree.tag_name(DomTree::ROOT), Some(DOCUMENT_TAG));
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_text_inserts_space_at_block_boundaries() {
        let (tree, div) = sample();
        assert_eq!(tree.text(div), "Helloworld Second");
    }

    #[test]
    fn test_raw_text_is_verbatim() {
        let (tree, div) = sample();
        assert_eq!(tree.raw_text(div), "HelloworldSecond");
    }

    #[test]
    fn test_empty_text_is_not_stored() {
        let mut tree = DomTree::new();
        assert!(tree.append_text(DomTree::ROOT, "").is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let (tree, div) = sample();
        let tags: Vec<_> = tree.descendants(div).map(|id| tree.tag_name(id).unwrap_or("#text")).collect();
        assert_eq!(tags, vec!["p", "#text", "b", "#text", "p", "#text"]);
    }

    #[test]
    fn test_ancestors_follow_parent_links() {
        let (tree, div) = sample();
        let b = tree.descendants(div).find(|id| tree.tag_name(*id) == Some("b")).unwrap();
        let chain: Vec<_> = tree.ancestors(b).collect();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[1], div);
        assert_eq!(chain[2], DomTree::ROOT);
    }

    #[test]
    fn test_classes_split_on_whitespace() {
        let (tree, div) = sample();
        assert_eq!(tree.classes(div).collect::<Vec<_>>(), vec!["post", "featured"]);
    }

    #[test]
    fn test_outer_html_round_trips_structure() {
        let (tree, div) = sample();
        assert_eq!(tree.outer_html(div), r#"<div class="post featured"><p>Hello<b>world</b></p><p>Second</p></div>"#);
        assert_eq!(tree.inner_html(div), "<p>Hello<b>world</b></p><p>Second</p>");
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let mut tree = DomTree::new();
        let p = tree.append_element(DomTree::ROOT, "p", BTreeMap::new());
        tree.append_element(p, "br", BTreeMap::new());
        assert_eq!(tree.outer_html(p), "<p><br></p>");
    }

    #[test]
    fn test_clone_subtree_skips_nodes() {
        let (tree, div) = sample();
        let b = tree.descendants(div).find(|id| tree.tag_name(*id) == Some("b")).unwrap();
        let skip: HashSet<NodeId> = [b].into_iter().collect();

        let copy = tree.clone_subtree(div, &skip);
        let copied_div = copy.children(DomTree::ROOT)[0];
        assert_eq!(copy.text(copied_div), "Hello Second");
        assert_eq!(copy.parent(copied_div), Some(DomTree::ROOT));
        assert_eq!(tree.text(div), "Helloworld Second");
    }
}
