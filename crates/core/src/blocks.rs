//! Conversion of the main-content subtree into typed blocks.
//!
//! The walker emits one [`ContentBlock`] per heading, paragraph, quote, list
//! item, code block, and image, in document order. Bare text and inline
//! elements that sit next to each other are joined into a single paragraph,
//! so a sentence split across `<span>`s or links stays one block. A `<br>`
//! ends such a run and leaves a blank break marker that the normalizer
//! removes once block boundaries are settled.

use serde::Serialize;

use crate::dom_tree::{DomTree, NodeId, is_block_tag, is_inline_tag};

const BOLD_TAGS: &[&str] = &["strong", "b"];
const EMPHASIS_TAGS: &[&str] = &["em", "i"];

/// Leaf controls and document head; never contribute readable blocks.
/// Containers such as `form` or `nav` are walked like any other element.
const SKIPPED_TAGS: &[&str] = &["button", "head", "iframe", "input", "select", "svg", "textarea"];

/// Wrapper classes treated as structural chapter/section boundaries
const STRUCTURAL_CLASSES: &[&str] = &["chapter", "section"];

/// Kind of a content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    Quote,
    List { ordered: bool },
    Code,
    Image { alt: Option<String> },
}

/// Inline formatting that applies to a whole block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockMetadata {
    pub bold: bool,
    pub emphasis: bool,
}

/// One unit of article content.
///
/// `content` is display text, or the image source for [`BlockKind::Image`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    #[serde(flatten)]
    pub kind: BlockKind,
    pub content: String,
    pub metadata: BlockMetadata,
}

impl ContentBlock {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self { kind, content: content.into(), metadata: BlockMetadata::default() }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, content)
    }

    pub fn with_metadata(mut self, metadata: BlockMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Blank paragraph left by `<br>` and structural wrappers
    pub fn break_marker() -> Self {
        Self::paragraph("")
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, BlockKind::Image { .. })
    }

    pub fn is_code(&self) -> bool {
        matches!(self.kind, BlockKind::Code)
    }
}

/// Walk the subtree at `node` and emit its blocks in document order.
///
/// The start node is always walked, even when its tag is one the walker
/// skips deeper down. The walk keeps an explicit work stack, so nesting
/// depth is limited only by memory.
pub fn extract_blocks(tree: &DomTree, node: NodeId) -> Vec<ContentBlock> {
    let mut walker = BlockWalker { tree, scope: node, blocks: Vec::new(), work: Vec::new() };
    if tree.tag_name(node).is_some_and(|tag| SKIPPED_TAGS.contains(&tag)) {
        walker.work.push(Work::Children(node));
    } else {
        walker.work.push(Work::Element(node));
    }
    walker.run();
    walker.blocks
}

/// Pending walker step
enum Work {
    Element(NodeId),
    Children(NodeId),
    Run(Vec<NodeId>),
    Break,
}

struct BlockWalker<'t> {
    tree: &'t DomTree,
    scope: NodeId,
    blocks: Vec<ContentBlock>,
    work: Vec<Work>,
}

impl BlockWalker<'_> {
    fn run(&mut self) {
        while let Some(step) = self.work.pop() {
            match step {
                Work::Element(node) => self.element(node),
                Work::Children(node) => self.children(node),
                Work::Run(run) => self.flush_run(&run),
                Work::Break => self.blocks.push(ContentBlock::break_marker()),
            }
        }
    }

    fn element(&mut self, node: NodeId) {
        let tree = self.tree;
        let Some(tag) = tree.tag_name(node) else {
            return;
        };

        match tag {
            t if SKIPPED_TAGS.contains(&t) => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse().unwrap_or(1);
                let metadata = BlockMetadata {
                    bold: self.contains_any(node, BOLD_TAGS),
                    emphasis: self.contains_any(node, EMPHASIS_TAGS),
                };
                self.push(ContentBlock::new(BlockKind::Heading { level }, tree.text(node)).with_metadata(metadata));
            }
            "p" => {
                let metadata = self.run_formatting(&[node]);
                self.push(ContentBlock::paragraph(tree.text(node)).with_metadata(metadata));
                for img in tree.descendants(node).filter(|id| tree.is_tag(*id, "img")) {
                    self.image(img);
                }
            }
            "blockquote" => {
                let metadata = self.run_formatting(&[node]);
                self.push(ContentBlock::new(BlockKind::Quote, tree.text(node)).with_metadata(metadata));
            }
            "ul" | "ol" => self.list(node, tag == "ol"),
            "pre" => self.push(ContentBlock::new(BlockKind::Code, tree.raw_text(node))),
            "code" => self.push(ContentBlock::new(BlockKind::Code, tree.raw_text(node))),
            "img" => self.image(node),
            "br" => self.blocks.push(ContentBlock::break_marker()),
            "hr" => {}
            "div" | "section" | "article" if self.is_structural(node) => {
                self.work.push(Work::Break);
                self.work.push(Work::Children(node));
                self.work.push(Work::Break);
            }
            _ => self.work.push(Work::Children(node)),
        }
    }

    /// Queue the children of `node`, joining adjacent text and inline
    /// elements into one paragraph run.
    fn children(&mut self, node: NodeId) {
        let tree = self.tree;
        let mut steps: Vec<Work> = Vec::new();
        let mut run: Vec<NodeId> = Vec::new();

        for child in tree.children(node).iter().copied() {
            if self.is_run_member(node, child) {
                run.push(child);
            } else {
                if !run.is_empty() {
                    steps.push(Work::Run(std::mem::take(&mut run)));
                }
                steps.push(Work::Element(child));
            }
        }
        if !run.is_empty() {
            steps.push(Work::Run(run));
        }
        self.work.extend(steps.into_iter().rev());
    }

    fn flush_run(&mut self, run: &[NodeId]) {
        let text: String = run.iter().map(|id| self.tree.raw_text(*id)).collect();
        if !text.trim().is_empty() {
            let metadata = self.run_formatting(run);
            self.push(ContentBlock::paragraph(text).with_metadata(metadata));
        }
    }

    /// Text nodes, and inline elements with nothing block-like inside.
    /// A `<code>` joins the run when it sits inside running text.
    fn is_run_member(&self, parent: NodeId, child: NodeId) -> bool {
        let tree = self.tree;
        let Some(tag) = tree.tag_name(child) else {
            return true;
        };

        let inline = if tag == "code" { self.has_text_sibling(parent, child) } else { is_inline_tag(tag) };
        inline
            && !tree.descendants(child).any(|id| {
                tree.tag_name(id).is_some_and(|t| is_block_tag(t) || matches!(t, "br" | "img" | "pre"))
            })
    }

    fn has_text_sibling(&self, parent: NodeId, child: NodeId) -> bool {
        let tree = self.tree;
        tree.children(parent).iter().any(|sibling| {
            *sibling != child && tree.text_content(*sibling).is_some_and(|text| !text.trim().is_empty())
        })
    }

    fn list(&mut self, node: NodeId, ordered: bool) {
        let tree = self.tree;
        let items: Vec<NodeId> = tree.element_children(node).filter(|id| tree.is_tag(*id, "li")).collect();
        if items.is_empty() {
            self.work.push(Work::Children(node));
            return;
        }
        for item in items {
            let metadata = self.run_formatting(&[item]);
            self.push(ContentBlock::new(BlockKind::List { ordered }, tree.text(item)).with_metadata(metadata));
        }
    }

    fn image(&mut self, node: NodeId) {
        let tree = self.tree;
        let src = tree
            .attr(node, "src")
            .filter(|src| !src.trim().is_empty())
            .or_else(|| tree.attr(node, "data-src"))
            .unwrap_or_default();
        let alt = tree.attr(node, "alt").map(str::to_string);
        self.blocks.push(ContentBlock::new(BlockKind::Image { alt }, src.trim()));
    }

    fn push(&mut self, block: ContentBlock) {
        if !block.content.trim().is_empty() {
            self.blocks.push(block);
        }
    }

    fn is_structural(&self, node: NodeId) -> bool {
        self.tree
            .classes(node)
            .any(|class| STRUCTURAL_CLASSES.iter().any(|name| class.contains(name)))
    }

    fn contains_any(&self, node: NodeId, tags: &[&str]) -> bool {
        self.tree
            .descendants(node)
            .any(|id| self.tree.tag_name(id).is_some_and(|tag| tags.contains(&tag)))
    }

    /// A formatting flag applies when every non-blank text node under the
    /// given roots has a matching ancestor inside the extraction scope.
    fn run_formatting(&self, roots: &[NodeId]) -> BlockMetadata {
        BlockMetadata {
            bold: self.all_text_within(roots, BOLD_TAGS),
            emphasis: self.all_text_within(roots, EMPHASIS_TAGS),
        }
    }

    fn all_text_within(&self, roots: &[NodeId], tags: &[&str]) -> bool {
        let tree = self.tree;
        let mut texts = roots
            .iter()
            .flat_map(|root| tree.subtree(*root))
            .filter(|id| tree.text_content(*id).is_some_and(|text| !text.trim().is_empty()))
            .peekable();

        texts.peek().is_some() && texts.all(|text| self.has_formatting_ancestor(text, tags))
    }

    fn has_formatting_ancestor(&self, node: NodeId, tags: &[&str]) -> bool {
        for ancestor in self.tree.ancestors(node) {
            if self.tree.tag_name(ancestor).is_some_and(|tag| tags.contains(&tag)) {
                return true;
            }
            if ancestor == self.scope {
                break;
            }
        }
        false
    }
}
