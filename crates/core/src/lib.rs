//! Readable-article extraction from rendered HTML.
//!
//! `sift-core` parses a page into an arena tree, finds the main content with
//! an ordered fallback (site rule, semantic containers, content scoring,
//! dynamic-content markers), and returns it as typed blocks with metadata.
//!
//! ```rust
//! use sift_core::{OutputFormat, extract_article};
//!
//! let html = r#"<html><head><title>Notes</title></head><body>
//!     <nav><a href="/">Home</a> <a href="/about">About</a></nav>
//!     <article>
//!         <h1>Notes</h1>
//!         <p>A page keeps its article in one place and its chrome everywhere else, so the
//!         job is to find that place and leave the rest of the page behind. Navigation,
//!         footers and share buttons rarely say anything the reader came for.</p>
//!     </article>
//! </body></html>"#;
//!
//! let article = extract_article(html, "https://example.com/notes").unwrap();
//! assert_eq!(article.title, "Notes");
//! let markdown = article.to_format(OutputFormat::Markdown).unwrap();
//! assert!(markdown.starts_with("A page keeps its article"));
//! ```

pub mod article;
pub mod blocks;
pub mod dom_tree;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod metadata;
pub mod parse;
pub mod postprocess;
pub mod preprocess;
pub mod readability;
pub mod scoring;
pub mod selector;
pub mod siteconfig;

pub use article::{ExtractedArticle, OutputFormat};
pub use blocks::{BlockKind, BlockMetadata, ContentBlock, extract_blocks};
#[doc(hidden)]
pub use dom_tree::{DomNode, DomTree, NodeData, NodeId};
pub use error::{Result, SiftError};
pub use extract::{ExtractConfig, LocatorStage, MainContent, locate_main_content};
pub use formatters::{JsonConfig, JsonFormatter, MarkdownConfig, MarkdownFormatter, TextConfig, TextFormatter};
pub use formatters::{convert_to_json, convert_to_markdown, convert_to_text, metadata_to_json};
pub use metadata::Metadata;
pub use parse::{Document, NodeRef, ParseConfig, parse_html};
#[doc(hidden)]
pub use postprocess::NormalizeConfig;
pub use postprocess::normalize_blocks;
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::strip_non_content;
pub use readability::{
    Extractor, ExtractorConfig, ExtractorConfigBuilder, extract_article, extract_article_with_config,
    is_probably_readable,
};
#[doc(hidden)]
pub use scoring::{CandidateConfig, ScoreConfig, ScoreResult, calculate_score, link_density, text_density};
pub use selector::{Selector, query_selector, query_selector_all};
pub use siteconfig::{BUILTIN_RULES, FingerprintMatcher, SiteRule, builtin_rules, find_rule};
