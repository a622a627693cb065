//! Error types for sift operations.
//!
//! This module defines the main error type [`SiftError`] which represents
//! every way an extraction can fail. Extraction is all-or-nothing: the first
//! failure is surfaced and no partial article is returned.
//!
//! # Example
//!
//! ```rust
//! use sift_core::{SiftError, extract_article};
//!
//! match extract_article("   ", "https://example.com") {
//!     Ok(article) => println!("{}", article.title),
//!     Err(SiftError::MalformedInput) => println!("nothing to parse"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Main error type for content extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiftError {
    /// The document reduced to nothing after preprocessing.
    ///
    /// Returned for empty or whitespace-only input, or input made only of
    /// scripts, styles, and comments.
    #[error("HTML input is empty after preprocessing")]
    MalformedInput,

    /// No locator stage produced a main-content node.
    #[error("No content could be extracted from the document")]
    NoContentFound,

    /// A configured resource cap was exceeded.
    ///
    /// `what` names the cap (input bytes, nodes, or nesting depth).
    #[error("Input too large: {what} exceeds limit of {limit}")]
    InputTooLarge { what: &'static str, limit: usize },

    /// A selector string could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Rendering the article to a serialized format failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SiftError {
    fn from(err: serde_json::Error) -> Self {
        SiftError::Serialization(err.to_string())
    }
}

/// Result type alias for SiftError.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SiftError::InvalidSelector("div[".to_string());
        assert!(err.to_string().contains("Invalid selector"));
        assert!(err.to_string().contains("div["));
    }

    #[test]
    fn test_input_too_large_error() {
        let err = SiftError::InputTooLarge { what: "nodes", limit: 5000 };
        assert!(err.to_string().contains("nodes"));
        assert!(err.to_string().contains("5000"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: SiftError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, SiftError::Serialization(_)));
    }
}
