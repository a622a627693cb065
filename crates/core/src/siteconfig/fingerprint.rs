use crate::parse::Document;
use crate::selector::{Selector, query_selector};
use crate::siteconfig::SiteRule;

/// Detects a platform from markup rather than from the host name, so a
/// publication on a custom domain still gets its platform's rule.
#[derive(Debug)]
pub struct FingerprintMatcher<'d> {
    doc: &'d Document,
}

impl<'d> FingerprintMatcher<'d> {
    pub fn new(doc: &'d Document) -> Self {
        Self { doc }
    }

    /// True if any of the rule's fingerprint selectors matches the document
    pub fn matches(&self, rule: &SiteRule) -> bool {
        rule.fingerprints.iter().any(|fingerprint| self.matches_fragment(fingerprint))
    }

    /// True if `fingerprint` selects at least one element
    pub fn matches_fragment(&self, fingerprint: &str) -> bool {
        match Selector::parse(fingerprint) {
            Ok(selector) => query_selector(self.doc.tree(), self.doc.root().id(), &selector).is_some(),
            Err(err) => {
                tracing::warn!(fingerprint, error = %err, "invalid fingerprint selector");
                false
            }
        }
    }
}
