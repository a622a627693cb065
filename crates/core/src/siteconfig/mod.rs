//! Per-site extraction rules.
//!
//! A [`SiteRule`] names where a known site keeps its article body and what
//! to cut out of it. Rules are plain data: adding a site means adding an
//! entry to the table in [`rules`], not writing code.

pub mod fingerprint;
pub mod rules;

pub use fingerprint::FingerprintMatcher;
pub use rules::{BUILTIN_RULES, builtin_rules};

use crate::parse::Document;

/// Extraction overrides for one site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteRule {
    /// Short identifier used in logs
    pub name: &'static str,
    /// Hosts handled by this rule; subdomains match too
    pub hosts: &'static [&'static str],
    /// Selectors that identify the platform when the host is unknown
    pub fingerprints: &'static [&'static str],
    /// Content selectors, tried in order
    pub content_selectors: &'static [&'static str],
    /// Descendants removed from the selected content
    pub strip_selectors: &'static [&'static str],
    /// Fixed author for single-author sites
    pub author: Option<&'static str>,
    /// Fixed site name
    pub site_name: Option<&'static str>,
}

impl SiteRule {
    /// Exact host match, or `host` is a subdomain of a listed host
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.hosts.iter().any(|known| {
            host == *known || host.strip_suffix(known).is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Pick the rule for a document.
///
/// Host matches win; when no host matches, the first rule whose fingerprint
/// selectors match the markup applies.
pub fn find_rule<'r>(rules: &'r [SiteRule], doc: &Document) -> Option<&'r SiteRule> {
    if let Some(host) = doc.host()
        && let Some(rule) = rules.iter().find(|rule| rule.matches_host(host))
    {
        tracing::debug!(rule = rule.name, host, "site rule matched by host");
        return Some(rule);
    }

    let matcher = FingerprintMatcher::new(doc);
    let rule = rules.iter().find(|rule| matcher.matches(rule))?;
    tracing::debug!(rule = rule.name, "site rule matched by fingerprint");
    Some(rule)
}
