use crate::siteconfig::SiteRule;

/// Paul Graham essays sit in a layout table, the text inside `<font>`.
const PAUL_GRAHAM: SiteRule = SiteRule {
    name: "paulgraham",
    hosts: &["paulgraham.com"],
    fingerprints: &[],
    content_selectors: &["td font", "td"],
    strip_selectors: &[],
    author: Some("Paul Graham"),
    site_name: Some("Paul Graham"),
};

const STRIPE_PRESS: SiteRule = SiteRule {
    name: "stripe-press",
    hosts: &["stripe.press"],
    fingerprints: &[],
    content_selectors: &[
        ".chapter-content",
        ".content-section",
        ".text-content",
        ".chapter-text",
        ".chapter",
        "article",
        "main[role=main]",
    ],
    strip_selectors: &["nav", "footer", "button", "[class*=share]"],
    author: None,
    site_name: Some("Stripe Press"),
};

/// Substack, including publications on custom domains.
const SUBSTACK: SiteRule = SiteRule {
    name: "substack",
    hosts: &["substack.com", "latent.space"],
    fingerprints: &["meta[content*=substack]", "[class*=substack]"],
    content_selectors: &[
        ".substack-post-content",
        ".available-content",
        "div.post-content",
        "article.post",
        "div[class*=post]",
    ],
    strip_selectors: &[
        "div[class*=share]",
        "button",
        "div[class*=subscription]",
        "div[class*=subscribe]",
        "div[class*=comment]",
        "div.author-bio",
        "div[class*=footer]",
        "div[class*=social]",
    ],
    author: None,
    site_name: None,
};

const GWERN: SiteRule = SiteRule {
    name: "gwern",
    hosts: &["gwern.net"],
    fingerprints: &[],
    content_selectors: &["#markdownBody", ".markdownBody", "article"],
    strip_selectors: &["#TOC", "#sidebar", "#footer", "#navigation", ".sidenote-column-left", ".sidenote-column-right"],
    author: Some("Gwern Branwen"),
    site_name: Some("Gwern.net"),
};

/// Rules compiled into the crate, in lookup order
pub const BUILTIN_RULES: &[SiteRule] = &[PAUL_GRAHAM, STRIPE_PRESS, SUBSTACK, GWERN];

/// The built-in table, or an empty one when the `siteconfig` feature is off
pub fn builtin_rules() -> &'static [SiteRule] {
    if cfg!(feature = "siteconfig") { BUILTIN_RULES } else { &[] }
}
