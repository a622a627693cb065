use lol_html::{HtmlRewriter, Settings, doc_comments, element};

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script tags
    pub remove_scripts: bool,
    /// Whether to remove style tags
    pub remove_styles: bool,
    /// Whether to remove noscript tags
    pub remove_noscript: bool,
    /// Whether to remove template tags
    pub remove_templates: bool,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_styles: true,
            remove_noscript: true,
            remove_templates: true,
            remove_comments: true,
        }
    }
}

impl PreprocessConfig {
    fn raw_text_tags(&self) -> Vec<&'static str> {
        [
            (self.remove_scripts, "script"),
            (self.remove_styles, "style"),
            (self.remove_noscript, "noscript"),
            (self.remove_templates, "template"),
        ]
        .into_iter()
        .filter_map(|(enabled, tag)| enabled.then_some(tag))
        .collect()
    }
}

/// Strip elements that never carry readable content.
///
/// Raw-text elements are removed through their literal closing tag, so markup
/// inside a script body never reaches the tree builder. An element with no
/// closer swallows the rest of the input. If the rewriter rejects the input,
/// it is returned unchanged.
pub fn strip_non_content(html: &str, config: &PreprocessConfig) -> String {
    let mut output = String::with_capacity(html.len());

    let element_handlers = config
        .raw_text_tags()
        .into_iter()
        .map(|tag| {
            element!(tag, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let document_handlers = if config.remove_comments {
        vec![doc_comments!(|c| {
            c.remove();
            Ok(())
        })]
    } else {
        Vec::new()
    };

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: element_handlers,
            document_content_handlers: document_handlers,
            ..Default::default()
        },
        |c: &[u8]| output.push_str(&String::from_utf8_lossy(c)),
    );

    if let Err(err) = rewriter.write(html.as_bytes()) {
        tracing::warn!(error = %err, "preprocessing failed, using raw input");
        return html.to_string();
    }
    if let Err(err) = rewriter.end() {
        tracing::warn!(error = %err, "preprocessing failed, using raw input");
        return html.to_string();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(html: &str) -> String {
        strip_non_content(html, &PreprocessConfig::default())
    }

    #[test]
    fn test_removes_scripts_and_styles() {
        let result = strip("<p>Keep</p><script>var x = '<p>no</p>';</script><style>p { color: red }</style>");
        assert_eq!(result, "<p>Keep</p>");
    }

    #[test]
    fn test_script_closer_is_case_insensitive() {
        let result = strip("<p>A</p><SCRIPT type=\"text/javascript\">x()</ScRiPt><p>B</p>");
        assert_eq!(result, "<p>A</p><p>B</p>");
    }

    #[test]
    fn test_removes_comments() {
        let result = strip("<p>A<!-- hidden <b>markup</b> --></p>");
        assert_eq!(result, "<p>A</p>");
    }

    #[test]
    fn test_similar_tag_names_are_kept() {
        let result = strip("<scripted>text</scripted><styles>more</styles>");
        assert!(result.contains("text"));
        assert!(result.contains("more"));
    }

    #[test]
    fn test_gt_inside_attribute_does_not_end_tag() {
        let result = strip(r#"<script data-x="a>b">alert(1)</script><p>After</p>"#);
        assert_eq!(result, "<p>After</p>");
    }

    #[test]
    fn test_noscript_and_template_removed_by_default() {
        let result = strip("<noscript><p>Enable JS</p></noscript><template><p>t</p></template><p>Body</p>");
        assert_eq!(result, "<p>Body</p>");
    }

    #[test]
    fn test_config_can_keep_noscript() {
        let config = PreprocessConfig { remove_noscript: false, ..Default::default() };
        let result = strip_non_content("<noscript><p>Enable JS</p></noscript>", &config);
        assert!(result.contains("Enable JS"));
    }

    #[test]
    fn test_script_only_input_becomes_empty() {
        assert!(strip("<script>only()</script>").trim().is_empty());
    }
}
