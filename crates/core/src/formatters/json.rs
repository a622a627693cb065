use serde::Serialize;

use crate::Result;
use crate::article::ExtractedArticle;
use crate::metadata::Metadata;

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Convert an article to JSON. Every field of [`ExtractedArticle`] is
/// present; blocks carry a `type` tag plus their kind's own fields.
pub fn convert_to_json(article: &ExtractedArticle, config: &JsonConfig) -> Result<String> {
    to_json_string(article, config.pretty)
}

/// Convert metadata alone to JSON
pub fn metadata_to_json(metadata: &Metadata, pretty: bool) -> Result<String> {
    to_json_string(metadata, pretty)
}

fn to_json_string<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    Ok(json)
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, article: &ExtractedArticle) -> Result<String> {
        convert_to_json(article, &self.config)
    }

    pub fn metadata_only(&self, article: &ExtractedArticle) -> Result<String> {
        metadata_to_json(&article.metadata(), self.config.pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockKind, BlockMetadata, ContentBlock};
    use crate::extract::LocatorStage;
    use serde_json::{Value, json};

    fn article() -> ExtractedArticle {
        let metadata = Metadata { title: "Title".to_string(), ..Default::default() };
        let blocks = vec![
            ContentBlock::new(BlockKind::Heading { level: 2 }, "Section")
                .with_metadata(BlockMetadata { bold: true, emphasis: false }),
            ContentBlock::new(BlockKind::Image { alt: None }, "https://example.com/a.png"),
        ];
        ExtractedArticle::new(metadata, "https://example.com", blocks, LocatorStage::Density, 250.0)
    }

    #[test]
    fn test_convert_to_json_shape() {
        let value: Value = serde_json::from_str(&convert_to_json(&article(), &JsonConfig::default()).unwrap()).unwrap();

        assert_eq!(value["title"], "Title");
        assert_eq!(value["author"], Value::Null);
        assert_eq!(value["stage"], "density");
        assert_eq!(value["word_count"], 1);
        assert_eq!(
            value["blocks"][0],
            json!({"type": "heading", "level": 2, "content": "Section", "metadata": {"bold": true, "emphasis": false}})
        );
        assert_eq!(value["blocks"][1]["type"], "image");
        assert_eq!(value["blocks"][1]["alt"], Value::Null);
    }

    #[test]
    fn test_pretty_output() {
        let config = JsonConfig { pretty: true };
        let json = convert_to_json(&article(), &config).unwrap();
        assert!(json.contains("\n  \"title\": \"Title\""));
    }

    #[test]
    fn test_metadata_only() {
        let formatter = JsonFormatter::new(JsonConfig::default());
        let json = formatter.metadata_only(&article()).unwrap();
        assert_eq!(json, r#"{"title":"Title","author":null,"site_name":null,"excerpt":null}"#);
    }
}
