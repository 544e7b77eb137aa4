//! In-memory block registry for tests.
//!
//! Registers a small core-like set of block types so the pipeline can be
//! exercised without a host application.

use std::sync::LazyLock;

use regex::Regex;
use rp_dom::NodeRef;
use serde_json::Value;

use crate::filters::BLOCK_PASSTHROUGH_TAG;
use crate::handler::{RawHandler, RawInput, RawMode};
use crate::registry::{
    Attributes, Block, BlockRegistry, RawTransform, ShortcodeTransform, content_attributes,
};

/// Opening block delimiter: `<!-- wp:name {json} -->`, optionally self-closing.
static BLOCK_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s+wp:([a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?)\s+(\{.*?\}\s+)?(/)?-->")
        .expect("invalid block delimiter regex")
});

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Registry with paragraph, heading, list, quote, image, separator, table,
/// preformatted, more, nextpage and gallery blocks.
#[derive(Debug)]
pub struct MockRegistry {
    raw: Vec<RawTransform>,
    shortcodes: Vec<ShortcodeTransform>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegistry {
    pub fn new() -> Self {
        let raw = vec![
            RawTransform::new("core/more", |node| {
                node.tag_name() == Some(BLOCK_PASSTHROUGH_TAG)
            })
            .with_transform(passthrough_block),
            RawTransform::for_tags("core/paragraph", &["p"]),
            RawTransform::for_tags("core/heading", HEADINGS).with_transform(heading_block),
            RawTransform::for_tags("core/list", &["ul", "ol"]),
            RawTransform::for_tags("core/quote", &["blockquote"]).with_transform(quote_block),
            RawTransform::new("core/image", |node| {
                node.tag_name() == Some("figure")
                    && node
                        .document()
                        .descendants(node.id())
                        .into_iter()
                        .any(|id| node.document().is_tag(id, "img"))
            })
            .with_transform(image_block),
            RawTransform::for_tags("core/separator", &["hr"]).with_transform(|_, handler| {
                handler
                    .registry()
                    .create_block("core/separator", Attributes::new(), Vec::new())
            }),
            RawTransform::for_tags("core/table", &["table"]),
            RawTransform::for_tags("core/preformatted", &["pre"]),
        ];

        let shortcodes = vec![
            ShortcodeTransform::new("gallery", "core/gallery"),
            ShortcodeTransform::new("caption", "core/image").with_attributes(|shortcode| {
                let mut attributes = Attributes::new();
                let align = shortcode.named.get("align").map_or("none", String::as_str);
                attributes.insert("align".to_owned(), Value::String(align.to_owned()));
                attributes
            }),
        ];

        Self { raw, shortcodes }
    }
}

fn passthrough_block(node: NodeRef<'_>, handler: &RawHandler<'_>) -> Block {
    let name = node.attr("data-block").unwrap_or("core/missing");
    let mut attributes = Attributes::new();
    if let Some(text) = node.attr("data-custom-text") {
        attributes.insert("customText".to_owned(), Value::String(text.to_owned()));
    }
    if node.attr("data-no-teaser").is_some() {
        attributes.insert("noTeaser".to_owned(), Value::Bool(true));
    }
    handler.registry().create_block(name, attributes, Vec::new())
}

fn heading_block(node: NodeRef<'_>, handler: &RawHandler<'_>) -> Block {
    let mut attributes = content_attributes(node.inner_html());
    let level = node
        .tag_name()
        .and_then(|tag| tag.strip_prefix('h'))
        .and_then(|level| level.parse::<u8>().ok())
        .unwrap_or(2);
    attributes.insert("level".to_owned(), Value::from(level));
    handler
        .registry()
        .create_block("core/heading", attributes, Vec::new())
}

fn quote_block(node: NodeRef<'_>, handler: &RawHandler<'_>) -> Block {
    let input = RawInput::new(node.inner_html()).with_mode(RawMode::Blocks);
    let inner_blocks = handler.handle(&input).into_blocks().unwrap_or_default();
    handler
        .registry()
        .create_block("core/quote", Attributes::new(), inner_blocks)
}

fn image_block(node: NodeRef<'_>, handler: &RawHandler<'_>) -> Block {
    let doc = node.document();
    let mut attributes = Attributes::new();
    if let Some(img) = doc
        .descendants(node.id())
        .into_iter()
        .find(|&id| doc.is_tag(id, "img"))
    {
        for (attr, key) in [("src", "url"), ("alt", "alt")] {
            if let Some(value) = doc.attr(img, attr) {
                attributes.insert(key.to_owned(), Value::String(value.to_owned()));
            }
        }
    }
    handler
        .registry()
        .create_block("core/image", attributes, Vec::new())
}

impl BlockRegistry for MockRegistry {
    fn raw_transforms(&self) -> &[RawTransform] {
        &self.raw
    }

    fn shortcode_transforms(&self) -> &[ShortcodeTransform] {
        &self.shortcodes
    }

    fn block_attributes(&self, _block_name: &str, html: &str) -> Attributes {
        content_attributes(html)
    }

    fn unknown_type_name(&self) -> &str {
        "core/freeform"
    }

    fn parse_serialized(&self, content: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut rest = content;

        while let Some(captures) = BLOCK_OPENER.captures(rest) {
            let (Some(opener), Some(raw_name)) = (captures.get(0), captures.get(1)) else {
                break;
            };
            let name = if raw_name.as_str().contains('/') {
                raw_name.as_str().to_owned()
            } else {
                format!("core/{}", raw_name.as_str())
            };

            let mut attributes = captures
                .get(2)
                .and_then(|json| serde_json::from_str::<Attributes>(json.as_str().trim()).ok())
                .unwrap_or_default();

            let after = &rest[opener.end()..];
            if captures.get(3).is_some() {
                blocks.push(self.create_block(&name, attributes, Vec::new()));
                rest = after;
                continue;
            }

            let closer = format!("<!-- /wp:{} -->", raw_name.as_str());
            let (inner, remaining) = match after.find(&closer) {
                Some(index) => (&after[..index], &after[index + closer.len()..]),
                None => (after, ""),
            };
            attributes.insert("content".to_owned(), Value::String(inner.trim().to_owned()));
            blocks.push(self.create_block(&name, attributes, Vec::new()));
            rest = remaining;
        }

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_serialized_blocks() {
        let registry = MockRegistry::new();
        let blocks = registry.parse_serialized(concat!(
            "<!-- wp:paragraph --><p>a</p><!-- /wp:paragraph -->\n",
            r#"<!-- wp:heading {"level":3} --><h3>b</h3><!-- /wp:heading -->"#,
            "\n<!-- wp:separator /-->\n",
            "<!-- wp:acme/card -->x<!-- /wp:acme/card -->",
        ));

        let names: Vec<_> = blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["core/paragraph", "core/heading", "core/separator", "acme/card"]
        );
        assert_eq!(blocks[0].attribute_str("content"), Some("<p>a</p>"));
        assert_eq!(blocks[1].attributes.get("level"), Some(&Value::from(3)));
        assert_eq!(blocks[1].attribute_str("content"), Some("<h3>b</h3>"));
        assert!(blocks[2].attributes.is_empty());
        assert_eq!(blocks[3].attribute_str("content"), Some("x"));
    }

    #[test]
    fn test_transform_order() {
        let registry = MockRegistry::new();
        let names: Vec<_> = registry
            .raw_transforms()
            .iter()
            .map(RawTransform::block_name)
            .collect();
        assert_eq!(names[0], "core/more");
        assert_eq!(names[1], "core/paragraph");
        assert_eq!(registry.shortcode_transforms().len(), 2);
    }
}
