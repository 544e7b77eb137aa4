//! Content-type registry interface.
//!
//! The pipeline never knows which block types exist. It asks an injected
//! [`BlockRegistry`] for raw and shortcode transforms, attribute extraction,
//! the fallback type and the block factory.

use std::fmt;

use rp_dom::NodeRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handler::RawHandler;
use crate::shortcode::Shortcode;

/// Block attributes as a JSON object.
pub type Attributes = serde_json::Map<String, Value>;

/// Structured content unit produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Registered block type name, e.g. `core/paragraph`.
    pub name: String,
    /// Block attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Nested blocks.
    #[serde(default)]
    pub inner_blocks: Vec<Block>,
}

impl Block {
    /// String attribute by name.
    #[must_use]
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// Attributes with a single `content` entry.
#[must_use]
pub fn content_attributes(content: impl Into<String>) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("content".to_owned(), Value::String(content.into()));
    attributes
}

type MatchFn = dyn Fn(NodeRef<'_>) -> bool + Send + Sync;
type TransformFn = dyn Fn(NodeRef<'_>, &RawHandler<'_>) -> Block + Send + Sync;
type ShortcodeAttributesFn = dyn Fn(&Shortcode) -> Attributes + Send + Sync;

/// Converts a top-level sanitized element into a block.
///
/// Without a transform function the block is built from
/// [`BlockRegistry::block_attributes`] applied to the element's outer HTML.
pub struct RawTransform {
    block_name: String,
    is_match: Box<MatchFn>,
    transform: Option<Box<TransformFn>>,
}

impl RawTransform {
    /// Transform to `block_name` for elements accepted by `is_match`.
    pub fn new(
        block_name: impl Into<String>,
        is_match: impl Fn(NodeRef<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            block_name: block_name.into(),
            is_match: Box::new(is_match),
            transform: None,
        }
    }

    /// Transform for elements with one of the given tag names.
    pub fn for_tags(block_name: impl Into<String>, tags: &'static [&'static str]) -> Self {
        Self::new(block_name, move |node| {
            node.tag_name().is_some_and(|tag| tags.contains(&tag))
        })
    }

    /// Build the block with a custom function. The function receives the
    /// handler so it can run the pipeline over nested content.
    #[must_use]
    pub fn with_transform(
        mut self,
        transform: impl Fn(NodeRef<'_>, &RawHandler<'_>) -> Block + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Target block type.
    #[must_use]
    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    /// Whether the transform accepts the element.
    #[must_use]
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        (self.is_match)(node)
    }

    /// Run the custom transform, if there is one.
    pub fn apply(&self, node: NodeRef<'_>, handler: &RawHandler<'_>) -> Option<Block> {
        self.transform
            .as_ref()
            .map(|transform| transform(node, handler))
    }
}

impl fmt::Debug for RawTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawTransform")
            .field("block_name", &self.block_name)
            .field("has_transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

/// Converts a `[tag ...]` shortcode into a block.
pub struct ShortcodeTransform {
    tags: Vec<String>,
    block_name: String,
    attributes: Box<ShortcodeAttributesFn>,
}

impl ShortcodeTransform {
    /// Transform `[tag]` shortcodes into `block_name` blocks.
    ///
    /// By default every named shortcode attribute becomes a string block
    /// attribute.
    pub fn new(tag: impl Into<String>, block_name: impl Into<String>) -> Self {
        Self {
            tags: vec![tag.into()],
            block_name: block_name.into(),
            attributes: Box::new(named_attributes),
        }
    }

    /// Also match another tag name.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replace the attribute mapping.
    #[must_use]
    pub fn with_attributes(
        mut self,
        attributes: impl Fn(&Shortcode) -> Attributes + Send + Sync + 'static,
    ) -> Self {
        self.attributes = Box::new(attributes);
        self
    }

    /// Shortcode tag names handled by this transform.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Target block type.
    #[must_use]
    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    /// Block attributes for a parsed shortcode.
    #[must_use]
    pub fn attributes(&self, shortcode: &Shortcode) -> Attributes {
        (self.attributes)(shortcode)
    }
}

impl fmt::Debug for ShortcodeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcodeTransform")
            .field("tags", &self.tags)
            .field("block_name", &self.block_name)
            .finish_non_exhaustive()
    }
}

fn named_attributes(shortcode: &Shortcode) -> Attributes {
    shortcode
        .named
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect()
}

/// Registered content model consulted by the pipeline.
pub trait BlockRegistry {
    /// Raw transforms in priority order.
    fn raw_transforms(&self) -> &[RawTransform];

    /// Shortcode transforms in priority order.
    fn shortcode_transforms(&self) -> &[ShortcodeTransform] {
        &[]
    }

    /// Extract the attributes of `block_name` from serialized HTML.
    fn block_attributes(&self, block_name: &str, html: &str) -> Attributes;

    /// Block type used for content no transform matches.
    fn unknown_type_name(&self) -> &str;

    /// Block factory.
    fn create_block(&self, name: &str, attributes: Attributes, inner_blocks: Vec<Block>) -> Block {
        Block {
            name: name.to_owned(),
            attributes,
            inner_blocks,
        }
    }

    /// Parse content that already carries block delimiters.
    fn parse_serialized(&self, content: &str) -> Vec<Block> {
        vec![self.create_block(
            self.unknown_type_name(),
            content_attributes(content),
            Vec::new(),
        )]
    }
}
