//! Raw HTML paste handling.
//!
//! Converts arbitrary pasted HTML (word processors, web pages, chat apps,
//! plain-text Markdown) into either sanitized inline markup or a list of
//! structured [`Block`]s.
//!
//! # Architecture
//!
//! [`RawHandler::handle`] runs the pipeline:
//! - serialized-block detection via [`BlockRegistry::parse_serialized`]
//! - Markdown conversion of plain-text pastes ([`MarkdownConverter`])
//! - shortcode segmentation ([`segment_html_to_shortcode_blocks`])
//! - structural [`filters`] over the tree ([`deep_filter_html`])
//! - schema enforcement ([`remove_invalid_html`]) and block normalization
//!   ([`normalise_blocks`])
//! - materialization of top-level elements through the registry's
//!   [`RawTransform`]s
//!
//! Block types are never hard-coded: the host supplies a [`BlockRegistry`].
//! A small `MockRegistry` is available behind the `mock` feature.
//!
//! # Example
//!
//! ```
//! use rp_raw::{
//!     Attributes, BlockRegistry, RawHandler, RawInput, RawMode, RawTransform, content_attributes,
//! };
//!
//! struct Paragraphs(Vec<RawTransform>);
//!
//! impl BlockRegistry for Paragraphs {
//!     fn raw_transforms(&self) -> &[RawTransform] {
//!         &self.0
//!     }
//!     fn block_attributes(&self, _block_name: &str, html: &str) -> Attributes {
//!         content_attributes(html)
//!     }
//!     fn unknown_type_name(&self) -> &str {
//!         "core/freeform"
//!     }
//! }
//!
//! let registry = Paragraphs(vec![RawTransform::for_tags("core/paragraph", &["p"])]);
//! let handler = RawHandler::new(&registry);
//!
//! let input = RawInput::new("<div><p>One</p><p>Two</p></div>").with_mode(RawMode::Blocks);
//! let blocks = handler.handle(&input).into_blocks().unwrap_or_default();
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(blocks[0].attribute_str("content"), Some("<p>One</p>"));
//! ```

mod enforce;
mod filter;
pub mod filters;
mod handler;
mod markdown;
mod materialize;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod normalise;
mod registry;
mod schema;
mod shortcode;
mod util;

pub use enforce::{clean_children, remove_invalid_html};
pub use filter::{FilterOutcome, NodeFilter, deep_filter_children, deep_filter_html};
pub use handler::{RawHandler, RawInput, RawMode, RawOutput};
pub use markdown::{CmarkConverter, MarkdownConverter, correct_chat_markdown};
pub use materialize::materialize;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockRegistry;
pub use normalise::{normalise_blocks, normalise_children};
pub use registry::{
    Attributes, Block, BlockRegistry, RawTransform, ShortcodeTransform, content_attributes,
};
pub use schema::{
    Children, ContentSchemaOptions, Schema, SchemaNode, content_schema, is_block_content,
    is_embedded, is_inline, is_phrasing_content, phrasing_content_schema,
};
pub use shortcode::{
    Piece, Shortcode, ShortcodeMatch, next_shortcode, parse_attributes,
    segment_html_to_shortcode_blocks,
};
pub use util::{is_empty, is_inline_content, is_plain, style_value};
