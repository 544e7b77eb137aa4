//! Raw handling entry point.
//!
//! [`RawHandler::handle`] decides between inline and block output, runs the
//! Markdown bridge for plain-text pastes and drives the filter, schema,
//! normalization and materialization stages.

use std::sync::LazyLock;

use regex::Regex;
use rp_config::{Config, DEFAULT_BLOCK_DELIMITER, ModeSetting, PasteConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enforce::remove_invalid_html;
use crate::filter::deep_filter_html;
use crate::filters::{BLOCK_FILTERS, INLINE_FILTERS};
use crate::markdown::{CmarkConverter, MarkdownConverter, correct_chat_markdown};
use crate::materialize::materialize;
use crate::normalise::normalise_blocks;
use crate::registry::{Block, BlockRegistry};
use crate::schema::{ContentSchemaOptions, Schema, content_schema, phrasing_content_schema};
use crate::shortcode::{Piece, segment_html_to_shortcode_blocks};
use crate::util::{is_inline_content, is_plain};

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<meta[^>]+>").expect("invalid meta tag regex"));

/// How pasted content is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawMode {
    /// Inline when the content allows it, blocks otherwise.
    #[default]
    Auto,
    /// Always sanitized inline markup.
    Inline,
    /// Always blocks.
    Blocks,
}

impl From<ModeSetting> for RawMode {
    fn from(mode: ModeSetting) -> Self {
        match mode {
            ModeSetting::Auto => Self::Auto,
            ModeSetting::Inline => Self::Inline,
            ModeSetting::Blocks => Self::Blocks,
        }
    }
}

/// Pasted content and how to treat it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    /// HTML flavour of the clipboard.
    pub html: String,
    /// Plain-text flavour of the clipboard, if any.
    pub plain_text: Option<String>,
    /// Requested output mode.
    pub mode: RawMode,
    /// Tag the content is inserted into, if known.
    pub tag_name: Option<String>,
    /// Keep `iframe` inside figures.
    pub allow_embedded_frames: bool,
}

impl RawInput {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    /// Input seeded with the defaults of the `[paste]` config section.
    pub fn from_config(config: &PasteConfig, html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            plain_text: None,
            mode: config.mode.into(),
            tag_name: config.tag_name.clone(),
            allow_embedded_frames: config.allow_embedded_frames,
        }
    }

    #[must_use]
    pub fn with_plain_text(mut self, plain_text: impl Into<String>) -> Self {
        self.plain_text = Some(plain_text.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RawMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    #[must_use]
    pub fn with_embedded_frames(mut self, allow: bool) -> Self {
        self.allow_embedded_frames = allow;
        self
    }
}

/// Result of raw handling.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// Sanitized inline markup.
    Inline(String),
    /// Blocks in document order.
    Blocks(Vec<Block>),
}

impl RawOutput {
    /// Inline markup, if the output is inline.
    #[must_use]
    pub fn as_inline(&self) -> Option<&str> {
        match self {
            Self::Inline(html) => Some(html),
            Self::Blocks(_) => None,
        }
    }

    /// Blocks, if the output is blocks.
    #[must_use]
    pub fn into_blocks(self) -> Option<Vec<Block>> {
        match self {
            Self::Inline(_) => None,
            Self::Blocks(blocks) => Some(blocks),
        }
    }
}

/// Converts pasted content into inline markup or blocks.
///
/// Block types come from the borrowed [`BlockRegistry`]; raw transforms
/// receive the handler so they can run the pipeline over nested content.
pub struct RawHandler<'r> {
    registry: &'r dyn BlockRegistry,
    markdown: Box<dyn MarkdownConverter + 'r>,
    block_delimiter: String,
}

impl<'r> RawHandler<'r> {
    /// Handler over `registry` with the default Markdown converter.
    pub fn new(registry: &'r dyn BlockRegistry) -> Self {
        Self {
            registry,
            markdown: Box::new(CmarkConverter::new()),
            block_delimiter: DEFAULT_BLOCK_DELIMITER.to_owned(),
        }
    }

    /// Handler configured from a loaded [`Config`].
    pub fn from_config(registry: &'r dyn BlockRegistry, config: &Config) -> Self {
        Self::new(registry)
            .with_markdown_converter(CmarkConverter::from_config(&config.markdown))
            .with_block_delimiter(config.paste.block_delimiter.clone())
    }

    #[must_use]
    pub fn with_markdown_converter(mut self, converter: impl MarkdownConverter + 'r) -> Self {
        self.markdown = Box::new(converter);
        self
    }

    /// Marker that identifies already-serialized block content.
    #[must_use]
    pub fn with_block_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.block_delimiter = delimiter.into();
        self
    }

    /// Registry the handler materializes blocks with.
    #[must_use]
    pub fn registry(&self) -> &'r dyn BlockRegistry {
        self.registry
    }

    /// Convert pasted content.
    pub fn handle(&self, input: &RawInput) -> RawOutput {
        let mut html = META_TAG.replace(&input.html, "").into_owned();
        let mut mode = input.mode;

        if mode != RawMode::Inline && html.contains(&self.block_delimiter) {
            debug!("Block delimiter found, parsing serialized blocks");
            return RawOutput::Blocks(self.registry.parse_serialized(&html));
        }

        if let Some(plain_text) = input.plain_text.as_deref().filter(|text| !text.is_empty())
            && is_plain(&html)
        {
            let plain_text = correct_chat_markdown(plain_text);
            html = self.markdown.to_html(&plain_text);

            if mode == RawMode::Auto
                && !plain_text.contains('\n')
                && !plain_text.starts_with("<p>")
                && html.starts_with("<p>")
            {
                mode = RawMode::Inline;
            }
            debug!(?mode, "Converted plain text as Markdown");
        }

        let pieces = segment_html_to_shortcode_blocks(&html, self.registry);
        let has_shortcodes = pieces.len() > 1;

        let auto_inline = mode == RawMode::Auto
            && !has_shortcodes
            && is_inline_content(&html, input.tag_name.as_deref());

        if mode == RawMode::Inline || auto_inline {
            let filtered = deep_filter_html(&html, INLINE_FILTERS);
            let filtered = remove_invalid_html(&filtered, phrasing_content_schema());
            debug!(html = %filtered, "Processed inline HTML");
            return RawOutput::Inline(filtered);
        }

        debug!(?mode, pieces = pieces.len(), "Handling content as blocks");
        let schema = content_schema(ContentSchemaOptions {
            allow_embedded_frames: input.allow_embedded_frames,
        });

        let mut blocks = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Block(block) => blocks.push(block),
                Piece::Html(piece) => blocks.extend(self.blocks_from_html(&piece, &schema)),
            }
        }
        RawOutput::Blocks(blocks)
    }

    fn blocks_from_html(&self, html: &str, schema: &Schema) -> Vec<Block> {
        let filtered = deep_filter_html(html, BLOCK_FILTERS);
        let sanitized = remove_invalid_html(&filtered, schema);
        let normalised = normalise_blocks(&sanitized);
        debug!(html = %normalised, "Processed HTML piece");
        materialize(&normalised, self)
    }
}
