//! Phrasing content normalization.

use rp_dom::{Document, NodeId};

use crate::filter::{FilterOutcome, NodeFilter};
use crate::schema::{is_block_content, is_phrasing_content};
use crate::util::style_value;

/// Maps presentational markup to semantic phrasing tags.
///
/// Bold or italic `span` styles and `b`/`i` become `strong`/`em`. A
/// phrasing element wrapping block content is unwrapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhrasingContentReducer;

impl NodeFilter for PhrasingContentReducer {
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
        let Some(tag) = doc.tag_name(node) else {
            return FilterOutcome::Keep;
        };

        let replacement = match tag {
            "span" => span_replacement(doc.attr(node, "style").unwrap_or_default()),
            "b" => Some("strong"),
            "i" => Some("em"),
            _ => None,
        };

        let (node, outcome) = match replacement {
            Some(name) => {
                let new = doc.replace_tag(node, name);
                (new, FilterOutcome::Replaced(new))
            }
            None => (node, FilterOutcome::Keep),
        };

        if is_phrasing_content(doc.node_name(node))
            && doc
                .children(node)
                .iter()
                .any(|&child| is_block_content(doc.node_name(child)))
        {
            doc.unwrap(node);
        }

        outcome
    }
}

fn span_replacement(style: &str) -> Option<&'static str> {
    let weight = style_value(style, "font-weight");
    if matches!(weight.as_deref(), Some("bold" | "700")) {
        return Some("strong");
    }
    let font_style = style_value(style, "font-style");
    if font_style.as_deref() == Some("italic") {
        return Some("em");
    }
    None
}
