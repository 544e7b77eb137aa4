//! Word list conversion.
//!
//! Word exports list items as paragraphs styled with `mso-list` and a
//! leading bullet element. The indentation level lives in the style.

use std::sync::LazyLock;

use regex::Regex;
use rp_dom::{Document, NodeId};

use crate::filter::{FilterOutcome, NodeFilter};

static MSO_LIST_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mso-list\s*:[^;]+level([0-9]+)").expect("invalid mso-list regex")
});

/// Bullet glyphs that start an ordered list, matching the `ol` `type` values.
const ORDERED_LIST_TYPES: &[char] = &['1', 'i', 'I', 'a', 'A'];

/// Converts Word list paragraphs into nested `ul`/`ol` items.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsListConverter;

impl NodeFilter for MsListConverter {
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
        if !doc.is_tag(node, "p") {
            return FilterOutcome::Keep;
        }
        let Some(level) = doc.attr(node, "style").and_then(list_level) else {
            return FilterOutcome::Keep;
        };

        let list = match doc
            .previous_element_sibling(node)
            .filter(|&prev| is_list(doc, prev))
        {
            Some(list) => list,
            None => {
                let list = create_list(doc, node);
                doc.insert_before(node, list);
                list
            }
        };
        let list_tag = doc.node_name(list).to_owned();

        // The first element holds the bullet glyph.
        if let Some(bullet) = doc.first_element_child(node) {
            doc.remove(bullet);
        }

        let item = doc.create_element("li");
        for child in doc.children(node).to_vec() {
            doc.append_child(item, child);
        }

        // Each level steps into the last item and its trailing nested list.
        let mut receiving = list;
        for _ in 0..level {
            let Some(last_item) = doc.last_element_child(receiving) else {
                break;
            };
            receiving = match doc
                .last_element_child(last_item)
                .filter(|&child| is_list(doc, child))
            {
                Some(nested) => nested,
                None => {
                    let nested = doc.create_element(&list_tag);
                    doc.append_child(last_item, nested);
                    nested
                }
            };
        }

        doc.append_child(receiving, item);
        doc.remove(node);

        FilterOutcome::Keep
    }
}

/// Zero-based nesting level from an `mso-list` style declaration.
fn list_level(style: &str) -> Option<usize> {
    if !style.contains("mso-list") {
        return None;
    }
    let captures = MSO_LIST_LEVEL.captures(style)?;
    let level: usize = captures[1].parse().unwrap_or(1);
    Some(level.saturating_sub(1))
}

/// New list for the paragraph, ordered when the bullet is a list numeral.
fn create_list(doc: &mut Document, paragraph: NodeId) -> NodeId {
    let bullet = doc.text_content(paragraph).trim().chars().next();
    match bullet.filter(|c| ORDERED_LIST_TYPES.contains(c)) {
        Some(list_type) => {
            let list = doc.create_element("ol");
            doc.set_attr(list, "type", list_type.to_string());
            list
        }
        None => doc.create_element("ul"),
    }
}

fn is_list(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "ul") || doc.is_tag(node, "ol")
}
