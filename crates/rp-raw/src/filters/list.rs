//! List structure repair.

use rp_dom::{Document, NodeId};

use crate::filter::{FilterOutcome, NodeFilter};

/// Repairs list structures produced by editors and converters.
///
/// - A single-item list directly after a list of the same type is merged
///   into it.
/// - A nested list that is the only content of its item moves into the
///   previous item, or before the parent list when there is none.
/// - A list directly inside another list moves into the previous item, or
///   is unwrapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListReducer;

impl NodeFilter for ListReducer {
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
        if !is_list(doc, node) {
            return FilterOutcome::Keep;
        }

        if let Some(prev) = doc.previous_element_sibling(node)
            && doc.node_name(prev) == doc.node_name(node)
            && doc.element_children(node).len() == 1
        {
            for child in doc.children(node).to_vec() {
                doc.append_child(prev, child);
            }
            doc.remove(node);
            return FilterOutcome::Keep;
        }

        let Some(parent) = doc.parent_element(node) else {
            return FilterOutcome::Keep;
        };

        if doc.is_tag(parent, "li")
            && doc.element_children(parent).len() == 1
            && !has_own_text(doc, parent)
        {
            if let Some(prev_item) = doc.previous_element_sibling(parent) {
                doc.append_child(prev_item, node);
            } else if let Some(parent_list) = doc.parent(parent) {
                doc.insert_before(parent_list, node);
            }
            doc.remove(parent);
            return FilterOutcome::Keep;
        }

        if is_list(doc, parent) {
            match doc.previous_element_sibling(node) {
                Some(prev_item) => doc.append_child(prev_item, node),
                None => doc.unwrap(node),
            }
        }

        FilterOutcome::Keep
    }
}

/// Whether any direct text child has non-whitespace content.
fn has_own_text(doc: &Document, node: NodeId) -> bool {
    doc.children(node)
        .iter()
        .filter_map(|&child| doc.text(child))
        .any(|text| !text.trim().is_empty())
}

fn is_list(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "ul") || doc.is_tag(node, "ol")
}
