//! Special comment conversion.

use rp_dom::{Document, NodeId};

use crate::filter::{FilterOutcome, NodeFilter};

/// Tag used for blocks that pass through sanitization untouched.
pub const BLOCK_PASSTHROUGH_TAG: &str = "wp-block";

/// Converts `<!--more-->` and `<!--nextpage-->` comments into
/// `wp-block` placeholders.
///
/// Custom text after `more` is kept in `data-custom-text`; a later
/// `<!--noteaser-->` sibling is consumed and sets `data-no-teaser`. A
/// placeholder inside a paragraph splits the paragraph around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialCommentConverter;

impl NodeFilter for SpecialCommentConverter {
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
        let Some(comment) = doc.comment(node).map(str::to_owned) else {
            return FilterOutcome::Keep;
        };

        let block = if comment == "nextpage" {
            create_passthrough(doc, "core/nextpage")
        } else if let Some(rest) = comment.strip_prefix("more") {
            let no_teaser = take_no_teaser(doc, node);
            let block = create_passthrough(doc, "core/more");
            let custom_text = rest.trim();
            if !custom_text.is_empty() {
                doc.set_attr(block, "data-custom-text", custom_text);
            }
            if no_teaser {
                doc.set_attr(block, "data-no-teaser", "");
            }
            block
        } else {
            return FilterOutcome::Keep;
        };

        doc.replace(node, block);
        split_paragraph(doc, block);

        FilterOutcome::Replaced(block)
    }
}

fn create_passthrough(doc: &mut Document, block_name: &str) -> NodeId {
    let block = doc.create_element(BLOCK_PASSTHROUGH_TAG);
    doc.set_attr(block, "data-block", block_name);
    block
}

/// Remove the first following `<!--noteaser-->` sibling, if any.
fn take_no_teaser(doc: &mut Document, node: NodeId) -> bool {
    let mut sibling = doc.next_sibling(node);
    while let Some(current) = sibling {
        if doc.comment(current) == Some("noteaser") {
            doc.remove(current);
            return true;
        }
        sibling = doc.next_sibling(current);
    }
    false
}

/// Move `block` out of its parent paragraph, splitting the paragraph.
fn split_paragraph(doc: &mut Document, block: NodeId) {
    let Some(paragraph) = doc.parent_element(block).filter(|&p| doc.is_tag(p, "p")) else {
        return;
    };

    let siblings = doc.children(paragraph);
    let Some(index) = siblings.iter().position(|&child| child == block) else {
        return;
    };
    let tail_nodes = siblings[index + 1..].to_vec();

    doc.insert_after(paragraph, block);
    if !tail_nodes.is_empty() {
        let tail = doc.create_element("p");
        for child in tail_nodes {
            doc.append_child(tail, child);
        }
        doc.insert_after(block, tail);
    }
}
