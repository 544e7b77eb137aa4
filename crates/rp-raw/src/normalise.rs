//! Block normalization.
//!
//! Turns a mix of block elements, loose text and inline elements into a
//! sequence of block elements: loose content is gathered into paragraphs,
//! `<br><br>` starts a new paragraph and empty paragraphs are dropped.

use std::collections::VecDeque;

use rp_dom::{Document, NodeId};

use crate::schema::is_inline;
use crate::util::is_empty;

/// Normalize the top level of an HTML fragment into blocks.
#[must_use]
pub fn normalise_blocks(html: &str) -> String {
    let mut doc = Document::parse(html);
    let root = doc.root();
    normalise_children(&mut doc, root);
    doc.inner_html(root)
}

/// Normalize the children of `parent` in place.
pub fn normalise_children(doc: &mut Document, parent: NodeId) {
    let mut queue: VecDeque<NodeId> = doc.children(parent).iter().copied().collect();
    doc.remove_children(parent);

    while let Some(node) = queue.pop_front() {
        if let Some(text) = doc.text(node) {
            if !text.trim().is_empty() {
                let paragraph = trailing_paragraph(doc, parent);
                doc.append_child(paragraph, node);
            }
            continue;
        }

        let Some(tag) = doc.tag_name(node).map(str::to_owned) else {
            continue;
        };

        match tag.as_str() {
            "br" => {
                if queue.front().is_some_and(|&next| doc.is_tag(next, "br")) {
                    queue.pop_front();
                    let paragraph = doc.create_element("p");
                    doc.append_child(parent, paragraph);
                }
                // A break only continues a paragraph that already has content.
                if let Some(last) = doc.last_child(parent)
                    && doc.is_tag(last, "p")
                    && doc.has_children(last)
                {
                    doc.append_child(last, node);
                }
            }
            "p" => {
                if !is_empty(doc, node) {
                    doc.append_child(parent, node);
                }
            }
            _ if is_inline(&tag, None) => {
                let paragraph = trailing_paragraph(doc, parent);
                doc.append_child(paragraph, node);
            }
            _ => doc.append_child(parent, node),
        }
    }

    let leftovers: Vec<NodeId> = doc
        .children(parent)
        .iter()
        .copied()
        .filter(|&child| doc.is_tag(child, "p") && !doc.has_children(child))
        .collect();
    for paragraph in leftovers {
        doc.remove(paragraph);
    }
}

/// Last child of `parent` if it is a paragraph, or a new trailing paragraph.
fn trailing_paragraph(doc: &mut Document, parent: NodeId) -> NodeId {
    match doc.last_child(parent) {
        Some(last) if doc.is_tag(last, "p") => last,
        _ => {
            let paragraph = doc.create_element("p");
            doc.append_child(parent, paragraph);
            paragraph
        }
    }
}
