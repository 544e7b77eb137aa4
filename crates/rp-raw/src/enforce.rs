//! Schema enforcement.
//!
//! Walks a fragment against a [`Schema`]: allowed elements are stripped of
//! disallowed attributes and classes and recursed into with their child
//! schema, disallowed elements are unwrapped, and empty containers are
//! dropped.

use rp_dom::{Document, NodeId, NodeKind, TEXT_NODE_NAME};

use crate::schema::{Schema, SchemaNode, is_block_content};
use crate::util::is_empty;

/// Remove everything from `html` that `schema` does not allow.
#[must_use]
pub fn remove_invalid_html(html: &str, schema: &Schema) -> String {
    let mut doc = Document::parse(html);
    let root = doc.root();
    clean_children(&mut doc, root, schema);
    doc.inner_html(root)
}

/// Enforce `schema` on the children of `parent` in place.
pub fn clean_children(doc: &mut Document, parent: NodeId, schema: &Schema) {
    let nodes = doc.children(parent).to_vec();
    for node in nodes {
        clean_node(doc, node, schema);
    }
}

fn clean_node(doc: &mut Document, node: NodeId, schema: &Schema) {
    match doc.kind(node) {
        NodeKind::Text(_) => {
            if !schema.contains(TEXT_NODE_NAME) {
                doc.remove(node);
            }
        }
        NodeKind::Comment(_) | NodeKind::Fragment => doc.remove(node),
        NodeKind::Element(el) => {
            let tag = el.name.clone();
            match schema.get(&tag) {
                Some(entry) => clean_element(doc, node, entry),
                None => unwrap_invalid(doc, node, &tag, schema),
            }
        }
    }
}

fn clean_element(doc: &mut Document, node: NodeId, entry: &SchemaNode) {
    for name in doc.attr_names(node) {
        if name != "class" && !entry.allows_attribute(&name) {
            doc.remove_attr(node, &name);
        }
    }

    if let Some(class) = doc.attr(node, "class") {
        let kept = class
            .split(' ')
            .filter(|name| !name.is_empty() && entry.allows_class(name))
            .collect::<Vec<_>>()
            .join(" ");
        if kept.is_empty() {
            doc.remove_attr(node, "class");
        } else {
            doc.set_attr(node, "class", kept);
        }
    }

    match &entry.children {
        None => doc.remove_children(node),
        Some(children) => {
            clean_children(doc, node, children.schema());
            // Checked after cleaning so a second pass finds nothing to remove.
            if is_empty(doc, node) {
                doc.remove(node);
            }
        }
    }
}

fn unwrap_invalid(doc: &mut Document, node: NodeId, tag: &str, schema: &Schema) {
    clean_children(doc, node, schema);

    if is_block_content(tag)
        && schema.contains("br")
        && doc.next_element_sibling(node).is_some()
    {
        let br = doc.create_element("br");
        doc.insert_after(node, br);
    }

    doc.unwrap(node);
}
