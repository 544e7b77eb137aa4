//! Node classification helpers shared by filters and the handler.

use rp_dom::{Document, NodeId, NodeKind};

use crate::schema::{is_embedded, is_inline};

/// Whether a node has no meaningful content.
///
/// Whitespace (non-breaking spaces included), `br` elements, comments and
/// attribute-less elements that are empty themselves do not count as
/// content. Elements carrying attributes and embedded media always do.
#[must_use]
pub fn is_empty(doc: &Document, id: NodeId) -> bool {
    doc.children(id).iter().all(|&child| match doc.kind(child) {
        NodeKind::Text(text) => text.trim().is_empty(),
        NodeKind::Element(el) => {
            el.name == "br"
                || (!is_embedded(&el.name) && el.attrs.is_empty() && is_empty(doc, child))
        }
        NodeKind::Comment(_) | NodeKind::Fragment => true,
    })
}

/// Whether the HTML is plain text, line breaks aside.
#[must_use]
pub fn is_plain(html: &str) -> bool {
    let mut doc = Document::parse(html);
    let root = doc.root();

    let brs: Vec<NodeId> = doc
        .descendants(root)
        .into_iter()
        .filter(|&id| doc.is_tag(id, "br"))
        .collect();
    for br in brs {
        let newline = doc.create_text("\n");
        doc.replace(br, newline);
    }
    doc.normalize(root);

    matches!(doc.children(root), [only] if doc.text(*only).is_some())
}

/// Whether the HTML can be inserted into `tag_name` as inline content.
///
/// Every element must be inline for the target tag (see
/// [`is_inline`]) and no top-level `<br><br>` paragraph break may occur.
#[must_use]
pub fn is_inline_content(html: &str, tag_name: Option<&str>) -> bool {
    let doc = Document::parse(html);
    let nodes = doc.element_children(doc.root());

    !nodes.iter().any(|&node| is_double_br(&doc, node)) && deep_check(&doc, &nodes, tag_name)
}

fn deep_check(doc: &Document, nodes: &[NodeId], tag_name: Option<&str>) -> bool {
    nodes.iter().all(|&node| {
        is_inline(doc.node_name(node), tag_name)
            && deep_check(doc, &doc.element_children(node), tag_name)
    })
}

fn is_double_br(doc: &Document, id: NodeId) -> bool {
    doc.is_tag(id, "br")
        && doc
            .previous_sibling(id)
            .is_some_and(|prev| doc.is_tag(prev, "br"))
}

/// Value of a property in an inline `style` attribute, trimmed and
/// lowercased. The last declaration wins.
#[must_use]
pub fn style_value(style: &str, property: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.trim().to_ascii_lowercase())
        .next_back()
}
