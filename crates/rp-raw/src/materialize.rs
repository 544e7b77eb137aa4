//! Block materialization.

use rp_dom::{Document, NodeRef};

use crate::handler::RawHandler;
use crate::registry::{Block, content_attributes};

/// Convert every top-level element of sanitized HTML into exactly one block.
///
/// The first raw transform that matches an element wins. Elements no
/// transform claims become the registry's unknown block type holding their
/// outer HTML.
#[must_use]
pub fn materialize(html: &str, handler: &RawHandler<'_>) -> Vec<Block> {
    let doc = Document::parse(html);
    doc.element_children(doc.root())
        .into_iter()
        .map(|id| materialize_node(NodeRef::new(&doc, id), handler))
        .collect()
}

fn materialize_node(node: NodeRef<'_>, handler: &RawHandler<'_>) -> Block {
    let registry = handler.registry();

    let Some(transform) = registry
        .raw_transforms()
        .iter()
        .find(|transform| transform.matches(node))
    else {
        tracing::trace!(tag = node.node_name(), "No raw transform matched");
        return registry.create_block(
            registry.unknown_type_name(),
            content_attributes(node.outer_html()),
            Vec::new(),
        );
    };

    match transform.apply(node, handler) {
        Some(block) => block,
        None => registry.create_block(
            transform.block_name(),
            registry.block_attributes(transform.block_name(), &node.outer_html()),
            Vec::new(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRegistry;
    use crate::registry::BlockRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_one_block_per_element_in_order() {
        let registry = MockRegistry::new();
        let handler = RawHandler::new(&registry);
        let blocks = materialize("<p>a</p><hr><h2>t</h2>", &handler);

        let names: Vec<_> = blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["core/paragraph", "core/separator", "core/heading"]);
        assert_eq!(blocks[0].attribute_str("content"), Some("<p>a</p>"));
        assert_eq!(blocks[2].attribute_str("content"), Some("t"));
        assert_eq!(blocks[2].attributes.get("level"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_unknown_elements_fall_back() {
        let registry = MockRegistry::new();
        let handler = RawHandler::new(&registry);
        let blocks = materialize(r#"<div class="x">a</div>"#, &handler);
        assert_eq!(
            blocks,
            vec![registry.create_block(
                "core/freeform",
                content_attributes(r#"<div class="x">a</div>"#),
                Vec::new()
            )]
        );
    }

    #[test]
    fn test_loose_text_ignored() {
        let registry = MockRegistry::new();
        let handler = RawHandler::new(&registry);
        assert!(materialize("just text", &handler).is_empty());
    }
}
