//! Read-only view of a node.

use crate::document::{Document, NodeId};

/// Borrowed handle pairing a [`Document`] with one of its nodes.
///
/// Handed to matchers and transforms that must inspect a node without
/// mutating the tree.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Wrap a node of `doc`.
    #[must_use]
    pub fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// Underlying node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Owning document.
    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Lowercase tag name for elements.
    #[must_use]
    pub fn tag_name(&self) -> Option<&'a str> {
        self.doc.tag_name(self.id)
    }

    /// DOM-style node name (`#text`, `#comment` or the tag name).
    #[must_use]
    pub fn node_name(&self) -> &'a str {
        self.doc.node_name(self.id)
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.doc.attr(self.id, name)
    }

    /// Whether the class attribute contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
    }

    /// Child nodes.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id).iter().map(move |&id| NodeRef::new(doc, id))
    }

    /// Element children.
    pub fn element_children(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(|child| child.tag_name().is_some())
    }

    /// Concatenated descendant text.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.doc.text_content(self.id)
    }

    /// Serialized children.
    #[must_use]
    pub fn inner_html(&self) -> String {
        self.doc.inner_html(self.id)
    }

    /// Serialized node.
    #[must_use]
    pub fn outer_html(&self) -> String {
        self.doc.outer_html(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_node_ref_views() {
        let doc = Document::parse(r#"<figure class="wide big"><img src="a.png"><figcaption>Cap</figcaption></figure>"#);
        let figure = NodeRef::new(&doc, doc.children(doc.root())[0]);
        assert_eq!(figure.tag_name(), Some("figure"));
        assert!(figure.has_class("big"));
        assert!(!figure.has_class("wid"));
        let names: Vec<_> = figure.element_children().map(|c| c.node_name()).collect();
        assert_eq!(names, vec!["img", "figcaption"]);
        assert_eq!(figure.text_content(), "Cap");
        assert_eq!(
            figure.inner_html(),
            r#"<img src="a.png"><figcaption>Cap</figcaption>"#
        );
    }
}
