//! Post-order tree rewriting.
//!
//! A [`NodeFilter`] inspects one node at a time and may mutate the tree
//! around it. [`deep_filter_html`] runs an ordered list of filters over every
//! node of a fragment, children before parents.

use rp_dom::{Document, NodeId};

/// Result of applying a filter to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The node keeps its identity (it may still have been moved or removed).
    Keep,
    /// The node was replaced; later filters of the pass see the new node.
    Replaced(NodeId),
}

/// Tree rewriting step applied to every node of a fragment.
pub trait NodeFilter {
    /// Inspect and possibly rewrite `node`.
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome;
}

/// Parse `html`, run `filters` over every node and serialize the result.
#[must_use]
pub fn deep_filter_html(html: &str, filters: &[&dyn NodeFilter]) -> String {
    let mut doc = Document::parse(html);
    let root = doc.root();
    deep_filter_children(&mut doc, root, filters);
    doc.inner_html(root)
}

/// Run `filters` over the descendants of `parent`, children first.
///
/// Each child list is snapshotted before it is visited, so nodes a filter
/// inserts are not visited in the same pass. Filters are skipped for nodes
/// that are no longer attached to the document.
pub fn deep_filter_children(doc: &mut Document, parent: NodeId, filters: &[&dyn NodeFilter]) {
    let nodes = doc.children(parent).to_vec();
    for mut node in nodes {
        deep_filter_children(doc, node, filters);

        for filter in filters {
            if !doc.contains(node) {
                continue;
            }
            if let FilterOutcome::Replaced(new) = filter.apply(doc, node) {
                node = new;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Records the visit order.
    struct Recorder {
        visited: RefCell<Vec<String>>,
    }

    impl NodeFilter for Recorder {
        fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
            self.visited.borrow_mut().push(doc.node_name(node).to_owned());
            FilterOutcome::Keep
        }
    }

    /// Renames `b` to `strong`.
    struct Rename;

    impl NodeFilter for Rename {
        fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
            if doc.is_tag(node, "b") {
                return FilterOutcome::Replaced(doc.replace_tag(node, "strong"));
            }
            FilterOutcome::Keep
        }
    }

    /// Removes `span` elements with their content.
    struct Remove;

    impl NodeFilter for Remove {
        fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
            if doc.is_tag(node, "span") {
                doc.remove(node);
            }
            FilterOutcome::Keep
        }
    }

    /// Adds a marker `i` element before every `em`.
    struct InsertBefore;

    impl NodeFilter for InsertBefore {
        fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
            if doc.is_tag(node, "em") {
                let marker = doc.create_element("i");
                doc.insert_before(node, marker);
            }
            FilterOutcome::Keep
        }
    }

    #[test]
    fn test_post_order_traversal() {
        let recorder = Recorder {
            visited: RefCell::new(Vec::new()),
        };
        let html = deep_filter_html("<p><em>a</em>b</p><hr>", &[&recorder]);
        assert_eq!(html, "<p><em>a</em>b</p><hr>");
        assert_eq!(
            recorder.visited.into_inner(),
            vec!["#text", "em", "#text", "p", "hr"]
        );
    }

    #[test]
    fn test_replaced_node_is_seen_by_later_filters() {
        let recorder = Recorder {
            visited: RefCell::new(Vec::new()),
        };
        let html = deep_filter_html("<b>x</b>", &[&Rename, &recorder]);
        assert_eq!(html, "<strong>x</strong>");
        assert_eq!(recorder.visited.into_inner(), vec!["#text", "strong"]);
    }

    #[test]
    fn test_detached_nodes_are_skipped() {
        let recorder = Recorder {
            visited: RefCell::new(Vec::new()),
        };
        let html = deep_filter_html("<span>gone</span>kept", &[&Remove, &recorder]);
        assert_eq!(html, "kept");
        assert_eq!(recorder.visited.into_inner(), vec!["#text", "#text"]);
    }

    #[test]
    fn test_inserted_nodes_not_revisited() {
        let recorder = Recorder {
            visited: RefCell::new(Vec::new()),
        };
        let html = deep_filter_html("<em>a</em>", &[&InsertBefore, &recorder]);
        assert_eq!(html, "<i></i><em>a</em>");
        assert_eq!(recorder.visited.into_inner(), vec!["#text", "em"]);
    }
}
