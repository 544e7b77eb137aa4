//! Embedded content extraction.

use rp_dom::{Document, NodeId};

use crate::filter::{FilterOutcome, NodeFilter};
use crate::schema::is_embedded;

/// Moves images and frames out of paragraphs into their own `figure`.
///
/// The figure is inserted before the closest `p` ancestor, or in place of
/// the media when there is none. An `a` whose only child is the image
/// travels with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedContentReducer;

impl NodeFilter for EmbeddedContentReducer {
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
        let Some(tag) = doc.tag_name(node) else {
            return FilterOutcome::Keep;
        };
        if !is_embedded(tag) {
            return FilterOutcome::Keep;
        }

        let mut to_insert = node;
        if tag == "img"
            && let Some(parent) = doc.parent_element(node)
            && doc.is_tag(parent, "a")
            && doc.children(parent).len() == 1
        {
            to_insert = parent;
        }

        let figure = doc.create_element("figure");
        let anchor = paragraph_ancestor(doc, to_insert).unwrap_or(to_insert);
        doc.insert_before(anchor, figure);
        doc.append_child(figure, to_insert);

        FilterOutcome::Keep
    }
}

/// The node itself or its closest ancestor that is a `p`.
fn paragraph_ancestor(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(id) = current {
        if doc.is_tag(id, "p") {
            return Some(id);
        }
        current = doc.parent_element(id);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::deep_filter_html;
    use pretty_assertions::assert_eq;

    fn reduce(html: &str) -> String {
        deep_filter_html(html, &[&EmbeddedContentReducer])
    }

    #[test]
    fn test_moves_embedded_content_from_paragraph() {
        assert_eq!(
            reduce(r#"<p><strong>test<img class="one"></strong><img class="two"></p>"#),
            r#"<figure><img class="one"></figure><figure><img class="two"></figure><p><strong>test</strong></p>"#
        );
    }

    #[test]
    fn test_moves_anchor_with_only_an_image() {
        assert_eq!(
            reduce(r##"<p><a href="#"><img class="one"></a><strong>test</strong></p>"##),
            r##"<figure><a href="#"><img class="one"></a></figure><p><strong>test</strong></p>"##
        );
    }

    #[test]
    fn test_moves_multiple_images() {
        assert_eq!(
            reduce(r##"<p><a href="#"><img class="one"></a><img class="two"><strong>test</strong></p>"##),
            r##"<figure><a href="#"><img class="one"></a></figure><figure><img class="two"></figure><p><strong>test</strong></p>"##
        );
    }

    #[test]
    fn test_wraps_top_level_media() {
        assert_eq!(
            reduce(r#"<iframe src="x"></iframe>"#),
            r#"<figure><iframe src="x"></iframe></figure>"#
        );
    }

    #[test]
    fn test_anchor_with_text_stays() {
        assert_eq!(
            reduce(r#"<div><a href="/"><img src="a">caption</a></div>"#),
            r#"<div><a href="/"><figure><img src="a"></figure>caption</a></div>"#
        );
    }
}
