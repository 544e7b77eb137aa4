//! Blockquote content normalization.

use rp_dom::{Document, NodeId};

use crate::filter::{FilterOutcome, NodeFilter};
use crate::normalise::normalise_children;

/// Normalizes the children of every `blockquote` into blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockquoteNormaliser;

impl NodeFilter for BlockquoteNormaliser {
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
        if doc.is_tag(node, "blockquote") {
            normalise_children(doc, node);
        }
        FilterOutcome::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::deep_filter_html;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wraps_quote_text_in_paragraphs() {
        assert_eq!(
            deep_filter_html(
                "<blockquote>one<br><br>two <em>x</em></blockquote>",
                &[&BlockquoteNormaliser]
            ),
            "<blockquote><p>one</p><p>two <em>x</em></p></blockquote>"
        );
    }

    #[test]
    fn test_keeps_block_children() {
        assert_eq!(
            deep_filter_html("<blockquote><p>a</p><p></p></blockquote>", &[&BlockquoteNormaliser]),
            "<blockquote><p>a</p></blockquote>"
        );
    }
}
