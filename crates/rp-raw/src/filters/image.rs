//! Image clean-up.

use rp_dom::{Document, NodeId};

use crate::filter::{FilterOutcome, NodeFilter};

/// Drops local `file:` sources and removes 1px tracking images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCorrector;

impl NodeFilter for ImageCorrector {
    fn apply(&self, doc: &mut Document, node: NodeId) -> FilterOutcome {
        if !doc.is_tag(node, "img") {
            return FilterOutcome::Keep;
        }

        if doc.attr(node, "src").is_some_and(|src| src.starts_with("file:")) {
            doc.set_attr(node, "src", "");
        }

        let is_pixel = |name: &str| doc.attr(node, name).is_some_and(is_one_pixel);
        if is_pixel("width") || is_pixel("height") {
            tracing::trace!("Removing tracking image");
            doc.remove(node);
        }

        FilterOutcome::Keep
    }
}

fn is_one_pixel(value: &str) -> bool {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim() == "1"
}
