//! Structural filters for the raw handling pipeline.
//!
//! Each filter is a [`NodeFilter`](crate::filter::NodeFilter) run by the
//! deep filter engine. [`BLOCK_FILTERS`] lists them in pipeline order.

mod blockquote;
mod embedded;
mod image;
mod list;
mod ms_list;
mod phrasing;
mod special_comment;

pub use blockquote::BlockquoteNormaliser;
pub use embedded::EmbeddedContentReducer;
pub use image::ImageCorrector;
pub use list::ListReducer;
pub use ms_list::MsListConverter;
pub use phrasing::PhrasingContentReducer;
pub use special_comment::{BLOCK_PASSTHROUGH_TAG, SpecialCommentConverter};

use crate::filter::NodeFilter;

/// Filters applied to inline content.
pub const INLINE_FILTERS: &[&dyn NodeFilter] = &[&PhrasingContentReducer];

/// Filters applied to every HTML piece in block mode, in order.
pub const BLOCK_FILTERS: &[&dyn NodeFilter] = &[
    &MsListConverter,
    &ListReducer,
    &ImageCorrector,
    &PhrasingContentReducer,
    &SpecialCommentConverter,
    &EmbeddedContentReducer,
    &BlockquoteNormaliser,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::deep_filter_html;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_block_filters_combined() {
        let html = concat!(
            r#"<p style="mso-list:l0 level1 lfo1"><span>·</span><b>one</b></p>"#,
            r#"<p>text<img src="file:///tmp/a.png"><!--more--></p>"#,
        );
        assert_eq!(
            deep_filter_html(html, BLOCK_FILTERS),
            concat!(
                "<ul><li><strong>one</strong></li></ul>",
                r#"<figure><img src=""></figure><p>text</p>"#,
                r#"<wp-block data-block="core/more"></wp-block>"#,
            )
        );
    }
}
