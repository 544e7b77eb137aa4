//! Shortcode extraction.
//!
//! Shortcodes (`[gallery ids="1,2"]`, `[caption]...[/caption]`) named by the
//! registry's shortcode transforms are cut out of the HTML before parsing
//! and turned into blocks. The remaining HTML stays in between as
//! [`Piece::Html`], empty strings included, so the piece count tells
//! whether anything matched.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::registry::{Block, BlockRegistry, ShortcodeTransform};

/// Shortcode attribute syntaxes: `name="v"`, `name='v'`, `name=v`, `"v"`, `v`.
static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"([\w-]+)\s*=\s*"([^"]*)"(?:\s|$)|([\w-]+)\s*=\s*'([^']*)'(?:\s|$)|([\w-]+)\s*=\s*([^\s'"]+)(?:\s|$)|"([^"]*)"(?:\s|$)|(\S+)(?:\s|$)"#,
    )
    .expect("invalid shortcode attribute regex")
});

/// Ordered output of shortcode extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    /// HTML still to be processed.
    Html(String),
    /// Block built from a shortcode.
    Block(Block),
}

/// Parsed shortcode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortcode {
    /// Tag name.
    pub tag: String,
    /// Named attributes with lowercase names.
    pub named: BTreeMap<String, String>,
    /// Positional attributes.
    pub numeric: Vec<String>,
    /// Enclosed content, `None` for self-closing shortcodes.
    pub content: Option<String>,
}

/// Shortcode located in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcodeMatch {
    /// Byte offset of the opening `[`.
    pub index: usize,
    /// Byte offset just past the shortcode.
    pub end: usize,
    /// Parsed shortcode.
    pub shortcode: Shortcode,
}

/// Find the next `[tag]` shortcode at or after byte offset `from`.
///
/// Escaped shortcodes (`[[tag]]`) are skipped.
#[must_use]
pub fn next_shortcode(tag: &str, text: &str, from: usize) -> Option<ShortcodeMatch> {
    let opening = format!("[{tag}");
    let closing = format!("[/{tag}]");
    let mut search = from;

    while let Some(offset) = text.get(search..)?.find(&opening) {
        let index = search + offset;
        search = index + 1;

        let after_tag = index + opening.len();
        // The tag name must end here: `[gallery` does not open `[galleryx`.
        match text[after_tag..].chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' || c == '-' => continue,
            None => return None,
            Some(_) => {}
        }

        let Some(close_offset) = text[after_tag..].find(']') else {
            return None;
        };
        let attrs_end = after_tag + close_offset;
        let raw_attrs = &text[after_tag..attrs_end];
        let mut end = attrs_end + 1;

        let (raw_attrs, content) = if let Some(attrs) = raw_attrs.strip_suffix('/') {
            (attrs, None)
        } else if let Some(content_len) = text[end..].find(&closing) {
            let content = text[end..end + content_len].to_owned();
            end += content_len + closing.len();
            (raw_attrs, Some(content))
        } else {
            (raw_attrs, None)
        };

        if index > 0 && text[..index].ends_with('[') && text[end..].starts_with(']') {
            continue;
        }

        let (named, numeric) = parse_attributes(raw_attrs);
        return Some(ShortcodeMatch {
            index,
            end,
            shortcode: Shortcode {
                tag: tag.to_owned(),
                named,
                numeric,
                content,
            },
        });
    }

    None
}

/// Parse a shortcode attribute string into named and positional values.
#[must_use]
pub fn parse_attributes(text: &str) -> (BTreeMap<String, String>, Vec<String>) {
    let text = text.replace(['\u{a0}', '\u{200b}'], " ");
    let mut named = BTreeMap::new();
    let mut numeric = Vec::new();

    for captures in ATTRIBUTE_PATTERN.captures_iter(&text) {
        let group = |i: usize| captures.get(i).map(|m| m.as_str());
        if let (Some(name), Some(value)) = (group(1), group(2)) {
            named.insert(name.to_lowercase(), value.to_owned());
        } else if let (Some(name), Some(value)) = (group(3), group(4)) {
            named.insert(name.to_lowercase(), value.to_owned());
        } else if let (Some(name), Some(value)) = (group(5), group(6)) {
            named.insert(name.to_lowercase(), value.to_owned());
        } else if let Some(value) = group(7).or_else(|| group(8)) {
            numeric.push(value.to_owned());
        }
    }

    (named, numeric)
}

/// Split `html` into HTML pieces and blocks built from registered
/// shortcodes.
#[must_use]
pub fn segment_html_to_shortcode_blocks(html: &str, registry: &dyn BlockRegistry) -> Vec<Piece> {
    let transforms = registry.shortcode_transforms();
    let mut pieces = Vec::new();
    let mut rest = html;

    while let Some((transform, found)) = earliest_match(transforms, rest) {
        tracing::trace!(tag = %found.shortcode.tag, block = transform.block_name(), "Matched shortcode");

        let mut attributes = match &found.shortcode.content {
            Some(content) => registry.block_attributes(transform.block_name(), content),
            None => serde_json::Map::new(),
        };
        attributes.extend(transform.attributes(&found.shortcode));
        let block = registry.create_block(transform.block_name(), attributes, Vec::new());

        pieces.push(Piece::Html(rest[..found.index].to_owned()));
        pieces.push(Piece::Block(block));
        rest = &rest[found.end..];
    }

    pieces.push(Piece::Html(rest.to_owned()));
    pieces
}

fn earliest_match<'t>(
    transforms: &'t [ShortcodeTransform],
    text: &str,
) -> Option<(&'t ShortcodeTransform, ShortcodeMatch)> {
    transforms
        .iter()
        .flat_map(|transform| {
            transform
                .tags()
                .iter()
                .filter_map(move |tag| next_shortcode(tag, text, 0).map(|found| (transform, found)))
        })
        .min_by_key(|(_, found)| found.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRegistry;
    use crate::registry::content_attributes;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_next_self_closing() {
        let found = next_shortcode("gallery", r#"a [gallery ids="1,2" /] b"#, 0).unwrap();
        assert_eq!(found.index, 2);
        assert_eq!(found.end, 23);
        assert_eq!(found.shortcode.content, None);
        assert_eq!(found.shortcode.named.get("ids").map(String::as_str), Some("1,2"));
    }

    #[test]
    fn test_next_enclosing() {
        let text = "[caption align=left]<img src=x> Cap[/caption] tail";
        let found = next_shortcode("caption", text, 0).unwrap();
        assert_eq!(found.index, 0);
        assert_eq!(&text[found.end..], " tail");
        assert_eq!(
            found.shortcode.content.as_deref(),
            Some("<img src=x> Cap")
        );
        assert_eq!(found.shortcode.named.get("align").map(String::as_str), Some("left"));
    }

    #[test]
    fn test_next_without_closing_tag() {
        let found = next_shortcode("gallery", "[gallery] text", 0).unwrap();
        assert_eq!(found.end, 9);
        assert_eq!(found.shortcode.content, None);
    }

    #[test]
    fn test_next_skips_other_tags_and_escapes() {
        assert_eq!(next_shortcode("gallery", "[galleryx]", 0), None);
        assert_eq!(next_shortcode("gallery", "[[gallery]]", 0), None);
        let found = next_shortcode("gallery", "[[gallery]] [gallery]", 0).unwrap();
        assert_eq!(found.index, 12);
    }

    #[test]
    fn test_parse_attributes() {
        let (named, numeric) =
            parse_attributes(r#"ID="a" size='large' columns=3 "quoted" bare"#);
        assert_eq!(named.get("id").map(String::as_str), Some("a"));
        assert_eq!(named.get("size").map(String::as_str), Some("large"));
        assert_eq!(named.get("columns").map(String::as_str), Some("3"));
        assert_eq!(numeric, vec!["quoted".to_owned(), "bare".to_owned()]);
    }

    #[test]
    fn test_segment_without_shortcodes() {
        let registry = MockRegistry::new();
        assert_eq!(
            segment_html_to_shortcode_blocks("<p>a</p>", &registry),
            vec![Piece::Html("<p>a</p>".to_owned())]
        );
    }

    #[test]
    fn test_segment_shortcodes() {
        let registry = MockRegistry::new();
        let pieces = segment_html_to_shortcode_blocks(
            r#"<p>a</p>[gallery ids="1,2"]<p>b</p>[gallery ids="3"]"#,
            &registry,
        );

        let gallery = |ids: &str| {
            let mut attributes = serde_json::Map::new();
            attributes.insert("ids".to_owned(), Value::String(ids.to_owned()));
            Piece::Block(registry.create_block("core/gallery", attributes, Vec::new()))
        };
        assert_eq!(
            pieces,
            vec![
                Piece::Html("<p>a</p>".to_owned()),
                gallery("1,2"),
                Piece::Html("<p>b</p>".to_owned()),
                gallery("3"),
                Piece::Html(String::new()),
            ]
        );
    }

    #[test]
    fn test_segment_enclosing_uses_content() {
        let registry = MockRegistry::new();
        let pieces = segment_html_to_shortcode_blocks("[caption]Hello[/caption]", &registry);
        let mut attributes = content_attributes("Hello");
        attributes.insert("align".to_owned(), Value::String("none".to_owned()));
        assert_eq!(
            pieces,
            vec![
                Piece::Html(String::new()),
                Piece::Block(registry.create_block("core/image", attributes, Vec::new())),
                Piece::Html(String::new()),
            ]
        );
    }
}
