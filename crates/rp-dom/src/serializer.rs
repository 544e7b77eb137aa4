//! HTML serializer following the `innerHTML`/`outerHTML` conventions.

use std::fmt::Write;

use crate::document::{Document, NodeId, NodeKind};
use crate::parser::VOID_ELEMENTS;

/// Elements whose text children are written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "script", "style", "xmp",
];

impl Document {
    /// Serialize the children of a node.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::with_capacity(256);
        for &child in self.children(id) {
            self.serialize_node(child, &mut out);
        }
        out
    }

    /// Serialize a node including its own tag.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::with_capacity(256);
        self.serialize_node(id, &mut out);
        out
    }

    fn serialize_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Fragment => {
                for &child in self.children(id) {
                    self.serialize_node(child, out);
                }
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for attr in &el.attrs {
                    write!(out, r#" {}="{}""#, attr.name, escape_attr(&attr.value)).unwrap();
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&el.name.as_str()) {
                    return;
                }

                let raw = RAW_TEXT_ELEMENTS.contains(&el.name.as_str());
                for &child in self.children(id) {
                    match self.kind(child) {
                        NodeKind::Text(text) if raw => out.push_str(text),
                        _ => self.serialize_node(child, out),
                    }
                }

                write!(out, "</{}>", el.name).unwrap();
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(text) => write!(out, "<!--{text}-->").unwrap(),
        }
    }
}

/// Escape text content.
fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

/// Escape an attribute value.
fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

/// Escape per the HTML fragment serialization algorithm.
fn escape_html(text: &str, attribute_mode: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '\u{a0}' => result.push_str("&nbsp;"),
            '"' if attribute_mode => result.push_str("&quot;"),
            '<' if !attribute_mode => result.push_str("&lt;"),
            '>' if !attribute_mode => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_built_tree() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let strong = doc.create_element("strong");
        let bold = doc.create_text("Bold");
        let tail = doc.create_text(" text");
        doc.append_child(doc.root(), p);
        doc.append_child(p, strong);
        doc.append_child(strong, bold);
        doc.append_child(p, tail);

        assert_eq!(doc.inner_html(doc.root()), "<p><strong>Bold</strong> text</p>");
        assert_eq!(doc.outer_html(strong), "<strong>Bold</strong>");
        assert_eq!(doc.inner_html(p), "<strong>Bold</strong> text");
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let mut doc = Document::new();
        let img = doc.create_element("img");
        doc.set_attr(img, "class", "one");
        doc.append_child(doc.root(), img);
        assert_eq!(doc.inner_html(doc.root()), r#"<img class="one">"#);
    }

    #[test]
    fn test_escape_special_chars() {
        let doc = Document::parse("<p>a &lt; b &amp; c &gt; d&nbsp;e</p>");
        assert_eq!(
            doc.inner_html(doc.root()),
            "<p>a &lt; b &amp; c &gt; d&nbsp;e</p>"
        );
    }

    #[test]
    fn test_escape_attribute_quotes() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        doc.set_attr(a, "title", r#"say "hi" & <go>"#);
        doc.append_child(doc.root(), a);
        assert_eq!(
            doc.inner_html(doc.root()),
            r#"<a title="say &quot;hi&quot; &amp; <go>"></a>"#
        );
    }

    #[test]
    fn test_comments_round_trip() {
        let doc = Document::parse("<!--more-->x");
        assert_eq!(doc.inner_html(doc.root()), "<!--more-->x");
    }
}
