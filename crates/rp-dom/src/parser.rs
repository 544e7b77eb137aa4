//! HTML fragment parsing.
//!
//! Parsing is driven by the `html5ever` fragment parser in a `body`
//! context, so tree construction follows the HTML5 algorithm: implied end
//! tags, the adoption agency for misnested formatting elements, foster
//! parenting out of tables and implied `tbody`/`tr` rows. The parser writes
//! straight into the arena [`Document`] through a [`TreeSink`]; the `html`
//! element the tree builder opens for the fragment is unwrapped at the end
//! so the root holds what `body.innerHTML = html` would produce.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, LocalName, Namespace, ParseOpts, QualName};

use crate::document::{Document, NodeId};

/// Elements that never have children.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse an HTML fragment into a new [`Document`].
///
/// Never fails: malformed markup is recovered the way browsers recover it.
#[must_use]
pub fn parse_fragment(html: &str) -> Document {
    let context = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from("body"),
    );
    html5ever::parse_fragment(ArenaSink::default(), ParseOpts::default(), context, Vec::new())
        .one(html)
}

impl Document {
    /// Parse an HTML fragment. See [`parse_fragment`].
    #[must_use]
    pub fn parse(html: &str) -> Self {
        parse_fragment(html)
    }
}

/// Qualified element name handed back to the tree builder.
#[derive(Debug)]
struct OwnedName(QualName);

impl ElemName for OwnedName {
    fn ns(&self) -> &Namespace {
        &self.0.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.0.local
    }
}

/// Tree sink building into an arena [`Document`].
///
/// The arena only keeps lowercase tag names, so the qualified names the
/// tree builder asks back for are tracked on the side.
#[derive(Default)]
struct ArenaSink {
    doc: RefCell<Document>,
    names: RefCell<HashMap<NodeId, QualName>>,
    /// Template element to the detached element holding its contents.
    templates: RefCell<HashMap<NodeId, NodeId>>,
}

impl ArenaSink {
    fn insert_text(doc: &mut Document, previous: Option<NodeId>, text: &str) -> Option<NodeId> {
        if let Some(previous) = previous
            && let Some(existing) = doc.text(previous)
        {
            let merged = format!("{existing}{text}");
            doc.set_text(previous, merged);
            return None;
        }
        Some(doc.create_text(text))
    }
}

impl TreeSink for ArenaSink {
    type Handle = NodeId;
    type Output = Document;
    type ElemName<'a>
        = OwnedName
    where
        Self: 'a;

    fn finish(self) -> Document {
        let mut doc = self.doc.into_inner();
        for (template, contents) in self.templates.into_inner() {
            for child in doc.children(contents).to_vec() {
                doc.append_child(template, child);
            }
        }
        let root = doc.root();
        for child in doc.children(root).to_vec() {
            if doc.is_tag(child, "html") {
                doc.unwrap(child);
            }
        }
        doc
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        tracing::trace!(error = %msg, "Recovered HTML parse error");
    }

    fn get_document(&self) -> NodeId {
        self.doc.borrow().root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> OwnedName {
        let name = self.names.borrow().get(target).cloned();
        OwnedName(name.unwrap_or_else(|| {
            QualName::new(None, Namespace::from(""), LocalName::from(""))
        }))
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        flags: ElementFlags,
    ) -> NodeId {
        let mut doc = self.doc.borrow_mut();
        let element = doc.create_element(&name.local);
        for attr in attrs {
            let attr_name = attr.name.local.to_ascii_lowercase();
            if doc.attr(element, &attr_name).is_none() {
                doc.set_attr(element, &attr_name, attr.value.to_string());
            }
        }
        if flags.template {
            let contents = doc.create_element("template");
            self.templates.borrow_mut().insert(element, contents);
        }
        self.names.borrow_mut().insert(element, name);
        element
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(data.to_string())
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        let mut doc = self.doc.borrow_mut();
        let node = match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => {
                let last = doc.last_child(*parent);
                match Self::insert_text(&mut doc, last, &text) {
                    Some(node) => node,
                    None => return,
                }
            }
        };
        doc.append_child(*parent, node);
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        let has_parent = self.doc.borrow().parent(*element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        self.templates
            .borrow()
            .get(target)
            .copied()
            .unwrap_or(*target)
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        let mut doc = self.doc.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => {
                let previous = doc.previous_sibling(*sibling);
                match Self::insert_text(&mut doc, previous, &text) {
                    Some(node) => node,
                    None => return,
                }
            }
        };
        doc.insert_before(*sibling, node);
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<Attribute>) {
        let mut doc = self.doc.borrow_mut();
        for attr in attrs {
            let attr_name = attr.name.local.to_ascii_lowercase();
            if doc.attr(*target, &attr_name).is_none() {
                doc.set_attr(*target, &attr_name, attr.value.to_string());
            }
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.doc.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        let mut doc = self.doc.borrow_mut();
        for child in doc.children(*node).to_vec() {
            doc.append_child(*new_parent, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roundtrip(html: &str) -> String {
        let doc = parse_fragment(html);
        doc.inner_html(doc.root())
    }

    #[test]
    fn test_parse_simple_element() {
        let doc = parse_fragment("<p>Hello</p>");
        let root = doc.root();
        assert_eq!(doc.children(root).len(), 1);
        let p = doc.children(root)[0];
        assert_eq!(doc.tag_name(p), Some("p"));
        assert_eq!(doc.text_content(p), "Hello");
    }

    #[test]
    fn test_parse_void_elements() {
        assert_eq!(
            roundtrip(r#"<p>a<br>b<img src="x.png">c</p>"#),
            r#"<p>a<br>b<img src="x.png">c</p>"#
        );
    }

    #[test]
    fn test_parse_entities() {
        let doc = parse_fragment("<p>a&nbsp;b &amp; c</p>");
        let p = doc.children(doc.root())[0];
        assert_eq!(doc.text_content(p), "a\u{a0}b & c");
    }

    #[test]
    fn test_parse_uppercase_tags() {
        assert_eq!(roundtrip("<P CLASS=x>t</P>"), r#"<p class="x">t</p>"#);
    }

    #[test]
    fn test_parse_comments() {
        let doc = parse_fragment("<p>a<!--more-->b</p>");
        let p = doc.children(doc.root())[0];
        let comment = doc.children(p)[1];
        assert_eq!(doc.comment(comment), Some("more"));
    }

    #[test]
    fn test_implied_paragraph_end() {
        assert_eq!(roundtrip("<p>one<p>two"), "<p>one</p><p>two</p>");
        assert_eq!(roundtrip("<p>one<ul><li>x</ul>"), "<p>one</p><ul><li>x</li></ul>");
    }

    #[test]
    fn test_implied_list_item_end() {
        assert_eq!(
            roundtrip("<ul><li>one<li>two</ul>"),
            "<ul><li>one</li><li>two</li></ul>"
        );
    }

    #[test]
    fn test_implied_tbody() {
        assert_eq!(
            roundtrip("<table><tr><td>a<td>b</table>"),
            "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_stray_end_tags_ignored() {
        assert_eq!(roundtrip("a</div>b</span>"), "ab");
    }

    #[test]
    fn test_unclosed_elements_closed_at_end() {
        assert_eq!(roundtrip("<p><strong>bold"), "<p><strong>bold</strong></p>");
    }

    #[test]
    fn test_document_wrappers_dropped() {
        assert_eq!(
            roundtrip("<html><body><p>x</p></body></html>"),
            "<p>x</p>"
        );
    }

    #[test]
    fn test_raw_text_not_parsed() {
        let doc = parse_fragment("<script>if (a<b) {}</script>");
        let script = doc.children(doc.root())[0];
        assert_eq!(doc.text_content(script), "if (a<b) {}");
    }

    #[test]
    fn test_duplicate_attributes_keep_first() {
        assert_eq!(roundtrip(r#"<a href="1" href="2">x</a>"#), r#"<a href="1">x</a>"#);
    }

    #[test]
    fn test_cells_get_implied_rows() {
        assert_eq!(
            roundtrip("<table><td>Cell</td></table>"),
            "<table><tbody><tr><td>Cell</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_misnested_formatting_is_reopened() {
        assert_eq!(
            roundtrip("<b>bold <i>both</b> italic</i>"),
            "<b>bold <i>both</i></b><i> italic</i>"
        );
    }

    #[test]
    fn test_nested_anchor_closes_previous() {
        assert_eq!(
            roundtrip("<a href=1>x<a href=2>y</a>"),
            r#"<a href="1">x</a><a href="2">y</a>"#
        );
    }

    #[test]
    fn test_text_in_table_is_fostered_before_it() {
        assert_eq!(
            roundtrip("<table><tr><td>a</td></tr>stray</table>"),
            "stray<table><tbody><tr><td>a</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_template_contents_kept() {
        assert_eq!(
            roundtrip("<template><p>x</p></template>"),
            "<template><p>x</p></template>"
        );
    }

    #[test]
    fn test_adjacent_text_merged() {
        let doc = parse_fragment("a</div>b");
        assert_eq!(doc.children(doc.root()).len(), 1);
    }
}
