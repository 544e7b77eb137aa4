//! Mutable HTML fragment tree for rawpaste.
//!
//! This crate provides the tree capability the raw-handling pipeline
//! operates on:
//! - [`parse_fragment`]: HTML5 fragment parsing through the `html5ever` tree
//!   builder
//! - [`Document`]: arena of nodes with in-place mutation (unwrap, replace
//!   tag, insert before/after, remove) and an attachment check
//! - [`Document::inner_html`] / [`Document::outer_html`]: serialization
//!
//! # Example
//!
//! ```
//! use rp_dom::Document;
//!
//! let mut doc = Document::parse("<div><b>bold</b></div>");
//! let div = doc.children(doc.root())[0];
//! doc.unwrap(div);
//! assert_eq!(doc.inner_html(doc.root()), "<b>bold</b>");
//! ```

mod document;
mod node_ref;
mod parser;
mod serializer;

pub use document::{
    Attribute, COMMENT_NODE_NAME, Document, ElementData, FRAGMENT_NODE_NAME, NodeId, NodeKind,
    TEXT_NODE_NAME,
};
pub use node_ref::NodeRef;
pub use parser::{VOID_ELEMENTS, parse_fragment};
