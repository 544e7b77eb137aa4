//! Content schemas.
//!
//! A [`Schema`] maps lowercase tag names (plus the `#text` sentinel) to the
//! attributes, classes and children allowed for that tag. Tags missing from
//! a schema are invalid in that scope and get unwrapped by the enforcer.
//!
//! Self-referencing grammars (`strong > em > strong`, `ul > li > ul`) are
//! expressed through [`Children`] scope references that resolve to other
//! precomputed schemas, so every schema is a finite value built once.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rp_dom::TEXT_NODE_NAME;

/// Phrasing tags that may nest any other phrasing tag but themselves.
const RECURSIVE_PHRASING_TAGS: &[&str] =
    &["strong", "em", "del", "ins", "a", "code", "abbr", "sub", "sup"];

/// Tag groups whose members count as inline when inserted into each other.
const INLINE_TAG_GROUPS: &[&[&str]] = &[
    &["ul", "li", "ol"],
    &["h1", "h2", "h3", "h4", "h5", "h6"],
];

/// Classes allowed on embedded images.
const IMAGE_ALIGN_CLASSES: &[&str] = &["alignleft", "aligncenter", "alignright", "alignnone"];

/// Allowed children of a schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// The full phrasing schema.
    Phrasing,
    /// The phrasing schema without the named tag.
    PhrasingWithout(&'static str),
    /// The list content schema (phrasing plus nested lists).
    List,
    /// An explicit nested schema.
    Nested(Schema),
}

impl Children {
    /// Schema the children are validated against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        match self {
            Self::Phrasing => phrasing_content_schema(),
            Self::PhrasingWithout(tag) => PHRASING_WITHOUT
                .get(tag)
                .unwrap_or_else(phrasing_content_schema),
            Self::List => &LIST_SCHEMA,
            Self::Nested(schema) => schema,
        }
    }
}

/// Rules for a single tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaNode {
    /// Attributes kept on the element. `class` is governed by `classes`.
    pub attributes: Vec<&'static str>,
    /// Classes kept in the `class` attribute.
    pub classes: Vec<&'static str>,
    /// Allowed children; `None` means the element must be childless.
    pub children: Option<Children>,
}

impl SchemaNode {
    /// Entry without attributes or children.
    #[must_use]
    pub fn leaf() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: &[&'static str]) -> Self {
        self.attributes = attributes.to_vec();
        self
    }

    #[must_use]
    pub fn with_classes(mut self, classes: &[&'static str]) -> Self {
        self.classes = classes.to_vec();
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Children) -> Self {
        self.children = Some(children);
        self
    }

    /// Whether an attribute (other than `class`) survives.
    #[must_use]
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|allowed| *allowed == name)
    }

    /// Whether a class survives.
    #[must_use]
    pub fn allows_class(&self, class: &str) -> bool {
        self.classes.iter().any(|allowed| *allowed == class)
    }
}

/// Mapping from tag name to its rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entries: BTreeMap<&'static str, SchemaNode>,
}

impl Schema {
    /// Empty schema: nothing is allowed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rules for a tag.
    #[must_use]
    pub fn with(mut self, tag: &'static str, node: SchemaNode) -> Self {
        self.entries.insert(tag, node);
        self
    }

    /// Rules for a tag, if the tag is allowed.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&SchemaNode> {
        self.entries.get(tag)
    }

    /// Whether a tag is allowed.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Allowed tag names in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Copy of the schema with one tag removed.
    #[must_use]
    pub fn without(&self, tag: &str) -> Self {
        let mut schema = self.clone();
        schema.entries.remove(tag);
        schema
    }

    /// Copy of the schema with the entries of `other` added on top.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut schema = self.clone();
        schema
            .entries
            .extend(other.entries.iter().map(|(tag, node)| (*tag, node.clone())));
        schema
    }

}

static PHRASING_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let mut schema = Schema::new()
        .with("a", SchemaNode::leaf().with_attributes(&["href"]))
        .with("abbr", SchemaNode::leaf().with_attributes(&["title"]))
        .with("br", SchemaNode::leaf())
        .with(TEXT_NODE_NAME, SchemaNode::leaf());
    for &tag in RECURSIVE_PHRASING_TAGS {
        let node = schema.get(tag).cloned().unwrap_or_default();
        schema = schema.with(tag, node.with_children(Children::PhrasingWithout(tag)));
    }
    schema
});

static PHRASING_WITHOUT: LazyLock<BTreeMap<&'static str, Schema>> = LazyLock::new(|| {
    RECURSIVE_PHRASING_TAGS
        .iter()
        .map(|tag| (*tag, PHRASING_SCHEMA.without(tag)))
        .collect()
});

static LIST_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let items = Children::Nested(
        Schema::new().with("li", SchemaNode::leaf().with_children(Children::List)),
    );
    PHRASING_SCHEMA
        .clone()
        .with("ul", SchemaNode::leaf().with_children(items.clone()))
        .with(
            "ol",
            SchemaNode::leaf()
                .with_attributes(&["type"])
                .with_children(items),
        )
});

static EMBEDDED_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .with(
            "img",
            SchemaNode::leaf()
                .with_attributes(&["src", "alt"])
                .with_classes(IMAGE_ALIGN_CLASSES),
        )
        .with(
            "iframe",
            SchemaNode::leaf().with_attributes(&["src", "allowfullscreen", "height", "width"]),
        )
});

fn table_section_schema() -> Schema {
    let cells = Schema::new()
        .with("th", SchemaNode::leaf().with_children(Children::Phrasing))
        .with("td", SchemaNode::leaf().with_children(Children::Phrasing));
    Schema::new().with(
        "tr",
        SchemaNode::leaf().with_children(Children::Nested(cells)),
    )
}

/// Block grammar. Frames are dropped from every figure, nested ones
/// included, unless `allow_embedded_frames` is set.
fn block_schema(allow_embedded_frames: bool) -> Schema {
    let phrasing = || SchemaNode::leaf().with_children(Children::Phrasing);
    let list_entry = |tag: &str| LIST_SCHEMA.get(tag).cloned().unwrap_or_default();

    let embedded = if allow_embedded_frames {
        EMBEDDED_SCHEMA.clone()
    } else {
        EMBEDDED_SCHEMA.without("iframe")
    };
    let figure_children = embedded.with("figcaption", phrasing());
    let table_children = Schema::new()
        .with(
            "thead",
            SchemaNode::leaf().with_children(Children::Nested(table_section_schema())),
        )
        .with(
            "tfoot",
            SchemaNode::leaf().with_children(Children::Nested(table_section_schema())),
        )
        .with(
            "tbody",
            SchemaNode::leaf().with_children(Children::Nested(table_section_schema())),
        );

    let base = Schema::new()
        .with(
            "wp-block",
            SchemaNode::leaf().with_attributes(&["data-block", "data-custom-text", "data-no-teaser"]),
        )
        .with("ol", list_entry("ol"))
        .with("ul", list_entry("ul"))
        .with("h1", phrasing())
        .with("h2", phrasing())
        .with("h3", phrasing())
        .with("h4", phrasing())
        .with("h5", phrasing())
        .with("h6", phrasing())
        .with("p", phrasing())
        .with("pre", phrasing())
        .with(
            "figure",
            SchemaNode::leaf().with_children(Children::Nested(figure_children)),
        )
        .with("hr", SchemaNode::leaf())
        .with(
            "table",
            SchemaNode::leaf().with_children(Children::Nested(table_children)),
        );

    // A blockquote may hold any block but another blockquote.
    let quote_children = base.clone();
    base.with(
        "blockquote",
        SchemaNode::leaf().with_children(Children::Nested(quote_children)),
    )
}

static BLOCK_SCHEMA: LazyLock<Schema> = LazyLock::new(|| block_schema(true));

static CONTENT_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| PHRASING_SCHEMA.merged(&block_schema(false)));

static FRAMED_CONTENT_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| PHRASING_SCHEMA.merged(&BLOCK_SCHEMA));

/// Options for [`content_schema`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentSchemaOptions {
    /// Keep `iframe` inside figures.
    pub allow_embedded_frames: bool,
}

/// Schema for inline content.
#[must_use]
pub fn phrasing_content_schema() -> &'static Schema {
    &PHRASING_SCHEMA
}

/// Schema for block content: phrasing and block grammars combined.
#[must_use]
pub fn content_schema(options: ContentSchemaOptions) -> Schema {
    if options.allow_embedded_frames {
        FRAMED_CONTENT_SCHEMA.clone()
    } else {
        CONTENT_SCHEMA.clone()
    }
}

/// Whether the tag is phrasing content (phrasing schema or `span`).
#[must_use]
pub fn is_phrasing_content(tag: &str) -> bool {
    PHRASING_SCHEMA.contains(tag) || tag == "span"
}

/// Whether the tag is block content.
#[must_use]
pub fn is_block_content(tag: &str) -> bool {
    BLOCK_SCHEMA.contains(tag)
}

/// Whether the tag is embedded content (`img`, `iframe`).
#[must_use]
pub fn is_embedded(tag: &str) -> bool {
    EMBEDDED_SCHEMA.contains(tag)
}

/// Whether `tag` is inline, either as phrasing content or because it shares
/// an inline group with the `target` tag the content is inserted into.
#[must_use]
pub fn is_inline(tag: &str, target: Option<&str>) -> bool {
    PHRASING_SCHEMA.contains(tag) || target.is_some_and(|target| is_inline_for_tag(tag, target))
}

fn is_inline_for_tag(tag: &str, target: &str) -> bool {
    INLINE_TAG_GROUPS
        .iter()
        .any(|group| group.contains(&tag) && group.contains(&target))
}
