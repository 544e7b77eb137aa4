//! Arena-backed HTML fragment.
//!
//! Every node lives in the [`Document`] arena for the lifetime of the
//! document. Detaching a node only unlinks it from its parent, so a stale
//! [`NodeId`] never dangles; use [`Document::contains`] to check whether a
//! node is still reachable from the root.

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node name reported for text nodes.
pub const TEXT_NODE_NAME: &str = "#text";

/// Node name reported for comment nodes.
pub const COMMENT_NODE_NAME: &str = "#comment";

/// Node name reported for the fragment root.
pub const FRAGMENT_NODE_NAME: &str = "#document-fragment";

/// Single element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercase attribute name.
    pub name: String,
    /// Decoded attribute value.
    pub value: String,
}

/// Element tag name and attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of a parsed fragment.
    Fragment,
    /// Element node.
    Element(ElementData),
    /// Decoded text.
    Text(String),
    /// Comment body without the `<!--`/`-->` delimiters.
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable HTML fragment.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty fragment containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Fragment,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Fragment root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    /// Payload of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    /// DOM-style node name: the lowercase tag for elements, `#text`,
    /// `#comment` or `#document-fragment` otherwise.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> &str {
        match self.kind(id) {
            NodeKind::Fragment => FRAGMENT_NODE_NAME,
            NodeKind::Element(el) => &el.name,
            NodeKind::Text(_) => TEXT_NODE_NAME,
            NodeKind::Comment(_) => COMMENT_NODE_NAME,
        }
    }

    /// Tag name if the node is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(&el.name),
            _ => None,
        }
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    /// Whether the node is an element with the given tag name.
    #[must_use]
    pub fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.tag_name(id) == Some(name)
    }

    /// Text of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Body of a comment node.
    #[must_use]
    pub fn comment(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Replace the text of a text or comment node. No-op for other nodes.
    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        match &mut self.data_mut(id).kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => *text = value.into(),
            NodeKind::Fragment | NodeKind::Element(_) => {}
        }
    }

    /// Concatenated text of all descendant text nodes, comments excluded.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) => {}
            NodeKind::Fragment | NodeKind::Element(_) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Parent node, `None` for the root and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// Parent node if it is an element (the fragment root is not).
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    /// Whether the node has any child node.
    #[must_use]
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.data(id).children.is_empty()
    }

    /// Element children in document order.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// All descendants of a node in document order, the node itself
    /// excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// First child node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Last child node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// First element child.
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Last element child.
    #[must_use]
    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|&c| self.is_element(c))
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    /// Previous sibling node.
    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .map(|i| self.children(parent)[i])
    }

    /// Next sibling node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Previous sibling that is an element.
    #[must_use]
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Next sibling that is an element.
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent)[index + 1..]
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Whether the node is still reachable from the root.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        let root = self.root();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Attributes of an element, empty for other nodes.
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        match self.kind(id) {
            NodeKind::Element(el) => &el.attrs,
            _ => &[],
        }
    }

    /// Whether the element carries any attribute.
    #[must_use]
    pub fn has_attributes(&self, id: NodeId) -> bool {
        !self.attrs(id).is_empty()
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Names of all attributes in source order.
    #[must_use]
    pub fn attr_names(&self, id: NodeId) -> Vec<String> {
        self.attrs(id).iter().map(|a| a.name.clone()).collect()
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let NodeKind::Element(el) = &mut self.data_mut(id).kind {
            if let Some(existing) = el.attrs.iter_mut().find(|a| a.name == name) {
                existing.value = value;
            } else {
                el.attrs.push(Attribute {
                    name: name.to_ascii_lowercase(),
                    value,
                });
            }
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element(el) = &mut self.data_mut(id).kind {
            el.attrs.retain(|a| a.name != name);
        }
    }

    /// Unlink a node from its parent. The node and its subtree stay in the
    /// arena and can be reinserted.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, index)) = self.index_in_parent(id) {
            self.data_mut(parent).children.remove(index);
        }
        self.data_mut(id).parent = None;
    }

    /// Remove a node from the tree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Remove every child of a node.
    pub fn remove_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.data_mut(id).children);
        for child in children {
            self.data_mut(child).parent = None;
        }
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(
            !self.is_ancestor_or_self(child, parent),
            "cannot insert a node into its own subtree"
        );
        self.detach(child);
        let index = index.min(self.children(parent).len());
        self.data_mut(parent).children.insert(index, child);
        self.data_mut(child).parent = Some(parent);
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_at(parent, len, child);
    }

    /// Insert `new` immediately before `reference`. No-op when `reference`
    /// has no parent.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        if reference == new {
            return;
        }
        self.detach(new);
        if let Some((parent, index)) = self.index_in_parent(reference) {
            self.insert_at(parent, index, new);
        }
    }

    /// Insert `new` immediately after `reference`. No-op when `reference`
    /// has no parent.
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        if reference == new {
            return;
        }
        self.detach(new);
        if let Some((parent, index)) = self.index_in_parent(reference) {
            self.insert_at(parent, index + 1, new);
        }
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Replace a node by its children, keeping their order and position.
    pub fn unwrap(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.data_mut(id).children);
        if let Some((parent, index)) = self.index_in_parent(id) {
            for (offset, &child) in children.iter().enumerate() {
                self.data_mut(child).parent = Some(parent);
                self.data_mut(parent).children.insert(index + offset, child);
            }
        } else {
            for &child in &children {
                self.data_mut(child).parent = None;
            }
        }
        self.detach(id);
    }

    /// Move the children of `id` into a new element named `name` that takes
    /// the place of `id`. Attributes are not carried over. Returns the new
    /// element; `id` ends up detached.
    pub fn replace_tag(&mut self, id: NodeId, name: &str) -> NodeId {
        let new = self.create_element(name);
        let children = std::mem::take(&mut self.data_mut(id).children);
        for &child in &children {
            self.data_mut(child).parent = Some(new);
        }
        self.data_mut(new).children = children;
        self.replace(id, new);
        new
    }

    /// Merge adjacent text nodes and drop empty ones below `id`.
    pub fn normalize(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            match self.kind(child) {
                NodeKind::Text(text) if text.is_empty() => self.detach(child),
                NodeKind::Text(text) => {
                    if let Some(prev) = previous_text {
                        let text = text.clone();
                        if let NodeKind::Text(prev_text) = &mut self.data_mut(prev).kind {
                            prev_text.push_str(&text);
                        }
                        self.detach(child);
                    } else {
                        previous_text = Some(child);
                    }
                }
                _ => {
                    previous_text = None;
                    self.normalize(child);
                }
            }
        }
    }
}
