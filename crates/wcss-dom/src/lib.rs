//! Tag tree and renderable model for the WCSS cascade engine.
//!
//! This crate provides the two trees the cascade works between:
//! - **Tag tree** ([`TagTree`]) - the already-parsed document: tags,
//!   attributes, text, and the slot naming each element's renderables
//! - **Render tree** ([`render::RenderTree`]) - the presentational nodes the
//!   style applier mutates
//!
//! # Design
//!
//! Both trees use arena allocation with index handles ([`NodeId`],
//! [`render::RenderId`]) for all relationships, providing O(1) access and
//! traversal without borrow checker issues. Parent links are plain indices,
//! never owning edges.

use std::collections::HashMap;

pub mod builder;
pub mod json;
pub mod render;
pub mod tags;

pub use json::LoadError;
pub use render::RenderId;
pub use tags::{HtmlAttr, HtmlTag};

/// Map of attribute identifiers to values for an element.
pub type AttributesMap = HashMap<HtmlAttr, String>;

/// A type-safe index into the tag tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A node of the tag tree.
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,

    /// The parent node, `None` only for the document and detached nodes.
    pub parent: Option<NodeId>,

    /// Ordered children.
    pub children: Vec<NodeId>,

    /// The node immediately following this one in its parent's children.
    pub next_sibling: Option<NodeId>,

    /// The node immediately preceding this one in its parent's children.
    pub prev_sibling: Option<NodeId>,

    /// The renderables this node is displayed by. Empty for nodes that
    /// produce nothing visible; several entries for text split into words.
    pub renderables: Vec<RenderId>,
}

/// The kind of a tag tree node.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document root. Carries no tag and is never matched by selectors.
    Document,
    /// An element with its tag and attributes.
    Element(ElementData),
    /// Character data.
    Text(String),
}

/// Element-specific data.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// The element's tag.
    pub tag: HtmlTag,
    /// The element's attributes.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data from a tag name and raw attribute pairs.
    #[must_use]
    pub fn new<'a>(tag_name: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            tag: HtmlTag::from_name(tag_name),
            attrs: attrs
                .into_iter()
                .map(|(name, value)| (HtmlAttr::from_name(name), value.to_string()))
                .collect(),
        }
    }

    /// The lowercase tag name.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        self.tag.name()
    }

    /// Look an attribute up by identifier.
    #[must_use]
    pub fn attr(&self, attr: &HtmlAttr) -> Option<&str> {
        self.attrs.get(attr).map(String::as_str)
    }

    /// Look an attribute up by name (case-insensitive).
    #[must_use]
    pub fn attr_named(&self, name: &str) -> Option<&str> {
        self.attr(&HtmlAttr::from_name(name))
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr(&HtmlAttr::Id)
    }

    /// Returns the raw class attribute.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.attr(&HtmlAttr::Class)
    }

    /// Returns true if every dot-separated class in `selector_class`
    /// appears as a whole word in the class attribute.
    ///
    /// `"c1.c2"` requires both `c1` and `c2`.
    #[must_use]
    pub fn has_classes(&self, selector_class: &str) -> bool {
        let Some(class) = self.class() else {
            return false;
        };
        selector_class
            .split('.')
            .all(|wanted| class.split_whitespace().any(|have| have == wanted))
    }
}

/// Arena-based tag tree with O(1) node access and traversal.
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. The Document node is always at index 0.
#[derive(Debug, Clone)]
pub struct TagTree {
    nodes: Vec<Node>,
}

impl TagTree {
    /// Create a new tag tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Self::blank(NodeType::Document)],
        }
    }

    const fn blank(node_type: NodeType) -> Node {
        Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            renderables: Vec::new(),
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Self::blank(node_type));
        id
    }

    /// Appends `child` as the last child of `parent`, updating all relationships.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Allocate an element and append it under `parent`.
    pub fn append_element<'a>(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> NodeId {
        let id = self.alloc(NodeType::Element(ElementData::new(tag_name, attrs)));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Pre-order iteration over `id` and everything below it.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: vec![id],
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Returns true for text nodes.
    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        self.as_text(id).is_some()
    }

    /// Returns true if `id` is the first non-text child of its parent.
    #[must_use]
    pub fn is_first_element_child(&self, id: NodeId) -> bool {
        if self.is_text(id) {
            return false;
        }
        let Some(parent) = self.parent(id) else {
            return false;
        };
        self.children(parent)
            .iter()
            .find(|&&child| !self.is_text(child))
            .is_some_and(|&first| first == id)
    }

    /// The `lang` attribute of the element or its nearest ancestor carrying one.
    #[must_use]
    pub fn lang(&self, id: NodeId) -> Option<&str> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|node| self.as_element(node).and_then(|e| e.attr(&HtmlAttr::Lang)))
    }

    /// The renderables associated with a node.
    #[must_use]
    pub fn renderables(&self, id: NodeId) -> &[RenderId] {
        self.get(id).map_or(&[], |n| n.renderables.as_slice())
    }

    /// Replace the renderables associated with a node.
    pub fn set_renderables(&mut self, id: NodeId, renderables: Vec<RenderId>) {
        if let Some(node) = self.get_mut(id) {
            node.renderables = renderables;
        }
    }

    /// Mutable access to the renderables slot of a node.
    pub fn renderables_mut(&mut self, id: NodeId) -> Option<&mut Vec<RenderId>> {
        self.get_mut(id).map(|n| &mut n.renderables)
    }

    /// The document element (the first element child of the document).
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }
}

impl Default for TagTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a TagTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a TagTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
