//! Selector trees.
//!
//! A parsed style sheet is a forest of [`SelectorNode`]s. Each root is the
//! leftmost simple selector of a rule; `child` links walk rightwards through
//! the combinators, and the terminal node carries the declarations. So
//! `div > p.x { ... }` is `div -> p.x` with the values on `p.x`, whose
//! `descendant` flag is false because it came after a `>`.
//!
//! Nodes live in an arena owned by the [`SelectorTree`] and are addressed by
//! [`SelectorId`].

mod declarations;
pub mod predicate;
pub mod specificity;

use std::cell::OnceCell;

use wcss_dom::{NodeId, TagTree};

pub use declarations::PropertyValues;
pub use predicate::{AttributePredicate, Constraint};
pub use specificity::PseudoClass;

/// Index of a node in its [`SelectorTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(pub usize);

/// One simple selector and, if it ends its chain, the declarations.
#[derive(Debug, Clone)]
pub struct SelectorNode {
    /// The selector text as written.
    pub name: String,
    /// Required tag name, compared case-insensitively.
    pub tag: Option<String>,
    /// Required classes, dot separated.
    pub class: Option<String>,
    /// Required id, compared case-insensitively.
    pub id: Option<String>,
    /// Pseudo-classes.
    pub pseudo: PseudoClass,
    /// Attribute and `:lang()` predicates.
    pub predicates: Vec<AttributePredicate>,
    /// A syntax error was found; the node never matches.
    pub illegal: bool,
    /// This node may match any descendant of its parent's match, not only
    /// a direct child.
    pub descendant: bool,
    /// This node matches the next sibling of its parent's match.
    pub sibling: bool,
    /// The next simple selector to the right.
    pub child: Option<SelectorId>,
    /// Declarations. Only meaningful on the terminal node of a chain.
    pub values: PropertyValues,
    own_specificity: u32,
    specificity: OnceCell<u32>,
}

impl SelectorNode {
    /// Parse a simple selector such as `a.nav:hover` or `input[type=text]`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let split = predicate::split_brackets(name);
        let simple = specificity::analyze(&split.base);
        let own_specificity =
            simple.specificity + specificity::predicate_specificity(&split.predicates);
        let mut predicates = split.predicates;
        predicates.extend(simple.lang.into_iter().map(AttributePredicate::Lang));
        Self {
            name: name.to_string(),
            tag: simple.tag,
            class: simple.class,
            id: simple.id,
            pseudo: simple.pseudo,
            predicates,
            illegal: split.illegal,
            descendant: true,
            sibling: false,
            child: None,
            values: PropertyValues::new(),
            own_specificity,
            specificity: OnceCell::new(),
        }
    }

    /// A node with no constraints, holding declarations written outside
    /// any selector, such as a `style` attribute.
    #[must_use]
    pub fn block(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: None,
            class: None,
            id: None,
            pseudo: PseudoClass::empty(),
            predicates: Vec::new(),
            illegal: false,
            descendant: true,
            sibling: false,
            child: None,
            values: PropertyValues::new(),
            own_specificity: 0,
            specificity: OnceCell::new(),
        }
    }

    /// Specificity of this simple selector alone.
    #[must_use]
    pub const fn own_specificity(&self) -> u32 {
        self.own_specificity
    }

    /// Test this simple selector against one tag tree node.
    #[must_use]
    pub fn matches(&self, doc: &TagTree, node: NodeId) -> bool {
        if self.illegal {
            return false;
        }
        let element = doc.as_element(node);
        if let Some(tag) = &self.tag
            && !element.is_some_and(|e| e.tag_name().eq_ignore_ascii_case(tag))
        {
            return false;
        }
        if let Some(class) = &self.class
            && !element.is_some_and(|e| e.has_classes(class))
        {
            return false;
        }
        if let Some(id) = &self.id
            && !element
                .and_then(|e| e.id())
                .is_some_and(|own| own.eq_ignore_ascii_case(id))
        {
            return false;
        }
        if self.pseudo.contains(PseudoClass::FIRST_CHILD)
            && !(crate::CSS2 && doc.is_first_element_child(node))
        {
            return false;
        }
        self.predicates.iter().all(|p| p.matches(doc, node))
    }
}

/// One parsed style sheet.
#[derive(Debug, Clone)]
pub struct SelectorTree {
    nodes: Vec<SelectorNode>,
    roots: Vec<SelectorId>,
    page_url: Option<String>,
}

impl SelectorTree {
    /// The node holding declarations outside any rule.
    pub const BLOCK: SelectorId = SelectorId(0);

    /// An empty tree. `page_url` is set for external sheets and is the base
    /// their relative URLs resolve against.
    #[must_use]
    pub fn new(page_url: Option<String>) -> Self {
        Self {
            nodes: vec![SelectorNode::block("style")],
            roots: Vec::new(),
            page_url,
        }
    }

    /// Where the sheet was loaded from.
    #[must_use]
    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    /// Add a node, unattached.
    pub fn push(&mut self, node: SelectorNode) -> SelectorId {
        let id = SelectorId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Make `child` the next simple selector of `parent`.
    pub fn attach(&mut self, parent: SelectorId, child: SelectorId) {
        self.nodes[parent.0].child = Some(child);
    }

    /// Register a rule's leftmost selector.
    pub fn add_root(&mut self, id: SelectorId) {
        self.roots.push(id);
    }

    /// The rules, in source order.
    #[must_use]
    pub fn roots(&self) -> &[SelectorId] {
        &self.roots
    }

    /// Borrow a node.
    #[must_use]
    pub fn get(&self, id: SelectorId) -> &SelectorNode {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node.
    pub fn get_mut(&mut self, id: SelectorId) -> &mut SelectorNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, the block node included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no rule was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every node, for rewriting values in place.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SelectorNode> {
        self.nodes.iter_mut()
    }

    /// The last node of the chain starting at `id`.
    #[must_use]
    pub fn terminal(&self, id: SelectorId) -> SelectorId {
        let mut current = id;
        while let Some(child) = self.nodes[current.0].child {
            current = child;
        }
        current
    }

    /// Specificity of the chain starting at `id`: its own plus everything to
    /// its right.
    #[must_use]
    pub fn specificity(&self, id: SelectorId) -> u32 {
        let node = &self.nodes[id.0];
        *node.specificity.get_or_init(|| {
            node.own_specificity + node.child.map_or(0, |child| self.specificity(child))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_specificity_adds_up() {
        let mut tree = SelectorTree::new(None);
        let div = tree.push(SelectorNode::new("div#main"));
        let p = tree.push(SelectorNode::new("p.x"));
        tree.attach(div, p);
        tree.add_root(div);
        assert_eq!(tree.specificity(div), 101 + 11);
        assert_eq!(tree.terminal(div), p);
    }

    #[test]
    fn test_matches_tag_class_id() {
        let mut doc = TagTree::new();
        let body = doc.append_element(doc.root(), "body", []);
        let p = doc.append_element(body, "P", [("class", "warn big"), ("id", "First")]);
        assert!(SelectorNode::new("p.warn").matches(&doc, p));
        assert!(SelectorNode::new(".big.warn").matches(&doc, p));
        assert!(SelectorNode::new("#first").matches(&doc, p));
        assert!(!SelectorNode::new("div").matches(&doc, p));
        assert!(!SelectorNode::new("p.other").matches(&doc, p));
    }

    #[test]
    #[cfg(feature = "css2")]
    fn test_attribute_predicates_count_one_each() {
        let node = SelectorNode::new("input[type=text][name]");
        assert_eq!(node.own_specificity(), 3);
        assert_eq!(node.tag.as_deref(), Some("input"));
    }
}
