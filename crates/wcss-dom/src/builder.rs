//! Default render tree construction.
//!
//! Stands in for the host toolkit: walks the tag tree once and produces the
//! renderables each element is displayed by, recording them in the element's
//! renderables slot. Block elements get a container; inline elements flow
//! their runs into the enclosing container; text is split into one run per
//! word so borders and spacing can be applied per word.

use std::collections::HashSet;

use crate::render::{
    ImageSlot, InputState, LinkState, ListMarker, ListStyleType, RenderId, RenderKind, RenderNode,
    RenderTree,
};
use crate::{ElementData, HtmlAttr, HtmlTag, NodeId, NodeType, TagTree};

/// Options for [`build_render_tree`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Link targets that count as visited.
    pub visited: HashSet<String>,
}

/// Build the render tree for `doc`, filling every node's renderables slot.
pub fn build_render_tree(doc: &mut TagTree, options: &BuildOptions) -> RenderTree {
    let mut builder = Builder {
        doc,
        tree: RenderTree::new(),
        options,
        link: None,
        quote_depth: 0,
        lists: Vec::new(),
        preformatted: 0,
    };
    let root = builder.doc.root();
    let _ = builder.build_children(root, RenderTree::ROOT);
    builder.tree
}

struct Builder<'a> {
    doc: &'a mut TagTree,
    tree: RenderTree,
    options: &'a BuildOptions,
    /// The anchor currently being built, if any.
    link: Option<LinkState>,
    quote_depth: u8,
    /// Style and running ordinal of each open list.
    lists: Vec<(ListStyleType, usize)>,
    preformatted: usize,
}

impl Builder<'_> {
    fn build_children(&mut self, node: NodeId, parent: RenderId) -> Vec<RenderId> {
        let children = self.doc.children(node).to_vec();
        let mut flow = Vec::new();
        for child in children {
            flow.extend(self.build_node(child, parent));
        }
        flow
    }

    fn build_node(&mut self, node: NodeId, parent: RenderId) -> Vec<RenderId> {
        let Some(data) = self.doc.get(node).map(|n| n.node_type.clone()) else {
            return Vec::new();
        };
        let renderables = match data {
            NodeType::Document => self.build_children(node, parent),
            NodeType::Text(text) => self.build_text(&text, parent),
            NodeType::Element(element) => self.build_element(node, &element, parent),
        };
        self.doc.set_renderables(node, renderables.clone());
        renderables
    }

    fn build_text(&mut self, text: &str, parent: RenderId) -> Vec<RenderId> {
        let kind = if self.link.is_some() {
            RenderKind::Link
        } else {
            RenderKind::TextRun
        };
        let words: Vec<&str> = if self.preformatted > 0 {
            if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        } else {
            text.split_whitespace().collect()
        };

        words
            .into_iter()
            .map(|word| {
                let id = self.tree.alloc_text(kind, word);
                self.tree[id].link.clone_from(&self.link);
                self.tree.append(parent, id);
                id
            })
            .collect()
    }

    fn build_element(&mut self, node: NodeId, element: &ElementData, parent: RenderId) -> Vec<RenderId> {
        let tag = &element.tag;
        if tag.is_invisible() {
            return Vec::new();
        }
        if tag.is_inline() {
            return self.build_inline(node, element, parent);
        }

        match tag {
            HtmlTag::Br => Vec::new(),
            HtmlTag::Thead | HtmlTag::Tbody | HtmlTag::Tfoot => {
                let _ = self.build_children(node, parent);
                Vec::new()
            }
            HtmlTag::Img => {
                let mut image = RenderNode::new(RenderKind::Generic);
                image.image = Some(ImageSlot {
                    src: element.attr(&HtmlAttr::Src).unwrap_or_default().to_string(),
                    alt: element.attr(&HtmlAttr::Alt).map(str::to_string),
                    data: None,
                });
                image.text = element.attr(&HtmlAttr::Alt).map(str::to_string);
                vec![self.attach(parent, image)]
            }
            HtmlTag::Input | HtmlTag::Textarea | HtmlTag::Select => {
                let mut input = RenderNode::new(RenderKind::Generic);
                input.input = Some(InputState::default());
                input.text = element.attr(&HtmlAttr::Value).map(str::to_string);
                input.access_keys = authored_access_key(element);
                vec![self.attach(parent, input)]
            }
            HtmlTag::Hr => vec![self.attach(parent, RenderNode::new(RenderKind::Generic))],
            HtmlTag::Table => self.build_table(node, parent),
            HtmlTag::Li => self.build_list_item(node, parent),
            list if list.is_list() => {
                let style = if *list == HtmlTag::Ol {
                    ListStyleType::Decimal
                } else {
                    ListStyleType::Disc
                };
                self.lists.push((style, 0));
                let container = self.build_block(node, parent);
                let _ = self.lists.pop();
                container
            }
            HtmlTag::Pre => {
                self.preformatted += 1;
                let container = self.build_block(node, parent);
                self.preformatted -= 1;
                container
            }
            _ => self.build_block(node, parent),
        }
    }

    fn attach(&mut self, parent: RenderId, node: RenderNode) -> RenderId {
        let id = self.tree.alloc(node);
        self.tree.append(parent, id);
        id
    }

    fn build_block(&mut self, node: NodeId, parent: RenderId) -> Vec<RenderId> {
        let container = self.attach(parent, RenderNode::new(RenderKind::Container));
        let _ = self.build_children(node, container);
        vec![container]
    }

    fn build_inline(&mut self, node: NodeId, element: &ElementData, parent: RenderId) -> Vec<RenderId> {
        let outer_link = match (&element.tag, element.attr(&HtmlAttr::Href)) {
            (HtmlTag::A, Some(href)) => self.link.replace(LinkState {
                href: href.to_string(),
                visited: self.options.visited.contains(href),
            }),
            _ => self.link.clone(),
        };

        let mut flow = Vec::new();
        if element.tag == HtmlTag::Q {
            flow.push(self.quote_mark(parent, true));
        }
        flow.extend(self.build_children(node, parent));
        if element.tag == HtmlTag::Q {
            flow.push(self.quote_mark(parent, false));
        }
        if element.tag == HtmlTag::A
            && let Some(&first) = flow.first()
        {
            let keys = authored_access_key(element);
            if !keys.is_empty() {
                self.tree[first].access_keys = keys;
            }
        }

        self.link = outer_link;
        flow
    }

    /// Quote marks alternate between double (outermost) and single (nested).
    fn quote_mark(&mut self, parent: RenderId, open: bool) -> RenderId {
        if !open {
            self.quote_depth = self.quote_depth.saturating_sub(1);
        }
        let nested = self.quote_depth > 0;
        let index = u8::from(nested) * 2 + u8::from(!open);
        let id = self
            .tree
            .alloc_text(RenderKind::TextRun, if nested { "'" } else { "\"" });
        self.tree[id].quote = Some(index);
        self.tree.append(parent, id);
        if open {
            self.quote_depth += 1;
        }
        id
    }

    /// A table is a wrapper holding the caption (if any) and the table body.
    fn build_table(&mut self, node: NodeId, parent: RenderId) -> Vec<RenderId> {
        let wrapper = self.attach(parent, RenderNode::new(RenderKind::Container));
        let mut table_node = RenderNode::new(RenderKind::Table);
        table_node.table = Some(Default::default());
        let table = self.attach(wrapper, table_node);

        for child in self.doc.children(node).to_vec() {
            let is_caption = self
                .doc
                .as_element(child)
                .is_some_and(|e| e.tag == HtmlTag::Caption);
            if is_caption {
                let caption = self.build_node(child, wrapper);
                if let Some(&first) = caption.first() {
                    self.tree.insert(wrapper, 0, first);
                }
            } else {
                let _ = self.build_node(child, table);
            }
        }
        vec![table]
    }

    /// A list item is a row of a bullet holder and a content box.
    fn build_list_item(&mut self, node: NodeId, parent: RenderId) -> Vec<RenderId> {
        let (style, ordinal) = self.lists.last_mut().map_or((ListStyleType::Disc, 1), |(style, count)| {
            *count += 1;
            (*style, *count)
        });

        let row = self.attach(parent, RenderNode::new(RenderKind::Container));
        let holder = self.attach(row, RenderNode::new(RenderKind::Container));
        let mut bullet = RenderNode::new(RenderKind::Generic);
        bullet.list_marker = Some(ListMarker {
            style,
            ordinal,
            image_url: None,
        });
        let _ = self.attach(holder, bullet);

        let content = self.attach(row, RenderNode::new(RenderKind::Container));
        let _ = self.build_children(node, content);
        vec![content]
    }
}

/// The character of an authored `accesskey` attribute.
fn authored_access_key(element: &ElementData) -> Vec<u32> {
    element
        .attr(&HtmlAttr::Accesskey)
        .and_then(|key| key.chars().next())
        .map(u32::from)
        .into_iter()
        .collect()
}
