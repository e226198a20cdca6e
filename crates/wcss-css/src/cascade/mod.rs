//! The cascade walk.
//!
//! One depth-first pass over the tag tree. Every element is checked against
//! three candidate pools (text nodes against the first two only):
//!
//! - **global** - every rule of every sheet, in ascending specificity
//! - **nested** - continuations promoted by a match at the parent
//! - **sibling** - continuations promoted by a match at the preceding
//!   element sibling (CSS2 only)
//!
//! A candidate that matches and ends its chain contributes its declarations;
//! one that continues promotes its next simple selector into the pools of
//! the children or of the next sibling. A descendant step also promotes a
//! synthetic "any ancestor" candidate so the continuation can match at any
//! depth below.
//!
//! The walk keeps an explicit stack of frames instead of recursing, so deep
//! documents cannot exhaust the call stack.

mod sort;

pub use sort::{SelectorRef, SortedSelectors};

use wcss_dom::render::{RenderKind, RenderTree};
use wcss_dom::{HtmlAttr, HtmlTag, NodeId, TagTree};

use crate::CSS2;
use crate::apply::Applier;
use crate::context::CssContext;
use crate::diagnostics::CssError;
use crate::parser::parse_declaration_block;
use crate::resources::ImageRequest;
use crate::selector::{PseudoClass, SelectorTree};

/// Style every element of `doc` with the rules of `sorted`, then with its
/// inline `style` attribute.
///
/// Counters and quote nesting of `ctx` are reset first. Returns the images
/// the applied styles asked for, in request order.
pub fn apply_stylesheets(
    doc: &mut TagTree,
    render: &mut RenderTree,
    ctx: &mut CssContext,
    sorted: &SortedSelectors,
) -> Result<Vec<ImageRequest>, CssError> {
    ctx.reset_document();
    let mut cascade = Cascade {
        sorted,
        applier: Applier::new(doc, render, ctx),
    };
    cascade.run()?;
    Ok(cascade.applier.into_images())
}

/// A selector waiting to be checked against an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    selector: SelectorRef,
    /// Position of the originating rule in the sorted rules.
    rank: usize,
    /// The synthetic `* selector` step: matches any element and promotes
    /// `selector` (and itself) to the children.
    any_ancestor: bool,
}

impl Candidate {
    const fn new(selector: SelectorRef, rank: usize) -> Self {
        Self {
            selector,
            rank,
            any_ancestor: false,
        }
    }

    const fn any_ancestor(self) -> Self {
        Self {
            any_ancestor: true,
            ..self
        }
    }
}

/// Pools filled while visiting one element.
#[derive(Debug, Default)]
struct Visit {
    next_nested: Vec<Candidate>,
    next_sibling: Vec<Candidate>,
    /// Terminal selectors that matched, with the rank of their rule.
    matched: Vec<(usize, SelectorRef)>,
}

/// One open element of the walk.
#[derive(Debug)]
struct Frame {
    node: NodeId,
    /// Pool handed to each child.
    nested: Vec<Candidate>,
    /// Pool this element promoted to its next sibling.
    out_sibling: Vec<Candidate>,
    child_index: usize,
    /// Pool for the next element child.
    sibling_pool: Vec<Candidate>,
}

impl Frame {
    const fn new(node: NodeId, nested: Vec<Candidate>, out_sibling: Vec<Candidate>) -> Self {
        Self {
            node,
            nested,
            out_sibling,
            child_index: 0,
            sibling_pool: Vec::new(),
        }
    }
}

struct Cascade<'a, 'b> {
    sorted: &'b SortedSelectors,
    applier: Applier<'a>,
}

impl Cascade<'_, '_> {
    fn run(&mut self) -> Result<(), CssError> {
        // The document node itself is never matched.
        let root = self.applier.doc.root();
        let mut stack = vec![Frame::new(root, Vec::new(), Vec::new())];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = self.applier.doc.children(frame.node).get(frame.child_index).copied()
            else {
                let done = stack.pop();
                if let (Some(done), Some(parent)) = (done, stack.last_mut()) {
                    parent.sibling_pool = done.out_sibling;
                }
                continue;
            };
            frame.child_index += 1;
            if self.applier.doc.is_text(child) {
                // Text runs take rules but never pass sibling pools on.
                let nested = frame.nested.clone();
                let _ = self.visit(child, &nested, &[])?;
                continue;
            }
            let nested = frame.nested.clone();
            let siblings = std::mem::take(&mut frame.sibling_pool);

            let visit = self.visit(child, &nested, &siblings)?;
            stack.push(Frame::new(child, visit.next_nested, visit.next_sibling));
        }
        Ok(())
    }

    /// Check `node` against every pool, apply what matched and return the
    /// pools for its children and next sibling.
    fn visit(
        &mut self,
        node: NodeId,
        nested: &[Candidate],
        siblings: &[Candidate],
    ) -> Result<Visit, CssError> {
        let mut visit = Visit::default();
        for (rank, &rule) in self.sorted.rules().iter().enumerate() {
            self.check(node, Candidate::new(rule, rank), &mut visit);
        }
        for &candidate in nested {
            self.check(node, candidate, &mut visit);
        }
        if CSS2 {
            for &candidate in siblings {
                self.check(node, candidate, &mut visit);
            }
        }

        visit.matched.sort_by_key(|&(rank, _)| rank);
        visit.matched.dedup();
        for &(_, selector) in &visit.matched {
            self.applier
                .apply_style(node, self.sorted.tree(selector), selector.id)?;
        }
        self.apply_inline_style(node)?;
        Ok(visit)
    }

    fn check(&self, node: NodeId, candidate: Candidate, visit: &mut Visit) {
        if candidate.any_ancestor {
            push_unique(&mut visit.next_nested, Candidate {
                any_ancestor: false,
                ..candidate
            });
            push_unique(&mut visit.next_nested, candidate);
            return;
        }

        let tree = self.sorted.tree(candidate.selector);
        let selector = tree.get(candidate.selector.id);
        if !selector.matches(self.applier.doc, node) {
            return;
        }

        match selector.child {
            None => {
                if self.link_state_matches(node, selector.pseudo) {
                    visit.matched.push((candidate.rank, candidate.selector));
                }
            }
            Some(child_id) => {
                let child = tree.get(child_id);
                let next = Candidate::new(
                    SelectorRef {
                        sheet: candidate.selector.sheet,
                        id: child_id,
                    },
                    candidate.rank,
                );
                if child.sibling {
                    if CSS2 {
                        push_unique(&mut visit.next_sibling, next);
                    }
                } else {
                    push_unique(&mut visit.next_nested, next);
                    if child.descendant {
                        push_unique(&mut visit.next_nested, next.any_ancestor());
                    }
                }
            }
        }
    }

    /// `:link` and `:visited` on an anchor only match once its first
    /// renderable is a link run in the corresponding visited state.
    fn link_state_matches(&self, node: NodeId, pseudo: PseudoClass) -> bool {
        let doc = &*self.applier.doc;
        let is_anchor = doc.as_element(node).is_some_and(|e| e.tag == HtmlTag::A);
        if !is_anchor || !pseudo.intersects(PseudoClass::LINK_STATES) {
            return true;
        }
        let Some(&first) = doc.renderables(node).first() else {
            return false;
        };
        let run = &self.applier.render[first];
        if run.kind != RenderKind::Link {
            return true;
        }
        let visited = run.link.as_ref().is_some_and(|link| link.visited);
        (!visited && pseudo.contains(PseudoClass::LINK))
            || (visited && pseudo.contains(PseudoClass::VISITED))
    }

    fn apply_inline_style(&mut self, node: NodeId) -> Result<(), CssError> {
        let Some(style) = self
            .applier
            .doc
            .as_element(node)
            .and_then(|e| e.attr(&HtmlAttr::Style))
            .map(str::to_string)
        else {
            return Ok(());
        };
        let block = parse_declaration_block(self.applier.ctx, &style)?;
        self.applier
            .apply_style(node, &block, SelectorTree::BLOCK)
    }
}

fn push_unique(pool: &mut Vec<Candidate>, candidate: Candidate) {
    if !pool.contains(&candidate) {
        pool.push(candidate);
    }
}
