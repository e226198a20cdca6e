//! Generated content and counters.
//!
//! A `:before`/`:after` rule with `content` inserts new runs next to the
//! first or last run of the element and adds them to the element's
//! renderables. Every generated run is marked with the side it was
//! generated on, so `none`, `normal`, `no-open-quote` and `no-close-quote`
//! can later remove exactly what an earlier rule added.

use wcss_dom::NodeId;
use wcss_dom::render::{
    Generated, GeneratedPosition, ImageSlot, RenderId, RenderKind, RenderNode, StyleState,
};

use super::{Applier, Rule};
use crate::context::CssContext;
use crate::diagnostics::CssError;
use crate::properties::Property;
use crate::resources::ImageTarget;
use crate::selector::PseudoClass;
use crate::values::css_url;

/// Apply `counter-reset` (`reset`) or `counter-increment` to `ctx`.
///
/// The value is a list of counter names, each optionally followed by an
/// integer: the new value for a reset (default 0) or the step for an
/// increment (default 1).
pub(crate) fn update_counters(ctx: &mut CssContext, text: &str, reset: bool) {
    let mut tokens = text.split_whitespace().peekable();
    while let Some(name) = tokens.next() {
        let value = tokens.peek().and_then(|token| token.parse::<i32>().ok());
        if value.is_some() {
            let _ = tokens.next();
        }
        if reset {
            ctx.reset_counter(name, value.unwrap_or(0));
        } else {
            ctx.increment_counter(name, value.unwrap_or(1));
        }
    }
}

/// One item of a `content` value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContentItem {
    /// A word of a quoted literal.
    Literal(String),
    /// An unquoted token: `counter(...)`, `open-quote`, `none`...
    Expression(String),
}

/// Split a `content` value into literal words and expressions. Literals
/// may be quoted with either quote character.
fn content_items(content: &str) -> Vec<ContentItem> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    // The trailing space flushes the last token.
    for c in content.chars().chain(std::iter::once(' ')) {
        match quote {
            Some(open) if c == open => {
                quote = None;
                if !current.is_empty() {
                    items.push(ContentItem::Literal(std::mem::take(&mut current)));
                }
            }
            Some(_) if c.is_whitespace() => {
                if !current.is_empty() {
                    items.push(ContentItem::Literal(std::mem::take(&mut current)));
                }
            }
            None if c == '"' || c == '\'' => {
                if !current.is_empty() {
                    items.push(ContentItem::Expression(std::mem::take(&mut current)));
                }
                quote = Some(c);
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    items.push(ContentItem::Expression(std::mem::take(&mut current)));
                }
            }
            _ => current.push(c),
        }
    }
    items
}

/// What an expression evaluated to.
enum Evaluated {
    Node(RenderId),
    /// Remove earlier content: everything, or only quotes of one parity
    /// (0 opening, 1 closing).
    Remove(Option<u8>),
    Unknown,
}

/// Where the next generated run goes.
struct Insertion {
    parent: RenderId,
    index: usize,
    /// The run whose resting style generated runs start from.
    style_from: RenderId,
}

impl Applier<'_> {
    /// Handle a `:before`/`:after` rule.
    pub(super) fn generate_content(&mut self, element: NodeId, rule: Rule<'_>) -> Result<(), CssError> {
        let Some(content) = rule.raw(Property::Content) else {
            return Ok(());
        };
        let position = if rule.pseudo.contains(PseudoClass::AFTER) {
            GeneratedPosition::After
        } else {
            GeneratedPosition::Before
        };
        let Some(mut insertion) = self.insertion_point(element, position) else {
            return Ok(());
        };
        let first_index = insertion.index;

        for item in content_items(content) {
            let node = match item {
                ContentItem::Literal(text) => self.generated_run(&text, position, None),
                ContentItem::Expression(expression) => {
                    match self.evaluate(element, rule, &expression, position)? {
                        Evaluated::Node(node) => node,
                        Evaluated::Remove(parity) => {
                            self.remove_generated(element, position, parity);
                            return Ok(());
                        }
                        Evaluated::Unknown => continue,
                    }
                }
            };

            let style = self.render[insertion.style_from]
                .style(StyleState::Unselected)
                .clone();
            *self.render[node].style_mut(StyleState::Unselected) = style;
            self.render.insert(insertion.parent, insertion.index, node);
            if let Some(renderables) = self.doc.renderables_mut(element) {
                match position {
                    GeneratedPosition::After => renderables.push(node),
                    GeneratedPosition::Before => {
                        let at = (insertion.index - first_index).min(renderables.len());
                        renderables.insert(at, node);
                    }
                }
            }
            insertion.index += 1;
            self.apply_to_renderable(element, rule, node)?;
        }
        Ok(())
    }

    /// Generated runs go inside the innermost box at the element's leading
    /// (or trailing) edge, or next to its first (or last) run.
    fn insertion_point(&self, element: NodeId, position: GeneratedPosition) -> Option<Insertion> {
        let after = position == GeneratedPosition::After;
        let edge = |children: &[RenderId]| {
            if after {
                children.last().copied()
            } else {
                children.first().copied()
            }
        };
        let target = edge(self.doc.renderables(element))?;

        let mut insertion = if self.render[target].kind.is_container() {
            let mut parent = target;
            while let Some(child) = edge(self.render.children(parent))
                && self.render[child].kind.is_container()
            {
                parent = child;
            }
            let children = self.render.children(parent);
            match edge(children) {
                Some(style_from) => Insertion {
                    parent,
                    index: if after { children.len() - 1 } else { 0 },
                    style_from,
                },
                None => Insertion {
                    parent,
                    index: 0,
                    style_from: target,
                },
            }
        } else {
            Insertion {
                parent: self.render.parent(target)?,
                index: self.render.index_in_parent(target)?,
                style_from: target,
            }
        };
        if after {
            insertion.index += 1;
        }
        Some(insertion)
    }

    fn evaluate(
        &mut self,
        element: NodeId,
        rule: Rule<'_>,
        expression: &str,
        position: GeneratedPosition,
    ) -> Result<Evaluated, CssError> {
        let argument = |prefix: &str| {
            expression
                .strip_prefix(prefix)
                .and_then(|rest| rest.split_once(')'))
                .map(|(argument, _)| argument.trim())
        };

        let node = if let Some(name) = argument("counter(") {
            let value = self.ctx.counter(name).to_string();
            self.generated_run(&value, position, None)
        } else if let Some(name) = argument("attr(") {
            let value = self
                .doc
                .as_element(element)
                .and_then(|e| e.attr_named(name))
                .unwrap_or_default()
                .to_string();
            self.generated_run(&value, position, None)
        } else if expression == "open-quote" {
            let index = self.ctx.open_quote();
            self.generated_quote(index, position)
        } else if expression == "close-quote" {
            let index = self.ctx.close_quote();
            self.generated_quote(index, position)
        } else if let Some(url) = css_url(expression) {
            let resolved = self.resolve_image_url(rule, Property::Content, url)?;
            let mut node = RenderNode::new(RenderKind::Generic);
            node.image = Some(ImageSlot {
                src: resolved.clone().unwrap_or_else(|| url.to_string()),
                alt: None,
                data: None,
            });
            node.generated = Some(Generated {
                position,
                quote: None,
            });
            let id = self.render.alloc(node);
            if let Some(url) = resolved {
                self.request_image(url, ImageTarget::Foreground(id));
            }
            id
        } else {
            return Ok(match expression {
                "none" | "normal" => Evaluated::Remove(None),
                "no-open-quote" => Evaluated::Remove(Some(0)),
                "no-close-quote" => Evaluated::Remove(Some(1)),
                _ => Evaluated::Unknown,
            });
        };
        Ok(Evaluated::Node(node))
    }

    fn generated_run(&mut self, text: &str, position: GeneratedPosition, quote: Option<u8>) -> RenderId {
        let id = self.render.alloc_text(RenderKind::TextRun, text);
        let node = &mut self.render[id];
        node.generated = Some(Generated { position, quote });
        node.quote = quote;
        id
    }

    /// Outer quotations use double quotes, nested ones single quotes.
    fn generated_quote(&mut self, index: u8, position: GeneratedPosition) -> RenderId {
        let mark = if index < 2 { "\"" } else { "'" };
        self.generated_run(mark, position, Some(index))
    }

    /// Remove content generated on `position`, or only its quotes of the
    /// given parity.
    fn remove_generated(&mut self, element: NodeId, position: GeneratedPosition, parity: Option<u8>) {
        let doomed: Vec<RenderId> = self
            .doc
            .renderables(element)
            .iter()
            .copied()
            .filter(|&id| {
                let Some(generated) = self.render[id].generated else {
                    return false;
                };
                generated.position == position
                    && parity.is_none_or(|parity| generated.quote.is_some_and(|q| q % 2 == parity))
            })
            .collect();
        for &id in &doomed {
            self.render.detach(id);
        }
        if let Some(renderables) = self.doc.renderables_mut(element) {
            renderables.retain(|id| !doomed.contains(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_items() {
        assert_eq!(
            content_items("\"Chapter \" counter(chapter) ': ' open-quote"),
            vec![
                ContentItem::Literal("Chapter".to_string()),
                ContentItem::Expression("counter(chapter)".to_string()),
                ContentItem::Literal(":".to_string()),
                ContentItem::Expression("open-quote".to_string()),
            ]
        );
        assert!(content_items("\"\"").is_empty());
    }

    #[test]
    fn test_counter_updates() {
        let mut ctx = CssContext::new();
        update_counters(&mut ctx, "chapter section 4", true);
        assert_eq!(ctx.counter("chapter"), 0);
        assert_eq!(ctx.counter("section"), 4);
        update_counters(&mut ctx, "section chapter 2", false);
        assert_eq!(ctx.counter("section"), 5);
        assert_eq!(ctx.counter("chapter"), 2);
    }

    #[cfg(feature = "css2")]
    mod generated {
        use super::super::*;
        use crate::cascade::{SortedSelectors, apply_stylesheets};
        use crate::parser::parse_stylesheet;
        use wcss_dom::TagTree;
        use wcss_dom::builder::{BuildOptions, build_render_tree};
        use wcss_dom::render::RenderTree;

        fn style(doc: &mut TagTree, css: &str) -> RenderTree {
            let mut ctx = CssContext::new();
            let mut render = build_render_tree(doc, &BuildOptions::default());
            let sheet = parse_stylesheet(&mut ctx, css, None).unwrap().tree;
            let _ = apply_stylesheets(doc, &mut render, &mut ctx, &SortedSelectors::new(vec![sheet])).unwrap();
            render
        }

        fn texts(render: &RenderTree, id: RenderId) -> Vec<String> {
            render
                .children(id)
                .iter()
                .filter_map(|&c| render[c].text.clone())
                .collect()
        }

        #[test]
        fn test_before_and_after_with_counter() {
            let mut doc = TagTree::new();
            let body = doc.append_element(NodeId::ROOT, "body", []);
            let h2 = doc.append_element(body, "h2", []);
            let _ = doc.append_text(h2, "Intro");
            let render = style(
                &mut doc,
                "h2 { counter-increment: chapter } \
                 h2:before { content: \"Part\" counter(chapter) } \
                 h2:after { content: '!' }",
            );
            let container = doc.renderables(h2)[0];
            assert_eq!(texts(&render, container), vec!["Part", "1", "Intro", "!"]);
            let generated: Vec<_> = render
                .children(container)
                .iter()
                .filter_map(|&c| render[c].generated.map(|g| g.position.marker()))
                .collect();
            assert_eq!(generated, vec!['b', 'b', 'a']);
        }

        #[test]
        fn test_none_removes_earlier_content() {
            let mut doc = TagTree::new();
            let p = doc.append_element(NodeId::ROOT, "p", [("class", "plain")]);
            let _ = doc.append_text(p, "text");
            let render = style(
                &mut doc,
                "p:before { content: '>' } p.plain:before { content: none }",
            );
            let container = doc.renderables(p)[0];
            assert_eq!(texts(&render, container), vec!["text"]);
        }

        #[test]
        fn test_no_close_quote_keeps_opening_quote() {
            let mut doc = TagTree::new();
            let span = doc.append_element(NodeId::ROOT, "span", [("id", "s")]);
            let _ = doc.append_text(span, "word");
            let render = style(
                &mut doc,
                "span:after { content: open-quote close-quote } #s:after { content: no-close-quote }",
            );
            let runs: Vec<_> = doc
                .renderables(span)
                .iter()
                .filter_map(|&r| render[r].text.clone())
                .collect();
            assert_eq!(runs, vec!["word", "\""]);
        }
    }
}
