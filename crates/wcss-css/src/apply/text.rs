//! Text handlers: white-space, alignment, transform, indent, decoration,
//! word spacing, line height, quotes and direction.

use wcss_dom::render::{HAlign, NodeFlags, RenderId, RenderKind, StateMask, TextDecoration, VAlign};
use wcss_dom::{HtmlTag, NodeId};

use super::{Applier, Rule};
use crate::properties::{
    DecorationKeyword, DirectionKeyword, Property, TextAlignKeyword, TransformKeyword,
    VerticalAlignKeyword, WhiteSpaceKeyword,
};
use crate::values::omit_quotes;

impl Applier<'_> {
    /// `white-space`. `nowrap` joins the words of each text node into one
    /// run, `normal` splits a joined run back into words. Runs once per
    /// element since it replaces renderables.
    pub(super) fn apply_white_space(&mut self, element: NodeId, rule: Rule<'_>) {
        let Some(mode) = rule
            .get(Property::WhiteSpace)
            .and_then(WhiteSpaceKeyword::from_repr)
        else {
            return;
        };
        if mode == WhiteSpaceKeyword::Pre {
            return;
        }
        let texts: Vec<NodeId> = self
            .doc
            .descendants(element)
            .filter(|&node| self.doc.is_text(node))
            .collect();

        for text in texts {
            let runs = self.doc.renderables(text).to_vec();
            let replacement = if mode == WhiteSpaceKeyword::Nowrap {
                self.join_runs(&runs)
            } else {
                self.split_run(&runs)
            };
            if let Some(replacement) = replacement {
                self.replace_renderables(text, &runs, &replacement);
            }
        }
    }

    fn join_runs(&mut self, runs: &[RenderId]) -> Option<Vec<RenderId>> {
        let (&first, rest) = runs.split_first()?;
        if rest.is_empty() {
            return None;
        }
        let joined = runs
            .iter()
            .filter_map(|&run| self.render[run].text.as_deref())
            .collect::<Vec<_>>()
            .join(" ");
        self.render[first].text = Some(joined);
        for &run in rest {
            self.render.detach(run);
        }
        Some(vec![first])
    }

    fn split_run(&mut self, runs: &[RenderId]) -> Option<Vec<RenderId>> {
        let [run] = *runs else {
            return None;
        };
        let text = self.render[run].text.clone()?;
        let mut words = text.split_whitespace();
        let first = words.next()?;
        let rest: Vec<&str> = words.collect();
        if rest.is_empty() {
            return None;
        }
        let parent = self.render.parent(run);
        let mut index = self.render.index_in_parent(run).unwrap_or(0);
        self.render[run].text = Some(first.to_string());

        let mut split = vec![run];
        for word in rest {
            let template = &self.render[run];
            let (kind, styles, link, flags) = (
                template.kind,
                template.styles.clone(),
                template.link.clone(),
                template.flags,
            );
            let id = self.render.alloc_text(kind, word);
            let node = &mut self.render[id];
            node.styles = styles;
            node.link = link;
            node.flags = flags;
            if let Some(parent) = parent {
                index += 1;
                self.render.insert(parent, index, id);
            }
            split.push(id);
        }
        Some(split)
    }

    /// Swap `old` for `new` in the renderables of `text` and of every
    /// element above it that flows those runs.
    fn replace_renderables(&mut self, text: NodeId, old: &[RenderId], new: &[RenderId]) {
        let nodes: Vec<NodeId> = std::iter::once(text).chain(self.doc.ancestors(text)).collect();
        for node in nodes {
            let Some(list) = self.doc.renderables_mut(node) else {
                continue;
            };
            let Some(at) = list.iter().position(|id| old.contains(id)) else {
                continue;
            };
            list.retain(|id| !old.contains(id));
            let _ = list.splice(at..at, new.iter().copied());
        }
    }

    /// `text-align` and `vertical-align`. Table cells, rows and tables
    /// align their cells; anything else aligns itself and the boxes inside.
    pub(super) fn apply_alignment(&mut self, element: NodeId, rule: Rule<'_>, ui: RenderId) {
        let align = rule
            .get(Property::TextAlign)
            .and_then(TextAlignKeyword::from_repr)
            .map(|keyword| match keyword {
                TextAlignKeyword::Left => HAlign::Left,
                TextAlignKeyword::Right => HAlign::Right,
                TextAlignKeyword::Center => HAlign::Center,
            });
        let valign = rule
            .get(Property::VerticalAlign)
            .and_then(VerticalAlignKeyword::from_repr)
            .map(|keyword| match keyword {
                VerticalAlignKeyword::Top | VerticalAlignKeyword::Super => VAlign::Top,
                VerticalAlignKeyword::Middle => VAlign::Middle,
                VerticalAlignKeyword::Bottom
                | VerticalAlignKeyword::Baseline
                | VerticalAlignKeyword::Sub => VAlign::Bottom,
            });
        if align.is_none() && valign.is_none() {
            return;
        }

        if self.has_tag(element, &[HtmlTag::Td, HtmlTag::Th]) {
            if self.in_table_row(element) {
                self.align_boxes(&[ui], align, valign);
            }
        } else if self.has_tag(element, &[HtmlTag::Tr]) {
            let cells = self.render.children(ui).to_vec();
            self.align_boxes(&cells, align, valign);
        } else if self.has_tag(element, &[HtmlTag::Table]) {
            // Whole tables only take text alignment, cell by cell.
            let cells: Vec<RenderId> = self
                .render
                .children(ui)
                .iter()
                .flat_map(|&row| self.render.children(row).to_vec())
                .collect();
            self.align_boxes(&cells, align, None);
        } else {
            self.align_boxes(&[ui], None, valign);
            let boxes: Vec<RenderId> = self
                .subtree(ui)
                .into_iter()
                .filter(|&id| id == ui || self.render[id].kind.is_container())
                .collect();
            self.align_boxes(&boxes, align, None);
        }
    }

    fn align_boxes(&mut self, boxes: &[RenderId], align: Option<HAlign>, valign: Option<VAlign>) {
        for &id in boxes {
            let node = &mut self.render[id];
            if align.is_some() {
                node.align = align;
            }
            if valign.is_some() {
                node.valign = valign;
            }
        }
    }

    fn in_table_row(&self, cell: NodeId) -> bool {
        let row = self.doc.parent(cell);
        row.is_some_and(|row| self.has_tag(row, &[HtmlTag::Tr]))
            && self
                .doc
                .ancestors(cell)
                .any(|node| self.has_tag(node, &[HtmlTag::Table]))
    }

    /// `text-transform`. Case changes are not undone by `none`.
    pub(super) fn apply_text_transform(&mut self, rule: Rule<'_>, ui: RenderId) {
        let Some(transform) = rule
            .get(Property::TextTransform)
            .and_then(TransformKeyword::from_repr)
        else {
            return;
        };
        for label in self.labels(ui) {
            let Some(text) = self.render[label].text.as_deref() else {
                continue;
            };
            let transformed = match transform {
                TransformKeyword::None => continue,
                TransformKeyword::Uppercase => text.to_uppercase(),
                TransformKeyword::Lowercase => text.to_lowercase(),
                TransformKeyword::Capitalize => capitalize(text),
            };
            self.render[label].text = Some(transformed);
        }
    }

    /// `text-indent` moves the first child of every box in the subtree.
    pub(super) fn apply_text_indent(&mut self, rule: Rule<'_>, ui: RenderId) {
        let width = self.ctx.viewport().width;
        let Some(indent) = self
            .length(rule, Property::TextIndent, ui, width)
            .filter(|&px| px >= 0)
        else {
            return;
        };
        let firsts: Vec<RenderId> = self
            .subtree(ui)
            .into_iter()
            .filter(|&id| self.render[id].kind.is_container())
            .filter_map(|id| self.render.children(id).first().copied())
            .collect();
        for first in firsts {
            self.update_styles(first, StateMask::UNSELECTED | StateMask::SELECTED, |style| {
                style.margin.left = indent;
            });
        }
    }

    /// `text-decoration`. `none` clears, anything else adds a line.
    pub(super) fn apply_text_decoration(&mut self, rule: Rule<'_>, ui: RenderId) {
        let Some(keyword) = rule
            .get(Property::TextDecoration)
            .and_then(DecorationKeyword::from_repr)
        else {
            return;
        };
        let line = match keyword {
            DecorationKeyword::Underline => TextDecoration::UNDERLINE,
            DecorationKeyword::LineThrough => TextDecoration::LINE_THROUGH,
            DecorationKeyword::Overline => TextDecoration::OVERLINE,
            DecorationKeyword::None => TextDecoration::empty(),
        };
        for label in self.labels(ui) {
            let mask = self.state_mask(label, rule.pseudo);
            self.update_styles(label, mask, |style| {
                if line.is_empty() {
                    style.decoration = TextDecoration::empty();
                } else {
                    style.decoration |= line;
                }
            });
        }
    }

    /// `word-spacing` pads the right of every word but the last in its box.
    pub(super) fn apply_word_spacing(&mut self, rule: Rule<'_>, ui: RenderId) {
        let Some(spacing) = self
            .length(rule, Property::WordSpacing, ui, 0)
            .filter(|&px| px >= 0)
        else {
            return;
        };
        for label in self.labels(ui) {
            let is_last = self
                .render
                .parent(label)
                .and_then(|parent| self.render.children(parent).last().copied())
                == Some(label);
            if is_last {
                continue;
            }
            let mask = self.label_mask(label);
            self.update_styles(label, mask, |style| style.padding.right = spacing);
        }
    }

    /// `line-height`. The excess over the font height is split above and
    /// below each run.
    pub(super) fn apply_line_height(&mut self, rule: Rule<'_>, ui: RenderId) {
        for label in self.labels(ui) {
            let font_height = self.font_height(label);
            let Some(line_height) = self.length(rule, Property::LineHeight, label, font_height) else {
                return;
            };
            let half = (line_height - font_height).max(0) / 2;
            self.update_styles(label, StateMask::UNSELECTED, |style| {
                style.margin.top = half;
                style.margin.bottom = half;
            });
            if self.render[label].kind == RenderKind::Link {
                self.update_styles(label, StateMask::SELECTED | StateMask::PRESSED, |style| {
                    style.padding.top = half;
                    style.padding.bottom = half;
                });
            }
        }
    }

    /// `quotes` replaces the text of quote runs below `ui`. Takes one or
    /// two pairs; a single pair serves nested quotations too.
    pub(super) fn apply_quotes(&mut self, rule: Rule<'_>, ui: RenderId) {
        let Some(raw) = rule.raw(Property::Quotes) else {
            return;
        };
        let tokens: Vec<&str> = raw.split_whitespace().map(omit_quotes).collect();
        let quotes: [&str; 4] = match tokens[..] {
            [open, close] => [open, close, open, close],
            [open, close, nested_open, nested_close] => [open, close, nested_open, nested_close],
            _ => return,
        };
        for label in self.labels(ui) {
            if let Some(index) = self.render[label].quote
                && let Some(text) = quotes.get(usize::from(index))
            {
                self.render[label].text = Some((*text).to_string());
            }
        }
    }

    /// `direction`.
    pub(super) fn apply_direction(&mut self, rule: Rule<'_>, ui: RenderId) {
        let Some(direction) = rule
            .get(Property::Direction)
            .and_then(DirectionKeyword::from_repr)
        else {
            return;
        };
        let rtl = direction == DirectionKeyword::Rtl;
        for id in self.subtree(ui) {
            self.render[id].flags.set(NodeFlags::RTL, rtl);
        }
    }

    /// Link runs space out in every state, plain runs only when resting.
    fn label_mask(&self, label: RenderId) -> StateMask {
        if self.render[label].kind == RenderKind::Link {
            StateMask::all()
        } else {
            StateMask::UNSELECTED
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CssContext;
    use crate::parser::parse_declaration_block;
    use crate::selector::SelectorTree;
    use wcss_dom::TagTree;
    use wcss_dom::builder::{BuildOptions, build_render_tree};
    use wcss_dom::render::{RenderTree, StyleState};

    fn styled(html: impl FnOnce(&mut TagTree) -> NodeId, css: &str) -> (TagTree, RenderTree, NodeId) {
        let mut doc = TagTree::new();
        let element = html(&mut doc);
        let mut render = build_render_tree(&mut doc, &BuildOptions::default());
        let mut ctx = CssContext::new();
        let block = parse_declaration_block(&mut ctx, css).unwrap();
        Applier::new(&mut doc, &mut render, &mut ctx)
            .apply_style(element, &block, SelectorTree::BLOCK)
            .unwrap();
        (doc, render, element)
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello big world"), "Hello Big World");
        assert_eq!(capitalize("x"), "X");
    }

    #[test]
    fn test_nowrap_joins_runs_and_normal_splits_them() {
        let mut text = NodeId(0);
        let (mut doc, mut render, p) = styled(
            |doc| {
                let p = doc.append_element(NodeId::ROOT, "p", []);
                text = doc.append_text(p, "one two three");
                p
            },
            "white-space: nowrap",
        );
        let runs = doc.renderables(text).to_vec();
        assert_eq!(runs.len(), 1);
        assert_eq!(render[runs[0]].text.as_deref(), Some("one two three"));
        let container = doc.renderables(p)[0];
        assert_eq!(render.children(container), runs.as_slice());

        let mut ctx = CssContext::new();
        let block = parse_declaration_block(&mut ctx, "white-space: normal").unwrap();
        Applier::new(&mut doc, &mut render, &mut ctx)
            .apply_style(p, &block, SelectorTree::BLOCK)
            .unwrap();
        let runs = doc.renderables(text);
        assert_eq!(runs.len(), 3);
        assert_eq!(render[runs[2]].text.as_deref(), Some("three"));
        assert_eq!(render.children(container), runs);
    }

    #[test]
    fn test_nowrap_updates_inline_ancestors() {
        let mut span = NodeId(0);
        let (doc, _render, _) = styled(
            |doc| {
                let p = doc.append_element(NodeId::ROOT, "p", []);
                span = doc.append_element(p, "span", []);
                let _ = doc.append_text(span, "a b");
                p
            },
            "white-space: nowrap",
        );
        assert_eq!(doc.renderables(span).len(), 1);
    }

    #[test]
    fn test_quotes_replace_quote_marks() {
        let mut q = NodeId(0);
        let (doc, render, _) = styled(
            |doc| {
                let p = doc.append_element(NodeId::ROOT, "p", []);
                q = doc.append_element(p, "q", []);
                let _ = doc.append_text(q, "said");
                p
            },
            "quotes: '<<' '>>'",
        );
        let runs = doc.renderables(q);
        let texts: Vec<_> = runs.iter().map(|&r| render[r].text.as_deref()).collect();
        if crate::CSS2 {
            assert_eq!(texts, vec![Some("<<"), Some("said"), Some(">>")]);
        } else {
            assert_eq!(texts, vec![Some("\""), Some("said"), Some("\"")]);
        }
    }

    #[test]
    fn test_decoration_none_clears() {
        let mut doc = TagTree::new();
        let p = doc.append_element(NodeId::ROOT, "p", []);
        let _ = doc.append_text(p, "x");
        let mut render = build_render_tree(&mut doc, &BuildOptions::default());
        let mut ctx = CssContext::new();
        for css in ["text-decoration: underline", "text-decoration: overline"] {
            let block = parse_declaration_block(&mut ctx, css).unwrap();
            Applier::new(&mut doc, &mut render, &mut ctx)
                .apply_style(p, &block, SelectorTree::BLOCK)
                .unwrap();
        }
        let run = render.children(doc.renderables(p)[0])[0];
        assert_eq!(
            render[run].style(StyleState::Unselected).decoration,
            TextDecoration::UNDERLINE | TextDecoration::OVERLINE
        );

        let block = parse_declaration_block(&mut ctx, "text-decoration: none").unwrap();
        Applier::new(&mut doc, &mut render, &mut ctx)
            .apply_style(p, &block, SelectorTree::BLOCK)
            .unwrap();
        assert!(render[run].style(StyleState::Selected).decoration.is_empty());
    }

    #[test]
    fn test_center_reaches_nested_boxes() {
        let (doc, render, div) = styled(
            |doc| {
                let div = doc.append_element(NodeId::ROOT, "div", []);
                let _ = doc.append_element(div, "p", []);
                div
            },
            "text-align: center",
        );
        let outer = doc.renderables(div)[0];
        let inner = render.children(outer)[0];
        assert_eq!(render[outer].align, Some(HAlign::Center));
        assert_eq!(render[inner].align, Some(HAlign::Center));
    }
}
