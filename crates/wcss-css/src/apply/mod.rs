//! Style application onto renderables.
//!
//! The cascade hands every matched rule to [`Applier::apply_style`] in
//! ascending specificity, so a later call overwrites what an earlier one
//! set. A rule is applied to each renderable of the element in turn; the
//! per-property handlers live in the submodules.
//!
//! Every mutation goes through a [`StateMask`]: link runs styled through
//! `:focus`/`:hover` change only their selected state, `:active` only the
//! pressed one, and everything else both the selected and unselected
//! states.

mod border;
mod box_model;
mod content;
mod font;
mod form;
mod list;
mod table;
mod text;

use wcss_common::url::{is_absolute_url, resolve_url};
use wcss_dom::render::{RenderId, RenderKind, RenderTree, StateMask, Style, StyleState};
use wcss_dom::{HtmlTag, NodeId, TagTree};

use crate::CSS2;
use crate::context::CssContext;
use crate::diagnostics::{CssError, Diagnostic, ErrorCode};
use crate::properties::Property;
use crate::resources::{ImageRequest, ImageTarget};
use crate::selector::{PropertyValues, PseudoClass, SelectorId, SelectorTree};
use crate::values::resolve_length;

/// A matched rule as the handlers see it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rule<'s> {
    /// Selector text, used as the subject of diagnostics.
    pub(crate) name: &'s str,
    pub(crate) values: &'s PropertyValues,
    pub(crate) pseudo: PseudoClass,
    /// URL of the sheet the rule came from, for external sheets.
    pub(crate) base: Option<&'s str>,
}

impl<'s> Rule<'s> {
    fn get(&self, property: Property) -> Option<i32> {
        self.values.get(property)
    }

    fn raw(&self, property: Property) -> Option<&'s str> {
        self.values.raw(property)
    }

    fn color(&self, property: Property) -> Option<u32> {
        self.get(property).and_then(|value| u32::try_from(value).ok())
    }
}

/// Applies matched rules to the renderables of a document.
pub struct Applier<'a> {
    pub(crate) doc: &'a mut TagTree,
    pub(crate) render: &'a mut RenderTree,
    pub(crate) ctx: &'a mut CssContext,
    images: Vec<ImageRequest>,
}

impl<'a> Applier<'a> {
    /// An applier over one document.
    pub fn new(doc: &'a mut TagTree, render: &'a mut RenderTree, ctx: &'a mut CssContext) -> Self {
        Self {
            doc,
            render,
            ctx,
            images: Vec::new(),
        }
    }

    /// The images requested so far.
    #[must_use]
    pub fn into_images(self) -> Vec<ImageRequest> {
        self.images
    }

    /// Apply the declarations of the terminal selector `id` of `tree` to
    /// the renderables of `element`.
    ///
    /// Elements without renderables are skipped. On CSS2 builds counters
    /// are updated first, and a `:before`/`:after` rule only generates
    /// content.
    pub fn apply_style(
        &mut self,
        element: NodeId,
        tree: &SelectorTree,
        id: SelectorId,
    ) -> Result<(), CssError> {
        let node = tree.get(id);
        let rule = Rule {
            name: &node.name,
            values: &node.values,
            pseudo: node.pseudo,
            base: tree.page_url(),
        };
        if self.doc.renderables(element).is_empty() {
            return Ok(());
        }
        if CSS2 {
            if let Some(reset) = rule.raw(Property::CounterReset) {
                content::update_counters(self.ctx, reset, true);
            }
            if let Some(increment) = rule.raw(Property::CounterIncrement) {
                content::update_counters(self.ctx, increment, false);
            }
            if rule.pseudo.intersects(PseudoClass::GENERATED) {
                return self.generate_content(element, rule);
            }
        }

        self.apply_white_space(element, rule);
        let renderables = self.doc.renderables(element).to_vec();
        for ui in renderables {
            self.apply_to_renderable(element, rule, ui)?;
        }
        Ok(())
    }

    fn apply_to_renderable(
        &mut self,
        element: NodeId,
        rule: Rule<'_>,
        ui: RenderId,
    ) -> Result<(), CssError> {
        self.apply_input(element, rule, ui);
        if !self.apply_display(rule, ui) {
            return Ok(());
        }
        if !self.apply_visibility(rule, ui) {
            return Ok(());
        }
        let mask = self.state_mask(ui, rule.pseudo);

        self.apply_size(rule, ui);
        self.apply_background_color(rule, ui, mask);
        if let Some(color) = rule.color(Property::Color) {
            self.set_color_recursive(ui, color, rule.pseudo);
        }
        self.apply_background_image(rule, ui, mask)?;
        self.apply_float_and_clear(rule, ui);
        self.apply_margins_and_padding(element, rule, ui, mask);

        self.apply_alignment(element, rule, ui);
        self.apply_text_transform(rule, ui);
        self.apply_text_indent(rule, ui);
        self.apply_font(rule, ui);

        let border_ui = self.apply_list_position(element, rule, ui);
        self.apply_borders(element, rule, ui, border_ui, mask);
        self.apply_access_keys(element, rule, ui);
        self.apply_text_decoration(rule, ui);

        if CSS2 {
            self.apply_word_spacing(rule, ui);
            self.apply_line_height(rule, ui);
            self.apply_quotes(rule, ui);
            self.apply_outline(rule, border_ui, mask);
            self.apply_direction(rule, ui);
            self.apply_table_settings(rule, ui);
        }
        self.apply_list_style(element, rule, ui)
    }

    /// The style states a rule with `pseudo` changes on `ui`.
    fn state_mask(&self, ui: RenderId, pseudo: PseudoClass) -> StateMask {
        if self.render[ui].kind != RenderKind::Link {
            return StateMask::SELECTED | StateMask::UNSELECTED;
        }
        let mut mask = StateMask::empty();
        if pseudo.contains(PseudoClass::FOCUS) {
            mask |= StateMask::SELECTED;
        }
        if pseudo.contains(PseudoClass::ACTIVE) {
            mask |= StateMask::PRESSED;
        }
        if mask.is_empty() {
            mask = StateMask::SELECTED | StateMask::UNSELECTED;
        }
        mask
    }

    /// Run `update` on each style of `ui` selected by `mask`.
    fn update_styles(&mut self, ui: RenderId, mask: StateMask, mut update: impl FnMut(&mut Style)) {
        let node = &mut self.render[ui];
        for state in mask.states() {
            update(node.style_mut(state));
        }
    }

    /// The style a handler reads current values from: the only state the
    /// mask touches, or the unselected one.
    fn current_style(&self, ui: RenderId, mask: StateMask) -> &Style {
        let state = if mask.contains(StateMask::PRESSED) {
            StyleState::Pressed
        } else if mask == StateMask::SELECTED {
            StyleState::Selected
        } else {
            StyleState::Unselected
        };
        self.render[ui].style(state)
    }

    fn has_tag(&self, element: NodeId, tags: &[HtmlTag]) -> bool {
        self.doc
            .as_element(element)
            .is_some_and(|e| tags.contains(&e.tag))
    }

    fn font_height(&self, ui: RenderId) -> i32 {
        self.render[ui].style(StyleState::Unselected).font.height()
    }

    /// A length property in pixels. Percentages resolve against
    /// `reference`, `em`/`ex` against the font of `ui`.
    fn length(&self, rule: Rule<'_>, property: Property, ui: RenderId, reference: i32) -> Option<i32> {
        rule.get(property)
            .map(|value| resolve_length(value, self.font_height(ui), reference))
    }

    /// `ui` followed by every renderable below it.
    fn subtree(&self, ui: RenderId) -> Vec<RenderId> {
        self.render.descendants(ui)
    }

    /// The text and link runs at or below `ui`.
    fn labels(&self, ui: RenderId) -> Vec<RenderId> {
        self.subtree(ui)
            .into_iter()
            .filter(|&id| self.render[id].kind.is_label())
            .collect()
    }

    /// Make an image URL absolute against the rule's sheet or the page,
    /// reporting a relative one that has neither to resolve against.
    fn resolve_image_url(
        &mut self,
        rule: Rule<'_>,
        property: Property,
        url: &str,
    ) -> Result<Option<String>, CssError> {
        if is_absolute_url(url) {
            return Ok(Some(url.to_string()));
        }
        if let Some(resolved) = resolve_url(url, rule.base.or_else(|| self.ctx.base_url())) {
            return Ok(Some(resolved));
        }
        self.ctx.report(
            &Diagnostic::new(
                ErrorCode::NoBaseUrl,
                rule.name,
                format!(
                    "Ignoring image file referred in a CSS file/segment ({url}), since the page has no base URL"
                ),
            )
            .with_attribute(property.name())
            .with_value(url),
        )?;
        Ok(None)
    }

    /// Ask for an image unless images are switched off.
    fn request_image(&mut self, url: String, target: ImageTarget) {
        if self.ctx.show_images() {
            self.images.push(ImageRequest { url, target });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_declaration_block;
    use wcss_dom::builder::{BuildOptions, build_render_tree};
    use wcss_dom::render::LinkState;

    fn apply(doc: &mut TagTree, render: &mut RenderTree, element: NodeId, css: &str) {
        let mut ctx = CssContext::new();
        let block = parse_declaration_block(&mut ctx, css).unwrap();
        let mut applier = Applier::new(doc, render, &mut ctx);
        applier.apply_style(element, &block, SelectorTree::BLOCK).unwrap();
    }

    #[test]
    fn test_link_focus_touches_selected_only() {
        let mut doc = TagTree::new();
        let mut render = RenderTree::new();
        let mut ctx = CssContext::new();
        let run = render.alloc_text(RenderKind::Link, "go");
        render[run].link = Some(LinkState {
            href: "/".to_string(),
            visited: false,
        });
        let applier = Applier::new(&mut doc, &mut render, &mut ctx);
        assert_eq!(applier.state_mask(run, PseudoClass::FOCUS), StateMask::SELECTED);
        assert_eq!(applier.state_mask(run, PseudoClass::ACTIVE), StateMask::PRESSED);
        assert_eq!(
            applier.state_mask(run, PseudoClass::empty()),
            StateMask::SELECTED | StateMask::UNSELECTED
        );
    }

    #[test]
    fn test_later_rule_replaces_color() {
        let mut doc = TagTree::new();
        let p = doc.append_element(NodeId::ROOT, "p", []);
        let _ = doc.append_text(p, "hello");
        let mut render = build_render_tree(&mut doc, &BuildOptions::default());
        apply(&mut doc, &mut render, p, "color: red");
        apply(&mut doc, &mut render, p, "color: blue");

        let container = doc.renderables(p)[0];
        for id in render.descendants(container) {
            assert_eq!(render[id].style(StyleState::Unselected).fg_color, Some(0x0000ff));
            assert_eq!(render[id].style(StyleState::Selected).fg_color, Some(0x0000ff));
        }
    }

    #[test]
    fn test_em_margin_uses_element_font() {
        let mut doc = TagTree::new();
        let div = doc.append_element(NodeId::ROOT, "div", []);
        let mut render = build_render_tree(&mut doc, &BuildOptions::default());
        let container = doc.renderables(div)[0];
        render[container].style_mut(StyleState::Unselected).font.size = 20;

        apply(&mut doc, &mut render, div, "margin-left: 2em; margin-top: 50%");
        let style = render[container].style(StyleState::Unselected);
        assert_eq!(style.margin.left, 40);
        assert_eq!(style.margin.top, 160);
    }
}
