//! Display, visibility, size, colors, backgrounds, margins and padding.

use wcss_dom::render::{
    BackgroundRepeat, Clear, Float, NodeFlags, RenderId, RenderKind, Side, StateMask,
};
use wcss_dom::{HtmlTag, NodeId};

use super::{Applier, Rule};
use crate::CSS2;
use crate::diagnostics::CssError;
use crate::properties::{
    AttachmentKeyword, ClearKeyword, DisplayKeyword, FloatKeyword, Property, RepeatKeyword,
    VisibilityKeyword,
};
use crate::resources::ImageTarget;
use crate::values::css_url;

impl Applier<'_> {
    /// `display`. Returns false once the renderable has been removed.
    pub(super) fn apply_display(&mut self, rule: Rule<'_>, ui: RenderId) -> bool {
        match rule.get(Property::Display).and_then(DisplayKeyword::from_repr) {
            Some(DisplayKeyword::None) => {
                if self.render.parent(ui).is_some() {
                    self.render.detach(ui);
                } else {
                    self.render.clear_children(ui);
                }
                false
            }
            Some(DisplayKeyword::WapMarquee) => {
                self.render[ui].flags.insert(NodeFlags::MARQUEE);
                true
            }
            _ => true,
        }
    }

    /// `visibility`. Hidden renderables take no further styling; a visible
    /// one also shows and enables every container above it.
    pub(super) fn apply_visibility(&mut self, rule: Rule<'_>, ui: RenderId) -> bool {
        let Some(visibility) = rule.get(Property::Visibility) else {
            return true;
        };
        let visible = visibility == VisibilityKeyword::Visible as i32;
        for id in self.subtree(ui) {
            self.render[id]
                .flags
                .set(NodeFlags::HIDDEN | NodeFlags::DISABLED, !visible);
        }
        if !visible {
            return false;
        }
        let mut parent = self.render.parent(ui);
        while let Some(id) = parent {
            self.render[id]
                .flags
                .remove(NodeFlags::HIDDEN | NodeFlags::DISABLED);
            parent = self.render.parent(id);
        }
        true
    }

    /// `width`/`height`, clamped by `min-*`/`max-*` when no exact size is
    /// given. Percentages refer to the viewport.
    pub(super) fn apply_size(&mut self, rule: Rule<'_>, ui: RenderId) {
        let viewport = self.ctx.viewport();
        let current = self.render[ui].size;
        let width = self.clamped_size(
            rule,
            ui,
            [Property::Width, Property::MinWidth, Property::MaxWidth],
            viewport.width,
            current.width,
        );
        let height = self.clamped_size(
            rule,
            ui,
            [Property::Height, Property::MinHeight, Property::MaxHeight],
            viewport.height,
            current.height,
        );
        let size = &mut self.render[ui].size;
        if width.is_some() {
            size.width = width;
        }
        if height.is_some() {
            size.height = height;
        }
    }

    fn clamped_size(
        &self,
        rule: Rule<'_>,
        ui: RenderId,
        [exact, min, max]: [Property; 3],
        reference: i32,
        current: Option<i32>,
    ) -> Option<i32> {
        if let Some(exact) = self.length(rule, exact, ui, reference) {
            return Some(exact);
        }
        if !CSS2 {
            return None;
        }
        let mut size = None;
        if let Some(min) = self.length(rule, min, ui, reference)
            && min > current.unwrap_or(0)
        {
            size = Some(min);
        }
        // An unsized renderable is taken to fill its reference.
        if let Some(max) = self.length(rule, max, ui, reference)
            && max < current.unwrap_or(reference)
        {
            size = Some(max);
        }
        size
    }

    pub(super) fn apply_background_color(&mut self, rule: Rule<'_>, ui: RenderId, mask: StateMask) {
        if let Some(color) = rule.color(Property::BackgroundColor) {
            self.update_styles(ui, mask, |style| {
                style.bg_color = Some(color);
                style.bg_transparency = 255;
            });
        }
    }

    /// `color` reaches every renderable below `ui` except link runs, which
    /// only take a color from a rule that selects them directly.
    pub(super) fn set_color_recursive(
        &mut self,
        ui: RenderId,
        color: u32,
        pseudo: crate::selector::PseudoClass,
    ) {
        let mut stack = vec![ui];
        while let Some(id) = stack.pop() {
            let mask = self.state_mask(id, pseudo);
            self.update_styles(id, mask, |style| style.fg_color = Some(color));
            stack.extend(
                self.render
                    .children(id)
                    .iter()
                    .copied()
                    .filter(|&child| self.render[child].kind != RenderKind::Link),
            );
        }
    }

    /// `background-image` with its repeat, position and attachment.
    pub(super) fn apply_background_image(
        &mut self,
        rule: Rule<'_>,
        ui: RenderId,
        mask: StateMask,
    ) -> Result<(), CssError> {
        let Some(url) = rule.raw(Property::BackgroundImage).and_then(css_url) else {
            return Ok(());
        };
        let repeat = match rule
            .get(Property::BackgroundRepeat)
            .and_then(RepeatKeyword::from_repr)
        {
            Some(RepeatKeyword::Repeat) | None => BackgroundRepeat::TileBoth,
            Some(RepeatKeyword::RepeatX) => BackgroundRepeat::TileHorizontal,
            Some(RepeatKeyword::RepeatY) => BackgroundRepeat::TileVertical,
            Some(RepeatKeyword::NoRepeat) => BackgroundRepeat::NoRepeat,
        };
        let position_x = rule.get(Property::BackgroundPositionX);
        let position_y = rule.get(Property::BackgroundPositionY);
        let fixed =
            rule.get(Property::BackgroundAttachment) == Some(AttachmentKeyword::Fixed as i32);
        let resolved = self.resolve_image_url(rule, Property::BackgroundImage, url)?;

        self.update_styles(ui, mask, |style| {
            let background = &mut style.background;
            background.url.clone_from(&resolved);
            background.repeat = repeat;
            if position_x.is_some() {
                background.position_x = position_x;
            }
            if position_y.is_some() {
                background.position_y = position_y;
            }
            background.fixed = fixed;
            background.image = None;
        });
        if let Some(url) = resolved {
            self.request_image(url, ImageTarget::Background(ui, mask));
        }
        Ok(())
    }

    pub(super) fn apply_float_and_clear(&mut self, rule: Rule<'_>, ui: RenderId) {
        if let Some(float) = rule.get(Property::Float).and_then(FloatKeyword::from_repr) {
            self.render[ui].float = Some(match float {
                FloatKeyword::Left => Float::Left,
                FloatKeyword::Right => Float::Right,
                FloatKeyword::None => Float::None,
            });
        }
        if let Some(clear) = rule.get(Property::Clear).and_then(ClearKeyword::from_repr) {
            self.render[ui].clear = Some(match clear {
                ClearKeyword::Left => Clear::Left,
                ClearKeyword::Right => Clear::Right,
                ClearKeyword::None => Clear::None,
                ClearKeyword::Both => Clear::Both,
            });
        }
    }

    /// Margins and padding go to the box holding a run, or to the row of a
    /// list item, rather than to each word. Vertical sides resolve against
    /// the viewport height, horizontal ones against its width. Negative
    /// values are ignored.
    pub(super) fn apply_margins_and_padding(
        &mut self,
        element: NodeId,
        rule: Rule<'_>,
        ui: RenderId,
        mask: StateMask,
    ) {
        let target = if self.render[ui].kind.is_label() || self.has_tag(element, &[HtmlTag::Li]) {
            self.render.parent(ui)
        } else {
            Some(ui)
        };
        let Some(target) = target else {
            return;
        };
        let viewport = self.ctx.viewport();
        // Containers have no pressed state to speak of.
        let box_mask = mask & (StateMask::SELECTED | StateMask::UNSELECTED);
        let focus_only = self.render[ui].kind == RenderKind::Link && mask == StateMask::SELECTED;

        for side in Side::ALL {
            let reference = if side.is_vertical() {
                viewport.height
            } else {
                viewport.width
            };
            let margin = self
                .length(rule, Property::margin(side), ui, reference)
                .filter(|&px| px >= 0);
            let padding = self
                .length(rule, Property::padding(side), ui, reference)
                .filter(|&px| px >= 0);
            if let Some(px) = margin {
                self.update_styles(target, box_mask, |style| style.margin.set(side, px));
            }
            if let Some(px) = padding {
                self.update_styles(target, box_mask, |style| style.padding.set(side, px));
            }
            if focus_only && (margin.is_some() || padding.is_some()) {
                self.render[target].flags.insert(NodeFlags::FOCUS_DELEGATE);
            }
        }
    }
}
