//! Borders and outlines.
//!
//! A bordered element flowing several runs draws one box around all of
//! them: the first run keeps the left edge, the last one the right edge,
//! and runs in between only the top and bottom. Each drawn side also pads
//! the box by its width.

use wcss_dom::NodeId;
use wcss_dom::render::{Border, BorderLine, BorderSide, RenderId, Side, StateMask};

use super::{Applier, Rule};
use crate::properties::{BorderStyleKeyword, Property};

/// Color of 3D lines with no color of their own.
const DEFAULT_3D_COLOR: u32 = 0x9a_9a_9a;

/// Width of a styled border side with no width of its own.
const DEFAULT_WIDTH: i32 = 3;

impl Applier<'_> {
    /// The `border-*` properties of `ui`, drawn on `border_ui` (the list
    /// row for outside-positioned list items, `ui` otherwise).
    pub(super) fn apply_borders(
        &mut self,
        element: NodeId,
        rule: Rule<'_>,
        ui: RenderId,
        border_ui: RenderId,
        mask: StateMask,
    ) {
        let (keep_left, keep_right) = self.open_edges(element, ui, border_ui);
        let mut sides = Vec::new();
        for side in Side::ALL {
            let keep = match side {
                Side::Left => keep_left,
                Side::Right => keep_right,
                Side::Top | Side::Bottom => true,
            };
            if keep && let Some(border) = self.border_side(rule, Property::border_side(side), border_ui) {
                sides.push((side, border));
            }
        }
        if sides.is_empty() {
            return;
        }

        let mut border = self
            .current_style(border_ui, mask)
            .border
            .clone()
            .unwrap_or_default();
        for &(side, value) in &sides {
            border.set_side(side, Some(value));
        }
        self.update_styles(border_ui, mask, |style| {
            for &(side, value) in &sides {
                style.padding.add(side, value.width);
            }
            style.border = Some(border.clone());
        });
    }

    /// Whether the left and right edges are drawn on this renderable.
    fn open_edges(&self, element: NodeId, ui: RenderId, border_ui: RenderId) -> (bool, bool) {
        let renderables = self.doc.renderables(element);
        if border_ui != ui || renderables.len() < 2 {
            return (true, true);
        }
        (
            renderables.first() == Some(&ui),
            renderables.last() == Some(&ui),
        )
    }

    /// One border side from its width, style and color properties. A side
    /// without a style, or with style `none`, is not drawn.
    fn border_side(
        &self,
        rule: Rule<'_>,
        [width, style, color]: [Property; 3],
        ui: RenderId,
    ) -> Option<BorderSide> {
        let line = match BorderStyleKeyword::from_repr(rule.get(style)?)? {
            BorderStyleKeyword::None => return None,
            BorderStyleKeyword::Solid => BorderLine::Solid,
            BorderStyleKeyword::Dotted => BorderLine::Dotted,
            BorderStyleKeyword::Dashed => BorderLine::Dashed,
            BorderStyleKeyword::Double => BorderLine::Double,
            BorderStyleKeyword::Groove => BorderLine::Groove,
            BorderStyleKeyword::Ridge => BorderLine::Ridge,
            BorderStyleKeyword::Inset => BorderLine::Inset,
            BorderStyleKeyword::Outset => BorderLine::Outset,
        };
        let width = self.length(rule, width, ui, 0).unwrap_or(DEFAULT_WIDTH);
        let color = rule
            .color(color)
            .or_else(|| line.is_3d().then_some(DEFAULT_3D_COLOR));
        Some(BorderSide { line, width, color })
    }

    /// `outline-*`: a uniform border drawn outside any existing one.
    pub(super) fn apply_outline(&mut self, rule: Rule<'_>, border_ui: RenderId, mask: StateMask) {
        let Some(side) = self.border_side(
            rule,
            [Property::OutlineWidth, Property::OutlineStyle, Property::OutlineColor],
            border_ui,
        ) else {
            return;
        };
        let outline = Border::uniform(side);
        self.update_styles(border_ui, mask, |style| {
            for edge in Side::ALL {
                style.padding.add(edge, side.width);
            }
            match &mut style.border {
                Some(border) => border.outer = Some(Box::new(outline.clone())),
                None => style.border = Some(outline.clone()),
            }
        });
    }
}
