use wcss_dom::render::{RenderId, RenderKind};

use super::{Applier, Rule};
use crate::properties::{CaptionSideKeyword, CollapseKeyword, EmptyCellsKeyword, Property};
use crate::values::{LengthUnit, convert_units_or_percentage, resolve_length};

impl Applier<'_> {
    /// `border-collapse`, `empty-cells`, `caption-side` and
    /// `border-spacing` on a table body.
    pub(super) fn apply_table_settings(&mut self, rule: Rule<'_>, ui: RenderId) {
        if self.render[ui].kind != RenderKind::Table {
            return;
        }
        let collapse = rule.get(Property::BorderCollapse);
        let empty_cells = rule.get(Property::EmptyCells);
        let caption_side = rule.get(Property::CaptionSide);
        let spacing = rule.raw(Property::BorderSpacing).map(|raw| self.border_spacing(raw, ui));

        let settings = self.render[ui].table.get_or_insert_with(Default::default);
        if let Some(code) = collapse {
            settings.collapse = Some(code == CollapseKeyword::Collapse as i32);
        }
        if let Some(code) = empty_cells {
            settings.show_empty_cells = Some(code == EmptyCellsKeyword::Show as i32);
        }
        if let Some(code) = caption_side {
            settings.caption_bottom = Some(code == CaptionSideKeyword::Bottom as i32);
        }
        if let Some(spacing) = spacing {
            settings.spacing = Some(spacing);
        }
        if let Some(code) = caption_side {
            self.move_caption(ui, code);
        }
    }

    /// Put the table at index 0 (caption below) or 1 (caption above) of
    /// its wrapper. Tables without a caption are left alone.
    fn move_caption(&mut self, table: RenderId, code: i32) {
        let Some(wrapper) = self.render.parent(table) else {
            return;
        };
        let children = self.render.children(wrapper);
        let (Ok(wanted), [_, _]) = (usize::try_from(code), children) else {
            return;
        };
        let Some(current) = children.iter().position(|&c| c == table) else {
            return;
        };
        if current != wanted {
            let caption = children[(current + 1) % 2];
            self.render.insert(wrapper, current, caption);
        }
    }

    /// One length for both directions, or horizontal then vertical.
    /// Percentages refer to the table's size hint.
    fn border_spacing(&self, raw: &str, ui: RenderId) -> (i32, i32) {
        let raw = raw.trim();
        let (horizontal, vertical) = raw.split_once(' ').unwrap_or((raw, raw));
        let font_height = self.font_height(ui);
        let size = self.render[ui].size;
        let resolve = |text: &str, reference: Option<i32>| {
            convert_units_or_percentage(text.trim(), LengthUnit::Px)
                .map_or(0, |value| resolve_length(value, font_height, reference.unwrap_or(0)))
        };
        (resolve(horizontal, size.width), resolve(vertical, size.height))
    }
}
