//! List bullets.
//!
//! A list item renders as a row holding a bullet holder and a content box;
//! the item's renderable is the content box. Bullets are found by walking
//! that structure, and anything not shaped like it is left alone.

use wcss_dom::render::{ListStyleType, RenderId, StateMask};
use wcss_dom::{HtmlTag, NodeId};

use super::{Applier, Rule};
use crate::diagnostics::CssError;
use crate::properties::{ListPositionKeyword, ListTypeKeyword, Property};
use crate::resources::ImageTarget;
use crate::values::css_url;

/// Indent of an `inside` positioned list.
const INSIDE_INDENT: i32 = 15;

const LIST_TAGS: [HtmlTag; 4] = [HtmlTag::Ul, HtmlTag::Ol, HtmlTag::Dir, HtmlTag::Menu];

impl Applier<'_> {
    /// `list-style-position`. Returns the renderable that carries borders:
    /// the whole row for a list item, `ui` otherwise.
    pub(super) fn apply_list_position(&mut self, element: NodeId, rule: Rule<'_>, ui: RenderId) -> RenderId {
        let is_item = self.has_tag(element, &[HtmlTag::Li]);
        if (is_item || self.has_tag(element, &LIST_TAGS))
            && rule.get(Property::ListStylePosition) == Some(ListPositionKeyword::Inside as i32)
        {
            // Padding rather than margin so the background covers the indent.
            self.update_styles(ui, StateMask::SELECTED | StateMask::UNSELECTED, |style| {
                style.padding.left = style.margin.left + INSIDE_INDENT;
            });
        }
        if is_item {
            self.render.parent(ui).unwrap_or(ui)
        } else {
            ui
        }
    }

    /// `list-style-type` and `list-style-image`, pushed down to the bullets.
    pub(super) fn apply_list_style(
        &mut self,
        element: NodeId,
        rule: Rule<'_>,
        ui: RenderId,
    ) -> Result<(), CssError> {
        let style = rule
            .get(Property::ListStyleType)
            .and_then(ListTypeKeyword::from_repr)
            .map(list_style_type);
        let image = rule.raw(Property::ListStyleImage).and_then(css_url);
        if style.is_none() && image.is_none() {
            return Ok(());
        }

        let bullets: Vec<RenderId> = if self.has_tag(element, &[HtmlTag::Li]) {
            self.render.parent(ui).and_then(|row| self.bullet(row)).into_iter().collect()
        } else if self.has_tag(element, &LIST_TAGS) {
            self.render
                .children(ui)
                .iter()
                .filter_map(|&row| self.bullet(row))
                .collect()
        } else {
            return Ok(());
        };
        if bullets.is_empty() {
            return Ok(());
        }

        let image_url = match image {
            Some(url) => self.resolve_image_url(rule, Property::ListStyleImage, url)?,
            None => None,
        };
        for bullet in bullets {
            let Some(marker) = self.render[bullet].list_marker.as_mut() else {
                continue;
            };
            if let Some(style) = style {
                marker.style = style;
            }
            if let Some(url) = &image_url {
                marker.image_url = Some(url.clone());
                self.request_image(url.clone(), ImageTarget::Foreground(bullet));
            }
        }
        Ok(())
    }

    /// The bullet of a list row: first child of its first child.
    fn bullet(&self, row: RenderId) -> Option<RenderId> {
        let holder = *self.render.children(row).first()?;
        let bullet = *self.render.children(holder).first()?;
        self.render[bullet].list_marker.is_some().then_some(bullet)
    }
}

const fn list_style_type(keyword: ListTypeKeyword) -> ListStyleType {
    match keyword {
        ListTypeKeyword::None => ListStyleType::None,
        ListTypeKeyword::Disc => ListStyleType::Disc,
        ListTypeKeyword::Circle => ListStyleType::Circle,
        ListTypeKeyword::Square => ListStyleType::Square,
        ListTypeKeyword::Decimal => ListStyleType::Decimal,
        ListTypeKeyword::UpperAlpha => ListStyleType::UpperAlpha,
        ListTypeKeyword::LowerAlpha => ListStyleType::LowerAlpha,
        ListTypeKeyword::UpperRoman => ListStyleType::UpperRoman,
        ListTypeKeyword::LowerRoman => ListStyleType::LowerRoman,
    }
}
