use wcss_dom::render::{Font, RenderId};

use super::{Applier, Rule};
use crate::context::SMALL_CAPS_FAMILY;
use crate::properties::{FONT_SIZE_LARGER, FONT_SIZE_SMALLER, FontVariantKeyword, Property};
use crate::values::{omit_quotes, resolve_length};

/// The font fields a rule sets.
#[derive(Debug, Default)]
struct FontRequest {
    family: Option<String>,
    size: Option<i32>,
    italic: Option<bool>,
    bold: Option<bool>,
}

impl FontRequest {
    fn from_rule(rule: Rule<'_>, small_caps_available: bool) -> Option<Self> {
        let mut family = rule
            .raw(Property::FontFamily)
            .and_then(|families| families.split(',').next())
            .map(|first| omit_quotes(first.trim()).to_string())
            .filter(|family| !family.is_empty());
        if small_caps_available
            && rule.get(Property::FontVariant) == Some(FontVariantKeyword::SmallCaps as i32)
        {
            family = Some(SMALL_CAPS_FAMILY.to_string());
        }
        let request = Self {
            family,
            size: rule.get(Property::FontSize),
            italic: rule.get(Property::FontStyle).map(|code| code == 1),
            bold: rule.get(Property::FontWeight).map(|code| code == 1),
        };
        let empty = request.family.is_none()
            && request.size.is_none()
            && request.italic.is_none()
            && request.bold.is_none();
        (!empty).then_some(request)
    }

    /// `current` with the requested fields filled in.
    fn over(&self, current: &Font) -> Font {
        let mut font = current.clone();
        if let Some(family) = &self.family {
            font.family.clone_from(family);
        }
        if let Some(size) = self.size {
            let height = current.height();
            font.size = match size {
                FONT_SIZE_LARGER => height + 2,
                FONT_SIZE_SMALLER => (height - 2).max(1),
                size => resolve_length(size, height, height),
            };
        }
        if let Some(italic) = self.italic {
            font.italic = italic;
        }
        if let Some(bold) = self.bold {
            font.bold = bold;
        }
        font
    }
}

impl Applier<'_> {
    /// `font-family`, `font-size`, `font-style`, `font-weight` and
    /// `font-variant`. Relative sizes grow from each renderable's own font;
    /// the result goes through the font table.
    pub(super) fn apply_font(&mut self, rule: Rule<'_>, ui: RenderId) {
        let small_caps = self.ctx.fonts().has_family(SMALL_CAPS_FAMILY);
        let Some(request) = FontRequest::from_rule(rule, small_caps) else {
            return;
        };
        for id in self.subtree(ui) {
            let mask = self.state_mask(id, rule.pseudo);
            let wanted = request.over(&self.current_style(id, mask).font);
            let font = self.ctx.resolve_font(&wanted);
            self.update_styles(id, mask, |style| style.font.clone_from(&font));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CssContext;
    use crate::parser::parse_declaration_block;

    fn request(css: &str, small_caps: bool) -> Option<FontRequest> {
        let mut ctx = CssContext::new();
        let tree = parse_declaration_block(&mut ctx, css).unwrap();
        let node = tree.get(crate::selector::SelectorTree::BLOCK);
        FontRequest::from_rule(
            Rule {
                name: &node.name,
                values: &node.values,
                pseudo: node.pseudo,
                base: None,
            },
            small_caps,
        )
    }

    #[test]
    fn test_first_family_is_used() {
        let font = request("font-family: 'Nokia Sans', serif", false)
            .unwrap()
            .over(&Font::default());
        assert_eq!(font.family, "Nokia Sans");
    }

    #[test]
    fn test_relative_sizes() {
        let base = Font::default();
        let larger = request("font-size: larger", false).unwrap().over(&base);
        assert_eq!(larger.size, Font::MEDIUM_SIZE + 2);
        let smaller = request("font-size: smaller", false).unwrap().over(&base);
        assert_eq!(smaller.size, Font::MEDIUM_SIZE - 2);
        let double = request("font-size: 200%", false).unwrap().over(&base);
        assert_eq!(double.size, Font::MEDIUM_SIZE * 2);
    }

    #[test]
    fn test_small_caps_needs_a_registered_font() {
        assert!(request("font-variant: small-caps", false).is_none());
        let font = request("font-variant: small-caps", true)
            .unwrap()
            .over(&Font::default());
        assert_eq!(font.family, SMALL_CAPS_FAMILY);
    }

    #[test]
    fn test_weight_and_style() {
        let font = request("font-weight: 700; font-style: oblique", false)
            .unwrap()
            .over(&Font::default());
        assert!(font.bold && font.italic);
    }
}
