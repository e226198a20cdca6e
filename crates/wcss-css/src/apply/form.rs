//! Form controls and access keys.

use wcss_dom::render::{RenderId, RenderKind};
use wcss_dom::{HtmlTag, NodeId};

use super::{Applier, Rule};
use crate::context::CssContext;
use crate::properties::{BooleanKeyword, Property};
use crate::values::omit_quotes;

impl Applier<'_> {
    /// `-wap-input-format` and `-wap-input-required` on input controls.
    pub(super) fn apply_input(&mut self, element: NodeId, rule: Rule<'_>, ui: RenderId) {
        if !self.has_tag(element, &[HtmlTag::Input, HtmlTag::Textarea]) {
            return;
        }
        let format = rule.raw(Property::WapInputFormat).map(omit_quotes);
        let required = rule.get(Property::WapInputRequired);
        let Some(input) = self.render[ui].input.as_mut() else {
            return;
        };
        if let Some(format) = format {
            input.format = Some(format.to_string());
        }
        if let Some(required) = required {
            input.required = required == BooleanKeyword::True as i32;
        }
    }

    /// `-wap-access-key`. Alternatives are separated by commas and the
    /// first one this device understands wins; an alternative may list
    /// several keys separated by spaces.
    pub(super) fn apply_access_keys(&mut self, element: NodeId, rule: Rule<'_>, ui: RenderId) {
        let Some(value) = rule.raw(Property::WapAccessKey) else {
            return;
        };
        let accepts_keys = self.has_tag(element, &[HtmlTag::Input, HtmlTag::Textarea, HtmlTag::Label])
            || (self.has_tag(element, &[HtmlTag::A])
                && self.render[ui].kind == RenderKind::Link
                && self.doc.renderables(element).first() == Some(&ui));
        if !accepts_keys {
            return;
        }
        if let Some(keys) = parse_access_keys(self.ctx, value) {
            self.render[ui].access_keys = keys;
        }
    }
}

/// The key codes of the first usable alternative of an access key value.
fn parse_access_keys(ctx: &CssContext, value: &str) -> Option<Vec<u32>> {
    value.split(',').find_map(|alternative| {
        let keys: Option<Vec<u32>> = alternative
            .split_whitespace()
            .map(|key| key_code(ctx, omit_quotes(key)))
            .collect();
        keys.filter(|keys| !keys.is_empty())
    })
}

/// `\hex` code point, a single character, or a named special key.
fn key_code(ctx: &CssContext, key: &str) -> Option<u32> {
    if let Some(hex) = key.strip_prefix('\\') {
        return u32::from_str_radix(hex, 16).ok();
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(u32::from(c)),
        _ => ctx.special_key(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_characters_and_hex() {
        let ctx = CssContext::new();
        assert_eq!(parse_access_keys(&ctx, "1"), Some(vec![u32::from('1')]));
        assert_eq!(parse_access_keys(&ctx, "\\2a"), Some(vec![0x2a]));
        assert_eq!(parse_access_keys(&ctx, "a b"), Some(vec![97, 98]));
    }

    #[test]
    fn test_first_usable_alternative_wins() {
        let mut ctx = CssContext::new();
        assert_eq!(parse_access_keys(&ctx, "phone-send, 5"), Some(vec![u32::from('5')]));
        ctx.add_special_key("phone-send", 0x1_0001);
        assert_eq!(parse_access_keys(&ctx, "phone-send, 5"), Some(vec![0x1_0001]));
        assert_eq!(parse_access_keys(&ctx, "unknown"), None);
    }
}
