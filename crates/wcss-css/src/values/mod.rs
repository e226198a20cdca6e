//! Conversion of CSS value strings to the engine's numeric codes.
//!
//! Lengths are converted to pixels at parse time where possible. Values that
//! can only be resolved once the target renderable is known keep a tag bit:
//! [`PERCENT_TAG`] for percentages and [`FONT_RELATIVE_TAG`] for `em`/`ex`.
//! Tagged values must go through [`resolve_length`] before use.

pub mod color;
pub mod length;

pub use color::parse_color;
pub use length::{
    FONT_RELATIVE_TAG, LengthUnit, MAX_MAGNITUDE, PERCENT_TAG, convert_units,
    convert_units_or_percentage, resolve_length,
};

/// Strip one pair of surrounding quotes, if the value starts with one.
#[must_use]
pub fn omit_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    match chars.next() {
        Some('"' | '\'') if text.len() >= 2 => chars.next_back().map_or(text, |_| chars.as_str()),
        _ => text,
    }
}

/// The target of a `url(...)` value, trimmed and unquoted.
#[must_use]
pub fn css_url(value: &str) -> Option<&str> {
    let prefix = value.get(..4)?;
    if !prefix.eq_ignore_ascii_case("url(") {
        return None;
    }
    let end = value.find(')')?;
    Some(omit_quotes(value[4..end].trim()))
}
