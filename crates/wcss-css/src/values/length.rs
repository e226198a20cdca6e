//! Length and percentage values.

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

/// Tag bit marking a percentage of some reference dimension.
pub const PERCENT_TAG: i32 = 1 << 20;

/// Tag bit marking a value in half font heights (`em` counts double).
pub const FONT_RELATIVE_TAG: i32 = 1 << 21;

/// Largest magnitude a converted length can hold below the tag bits.
pub const MAX_MAGNITUDE: i32 = PERCENT_TAG - 1;

/// CSS length units with their fixed pixel factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum LengthUnit {
    Px,
    Em,
    Ex,
    In,
    Pt,
    Pc,
    Mm,
    Cm,
}

impl LengthUnit {
    /// Multiplier applied to the number. Font-relative units count half
    /// font heights.
    #[must_use]
    pub const fn factor(self) -> u8 {
        match self {
            Self::Px | Self::Ex | Self::Pt => 1,
            Self::Em | Self::Mm => 2,
            Self::In => 72,
            Self::Pc => 12,
            Self::Cm => 28,
        }
    }

    /// `em` and `ex` depend on the font of the element being styled.
    #[must_use]
    pub const fn is_font_relative(self) -> bool {
        matches!(self, Self::Em | Self::Ex)
    }

    /// The unit suffix.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        self.into()
    }
}

/// Convert a length such as `12px`, `1.5em` or `3` (in `default` units).
///
/// Returns `None` if the number does not parse.
#[must_use]
pub fn convert_units(text: &str, default: LengthUnit) -> Option<i32> {
    let (number, unit) = LengthUnit::iter()
        .find_map(|unit| text.strip_suffix(unit.suffix()).map(|n| (n, unit)))
        .unwrap_or((text, default));

    let number: f32 = number.trim().parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    let tag = if unit.is_font_relative() { FONT_RELATIVE_TAG } else { 0 };
    Some(tagged(number * f32::from(unit.factor()), tag))
}

/// Like [`convert_units`] but also accepts `N%`, tagged with [`PERCENT_TAG`].
#[must_use]
pub fn convert_units_or_percentage(text: &str, default: LengthUnit) -> Option<i32> {
    match text.strip_suffix('%') {
        Some(number) => {
            let number: f32 = number.trim().parse().ok()?;
            number.is_finite().then(|| tagged(number, PERCENT_TAG))
        }
        None => convert_units(text, default),
    }
}

/// The magnitude is clamped to [`MAX_MAGNITUDE`] and tagged; the sign
/// goes on the outside so negative values keep their tag.
#[allow(clippy::cast_possible_truncation)]
fn tagged(value: f32, tag: i32) -> i32 {
    let magnitude = (value.abs() as i32).min(MAX_MAGNITUDE) | tag;
    if value < 0.0 { -magnitude } else { magnitude }
}

/// Resolve a possibly tagged length to pixels.
///
/// Percentages resolve against `reference`, font-relative values against
/// `font_height`. Untagged values are returned unchanged.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub const fn resolve_length(value: i32, font_height: i32, reference: i32) -> i32 {
    let magnitude = value.unsigned_abs();
    let amount = (magnitude & MAX_MAGNITUDE as u32) as i32;
    let resolved = if magnitude & PERCENT_TAG as u32 != 0 {
        amount.saturating_mul(reference) / 100
    } else if magnitude & FONT_RELATIVE_TAG as u32 != 0 {
        amount.saturating_mul(font_height) / 2
    } else {
        return value;
    };
    if value < 0 { resolved.saturating_neg() } else { resolved }
}
