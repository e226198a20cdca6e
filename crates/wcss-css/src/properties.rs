//! The WCSS property table.
//!
//! Every supported longhand is a [`Property`] with a fixed value type and,
//! for most, a keyword table. Keywords either map to their position in the
//! table (`display: none` is code 3) or to an explicit value
//! (`border-width: thin` is 1px). Shorthands expand to longhands through
//! [`Shorthand::longhands`].

use serde::Serialize;
use strum_macros::{EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};
use wcss_dom::render::Side;

use crate::values::PERCENT_TAG;

/// A supported longhand property.
///
/// Declaration order is the storage order of [`crate::selector::PropertyValues`].
/// Everything from `border-collapse` on is a CSS2 extension.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    IntoStaticStr,
    EnumIter,
    EnumCount,
    Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Property {
    BackgroundColor,
    BackgroundImage,
    BackgroundRepeat,
    BackgroundAttachment,
    BackgroundPositionX,
    BackgroundPositionY,
    BorderTopWidth,
    BorderLeftWidth,
    BorderBottomWidth,
    BorderRightWidth,
    BorderTopStyle,
    BorderLeftStyle,
    BorderBottomStyle,
    BorderRightStyle,
    BorderTopColor,
    BorderLeftColor,
    BorderBottomColor,
    BorderRightColor,
    Clear,
    Color,
    VerticalAlign,
    Display,
    Float,
    FontFamily,
    FontSize,
    FontStyle,
    FontWeight,
    FontVariant,
    Height,
    Width,
    Visibility,
    WhiteSpace,
    ListStyleImage,
    ListStylePosition,
    ListStyleType,
    MarginTop,
    MarginLeft,
    MarginBottom,
    MarginRight,
    PaddingTop,
    PaddingLeft,
    PaddingBottom,
    PaddingRight,
    TextAlign,
    TextDecoration,
    TextIndent,
    TextTransform,
    #[strum(serialize = "-wap-access-key")]
    #[serde(rename = "-wap-access-key")]
    WapAccessKey,
    #[strum(serialize = "-wap-input-format")]
    #[serde(rename = "-wap-input-format")]
    WapInputFormat,
    #[strum(serialize = "-wap-input-required")]
    #[serde(rename = "-wap-input-required")]
    WapInputRequired,
    BorderCollapse,
    EmptyCells,
    BorderSpacing,
    CaptionSide,
    WordSpacing,
    LineHeight,
    MinWidth,
    MaxWidth,
    MinHeight,
    MaxHeight,
    Quotes,
    OutlineWidth,
    OutlineStyle,
    OutlineColor,
    Content,
    CounterReset,
    CounterIncrement,
    Direction,
}

/// How a property's value is converted at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// An RGB color.
    Color,
    /// A length in pixels or font units.
    Length,
    /// A length or a percentage.
    LengthOrPercentage,
    /// Like [`ValueType::LengthOrPercentage`] but a bare number means `em`.
    LengthOrPercentageOrMultiplier,
    /// Keywords only, or a raw string kept for the applier.
    Other,
}

/// The keyword table of a property.
#[derive(Debug, Clone, Copy)]
pub enum Keywords {
    /// Keywords coded by their position.
    Indexed(fn(&str) -> Option<i32>),
    /// Keywords with explicit values.
    Valued(&'static [(&'static str, i32)]),
}

impl Keywords {
    /// The code of `text`, compared case-insensitively.
    #[must_use]
    pub fn lookup(self, text: &str) -> Option<i32> {
        match self {
            Self::Indexed(parse) => parse(text),
            Self::Valued(table) => table
                .iter()
                .find(|(keyword, _)| keyword.eq_ignore_ascii_case(text))
                .map(|&(_, value)| value),
        }
    }
}

/// Declares a keyword enum whose discriminants are the stored codes.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, FromRepr, IntoStaticStr)]
        #[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
        #[repr(i32)]
        #[allow(missing_docs)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// The stored code of a keyword.
            #[must_use]
            pub fn code(text: &str) -> Option<i32> {
                text.parse::<Self>().ok().map(|keyword| keyword as i32)
            }
        }
    };
}

keyword_enum!(
    /// `background-repeat`.
    RepeatKeyword { Repeat, RepeatX, RepeatY, NoRepeat }
);
keyword_enum!(
    /// `background-attachment`.
    AttachmentKeyword { Fixed, Scroll }
);
keyword_enum!(
    /// `border-*-style` and `outline-style`.
    BorderStyleKeyword { None, Solid, Dotted, Dashed, Double, Groove, Ridge, Inset, Outset }
);
keyword_enum!(
    /// `clear`.
    ClearKeyword { Left, Right, None, Both }
);
keyword_enum!(
    /// `vertical-align`.
    VerticalAlignKeyword { Top, Middle, Bottom, Baseline, Sub, Super }
);
keyword_enum!(
    /// `display`.
    DisplayKeyword {
        Inline,
        Block,
        ListItem,
        None,
        #[strum(serialize = "-wap-marquee")]
        WapMarquee,
    }
);
keyword_enum!(
    /// `float`.
    FloatKeyword { Left, Right, None }
);
keyword_enum!(
    /// `font-variant`.
    FontVariantKeyword { Normal, SmallCaps }
);
keyword_enum!(
    /// `visibility`.
    VisibilityKeyword { Hidden, Visible, Collapse }
);
keyword_enum!(
    /// `white-space`.
    WhiteSpaceKeyword { Normal, Pre, Nowrap }
);
keyword_enum!(
    /// `list-style-position`.
    ListPositionKeyword { Inside, Outside }
);
keyword_enum!(
    /// `list-style-type`.
    ListTypeKeyword { None, Disc, Circle, Square, Decimal, UpperAlpha, LowerAlpha, UpperRoman, LowerRoman }
);
keyword_enum!(
    /// `text-align`.
    TextAlignKeyword { Left, Right, Center }
);
keyword_enum!(
    /// `text-decoration`.
    DecorationKeyword { Underline, LineThrough, None, Overline }
);
keyword_enum!(
    /// `text-transform`.
    TransformKeyword { None, Uppercase, Lowercase, Capitalize }
);
keyword_enum!(
    /// `-wap-input-required`.
    BooleanKeyword { True, False }
);
keyword_enum!(
    /// `border-collapse`.
    CollapseKeyword { Collapse, Separate }
);
keyword_enum!(
    /// `empty-cells`.
    EmptyCellsKeyword { Hide, Show }
);
keyword_enum!(
    /// `caption-side`.
    CaptionSideKeyword { Bottom, Top }
);
keyword_enum!(
    /// `direction`.
    DirectionKeyword { Rtl, Ltr }
);

/// `font-size: smaller`.
pub const FONT_SIZE_SMALLER: i32 = -3;
/// `font-size: larger`.
pub const FONT_SIZE_LARGER: i32 = -2;

const BACKGROUND_POSITION_X: &[(&str, i32)] = &[
    ("left", PERCENT_TAG),
    ("center", 50 + PERCENT_TAG),
    ("right", 100 + PERCENT_TAG),
];
const BACKGROUND_POSITION_Y: &[(&str, i32)] = &[
    ("top", PERCENT_TAG),
    ("center", 50 + PERCENT_TAG),
    ("bottom", 100 + PERCENT_TAG),
];
const BORDER_WIDTHS: &[(&str, i32)] = &[("thin", 1), ("medium", 3), ("thick", 5)];
const FONT_SIZES: &[(&str, i32)] = &[
    ("xx-small", 8),
    ("x-small", 10),
    ("small", 12),
    ("medium", 15),
    ("large", 19),
    ("x-large", 21),
    ("xx-large", 23),
    ("smaller", FONT_SIZE_SMALLER),
    ("larger", FONT_SIZE_LARGER),
];
/// Font style codes: 0 plain, 1 italic.
const FONT_STYLES: &[(&str, i32)] = &[("normal", 0), ("italic", 1), ("oblique", 1)];
/// Font weight codes: 0 plain, 1 bold.
const FONT_WEIGHTS: &[(&str, i32)] = &[
    ("normal", 0),
    ("bold", 1),
    ("bolder", 1),
    ("lighter", 0),
    ("100", 0),
    ("200", 0),
    ("300", 0),
    ("400", 0),
    ("500", 0),
    ("600", 1),
    ("700", 1),
    ("800", 1),
    ("900", 1),
];
/// `line-height: normal` is one font height.
const LINE_HEIGHTS: &[(&str, i32)] = &[("normal", 2 + crate::values::FONT_RELATIVE_TAG)];

impl Property {
    /// Number of properties.
    pub const COUNT: usize = <Self as strum::EnumCount>::COUNT;

    /// Storage index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The CSS name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Look a property up by its CSS name, case-insensitively.
    ///
    /// The background position axes are only reachable through the
    /// `background-position` shorthand.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse()
            .ok()
            .filter(|p| !matches!(p, Self::BackgroundPositionX | Self::BackgroundPositionY))
    }

    /// True for the CSS2 extensions.
    #[must_use]
    pub const fn is_css2(self) -> bool {
        self.index() >= Self::BorderCollapse.index()
    }

    /// How the value converts.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::BackgroundColor
            | Self::BorderTopColor
            | Self::BorderLeftColor
            | Self::BorderBottomColor
            | Self::BorderRightColor
            | Self::Color
            | Self::OutlineColor => ValueType::Color,
            Self::BorderTopWidth
            | Self::BorderLeftWidth
            | Self::BorderBottomWidth
            | Self::BorderRightWidth
            | Self::OutlineWidth => ValueType::Length,
            Self::BackgroundPositionX
            | Self::BackgroundPositionY
            | Self::FontSize
            | Self::Height
            | Self::Width
            | Self::MarginTop
            | Self::MarginLeft
            | Self::MarginBottom
            | Self::MarginRight
            | Self::PaddingTop
            | Self::PaddingLeft
            | Self::PaddingBottom
            | Self::PaddingRight
            | Self::TextIndent
            | Self::WordSpacing
            | Self::MinWidth
            | Self::MaxWidth
            | Self::MinHeight
            | Self::MaxHeight => ValueType::LengthOrPercentage,
            Self::LineHeight => ValueType::LengthOrPercentageOrMultiplier,
            _ => ValueType::Other,
        }
    }

    /// The keyword table, if the property has one.
    #[must_use]
    pub fn keywords(self) -> Option<Keywords> {
        use Keywords::{Indexed, Valued};
        let keywords = match self {
            Self::BackgroundRepeat => Indexed(RepeatKeyword::code),
            Self::BackgroundAttachment => Indexed(AttachmentKeyword::code),
            Self::BackgroundPositionX => Valued(BACKGROUND_POSITION_X),
            Self::BackgroundPositionY => Valued(BACKGROUND_POSITION_Y),
            Self::BorderTopWidth
            | Self::BorderLeftWidth
            | Self::BorderBottomWidth
            | Self::BorderRightWidth
            | Self::OutlineWidth => Valued(BORDER_WIDTHS),
            Self::BorderTopStyle
            | Self::BorderLeftStyle
            | Self::BorderBottomStyle
            | Self::BorderRightStyle
            | Self::OutlineStyle => Indexed(BorderStyleKeyword::code),
            Self::Clear => Indexed(ClearKeyword::code),
            Self::VerticalAlign => Indexed(VerticalAlignKeyword::code),
            Self::Display => Indexed(DisplayKeyword::code),
            Self::Float => Indexed(FloatKeyword::code),
            Self::FontSize => Valued(FONT_SIZES),
            Self::FontStyle => Valued(FONT_STYLES),
            Self::FontWeight => Valued(FONT_WEIGHTS),
            Self::FontVariant => Indexed(FontVariantKeyword::code),
            Self::Visibility => Indexed(VisibilityKeyword::code),
            Self::WhiteSpace => Indexed(WhiteSpaceKeyword::code),
            Self::ListStylePosition => Indexed(ListPositionKeyword::code),
            Self::ListStyleType => Indexed(ListTypeKeyword::code),
            Self::TextAlign => Indexed(TextAlignKeyword::code),
            Self::TextDecoration => Indexed(DecorationKeyword::code),
            Self::TextTransform => Indexed(TransformKeyword::code),
            Self::WapInputRequired => Indexed(BooleanKeyword::code),
            Self::BorderCollapse => Indexed(CollapseKeyword::code),
            Self::EmptyCells => Indexed(EmptyCellsKeyword::code),
            Self::CaptionSide => Indexed(CaptionSideKeyword::code),
            Self::LineHeight => Valued(LINE_HEIGHTS),
            Self::Direction => Indexed(DirectionKeyword::code),
            _ => return None,
        };
        Some(keywords)
    }

    /// Values that are read whole, commas and spaces included.
    #[must_use]
    pub const fn reads_whole_value(self) -> bool {
        matches!(
            self,
            Self::WapAccessKey
                | Self::FontFamily
                | Self::Quotes
                | Self::BorderSpacing
                | Self::Content
                | Self::CounterReset
                | Self::CounterIncrement
        )
    }

    /// Properties holding a `url(...)` that is resolved against the sheet.
    #[must_use]
    pub const fn is_url(self) -> bool {
        matches!(self, Self::BackgroundImage | Self::ListStyleImage)
    }

    /// The border width, style and color properties of one side.
    #[must_use]
    pub const fn border_side(side: Side) -> [Self; 3] {
        match side {
            Side::Top => [Self::BorderTopWidth, Self::BorderTopStyle, Self::BorderTopColor],
            Side::Right => [Self::BorderRightWidth, Self::BorderRightStyle, Self::BorderRightColor],
            Side::Bottom => [Self::BorderBottomWidth, Self::BorderBottomStyle, Self::BorderBottomColor],
            Side::Left => [Self::BorderLeftWidth, Self::BorderLeftStyle, Self::BorderLeftColor],
        }
    }

    /// The margin property of one side.
    #[must_use]
    pub const fn margin(side: Side) -> Self {
        match side {
            Side::Top => Self::MarginTop,
            Side::Right => Self::MarginRight,
            Side::Bottom => Self::MarginBottom,
            Side::Left => Self::MarginLeft,
        }
    }

    /// The padding property of one side.
    #[must_use]
    pub const fn padding(side: Side) -> Self {
        match side {
            Side::Top => Self::PaddingTop,
            Side::Right => Self::PaddingRight,
            Side::Bottom => Self::PaddingBottom,
            Side::Left => Self::PaddingLeft,
        }
    }
}

/// A shorthand property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum Shorthand {
    Background,
    BackgroundPosition,
    BorderWidth,
    BorderStyle,
    BorderColor,
    BorderTop,
    BorderRight,
    BorderBottom,
    BorderLeft,
    Border,
    Font,
    Margin,
    Padding,
    ListStyle,
    Outline,
}

/// What a shorthand expands to: a longhand or another shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Longhand {
    /// A property.
    Property(Property),
    /// A nested shorthand.
    Shorthand(Shorthand),
}

/// Which collatable values go to which side, by number of values given.
/// Entry `n - 1` lists, for each of the `n` values, the sides it sets.
pub const COLLATION: [&[&[Side]]; 4] = [
    &[&[Side::Top, Side::Right, Side::Bottom, Side::Left]],
    &[&[Side::Top, Side::Bottom], &[Side::Left, Side::Right]],
    &[&[Side::Top], &[Side::Left, Side::Right], &[Side::Bottom]],
    &[&[Side::Top], &[Side::Right], &[Side::Bottom], &[Side::Left]],
];

impl Shorthand {
    /// Look a shorthand up by its CSS name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// The CSS name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Collatable shorthands take one to four values distributed over the
    /// box sides by [`COLLATION`].
    #[must_use]
    pub const fn is_collatable(self) -> bool {
        matches!(
            self,
            Self::BorderWidth | Self::BorderStyle | Self::BorderColor | Self::Margin | Self::Padding
        )
    }

    /// The expansion, in assignment order. Collatable shorthands list their
    /// sides as top, right, bottom, left.
    #[must_use]
    pub const fn longhands(self) -> &'static [Longhand] {
        use Longhand::{Property as P, Shorthand as S};
        match self {
            Self::Background => &[
                P(Property::BackgroundColor),
                P(Property::BackgroundImage),
                P(Property::BackgroundRepeat),
                P(Property::BackgroundAttachment),
                S(Self::BackgroundPosition),
            ],
            Self::BackgroundPosition => &[
                P(Property::BackgroundPositionX),
                P(Property::BackgroundPositionY),
            ],
            Self::BorderWidth => &[
                P(Property::BorderTopWidth),
                P(Property::BorderRightWidth),
                P(Property::BorderBottomWidth),
                P(Property::BorderLeftWidth),
            ],
            Self::BorderStyle => &[
                P(Property::BorderTopStyle),
                P(Property::BorderRightStyle),
                P(Property::BorderBottomStyle),
                P(Property::BorderLeftStyle),
            ],
            Self::BorderColor => &[
                P(Property::BorderTopColor),
                P(Property::BorderRightColor),
                P(Property::BorderBottomColor),
                P(Property::BorderLeftColor),
            ],
            Self::BorderTop => &[
                P(Property::BorderTopWidth),
                P(Property::BorderTopStyle),
                P(Property::BorderTopColor),
            ],
            Self::BorderRight => &[
                P(Property::BorderRightWidth),
                P(Property::BorderRightStyle),
                P(Property::BorderRightColor),
            ],
            Self::BorderBottom => &[
                P(Property::BorderBottomWidth),
                P(Property::BorderBottomStyle),
                P(Property::BorderBottomColor),
            ],
            Self::BorderLeft => &[
                P(Property::BorderLeftWidth),
                P(Property::BorderLeftStyle),
                P(Property::BorderLeftColor),
            ],
            Self::Border => &[
                S(Self::BorderWidth),
                S(Self::BorderStyle),
                S(Self::BorderColor),
            ],
            Self::Font => &[
                P(Property::FontStyle),
                P(Property::FontVariant),
                P(Property::FontWeight),
                P(Property::FontSize),
                P(Property::FontFamily),
            ],
            Self::Margin => &[
                P(Property::MarginTop),
                P(Property::MarginRight),
                P(Property::MarginBottom),
                P(Property::MarginLeft),
            ],
            Self::Padding => &[
                P(Property::PaddingTop),
                P(Property::PaddingRight),
                P(Property::PaddingBottom),
                P(Property::PaddingLeft),
            ],
            Self::ListStyle => &[
                P(Property::ListStyleType),
                P(Property::ListStylePosition),
                P(Property::ListStyleImage),
            ],
            Self::Outline => &[
                P(Property::OutlineWidth),
                P(Property::OutlineStyle),
                P(Property::OutlineColor),
            ],
        }
    }

    /// The longhand of a collatable shorthand for one side.
    #[must_use]
    pub const fn side(self, side: Side) -> Option<Property> {
        if !self.is_collatable() {
            return None;
        }
        let index = match side {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        };
        match self.longhands()[index] {
            Longhand::Property(property) => Some(property),
            Longhand::Shorthand(_) => None,
        }
    }
}
