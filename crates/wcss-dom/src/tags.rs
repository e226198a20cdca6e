//! Tag and attribute identifiers for the HTML4 / XHTML-MP vocabulary.
//!
//! The cascade compares tag names case-insensitively and looks attributes up
//! by identifier, so both are parsed once when the tag tree is built.
//! Anything outside the known vocabulary is kept verbatim in an `Other`
//! variant rather than dropped, so attribute selectors on unknown attributes
//! still have something to compare against.

use serde::Serialize;
use strum_macros::{EnumString, IntoStaticStr};

/// An element's tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum HtmlTag {
    // Structure
    Body,
    Head,
    Html,
    Title,
    // Text
    Abbr,
    Acronym,
    Address,
    Blockquote,
    Br,
    Cite,
    Code,
    Dfn,
    Div,
    Em,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Kbd,
    P,
    Pre,
    Q,
    Samp,
    Span,
    Strong,
    Var,
    // Hypertext
    A,
    // Lists
    Dl,
    Dt,
    Dd,
    Ol,
    Ul,
    Li,
    // Forms
    Form,
    Input,
    Label,
    Select,
    #[strum(serialize = "option")]
    SelectOption,
    Textarea,
    Optgroup,
    Fieldset,
    Legend,
    // Tables
    Caption,
    Table,
    Td,
    Th,
    Tr,
    Thead,
    Tbody,
    Tfoot,
    // Media and metadata
    Img,
    Object,
    Param,
    Meta,
    Link,
    Base,
    Style,
    Script,
    // Presentation
    Hr,
    B,
    I,
    Big,
    Small,
    U,
    Font,
    Del,
    Ins,
    Tt,
    Basefont,
    Menu,
    S,
    Strike,
    Center,
    Dir,
    Map,
    Area,
    Sub,
    Sup,
    Noscript,
    Noframes,
    /// A tag outside the supported vocabulary, kept lowercased.
    #[strum(default)]
    Other(String),
}

impl HtmlTag {
    /// Parse a tag name; unknown names become [`HtmlTag::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.parse::<Self>() {
            Ok(Self::Other(_)) | Err(_) => Self::Other(name.to_ascii_lowercase()),
            Ok(known) => known,
        }
    }

    /// The lowercase tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => known.into(),
        }
    }

    /// Elements that flow into their parent rather than opening a box of
    /// their own. Their renderables are the runs of their descendants.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::A
                | Self::Abbr
                | Self::Acronym
                | Self::B
                | Self::Big
                | Self::Cite
                | Self::Code
                | Self::Del
                | Self::Dfn
                | Self::Em
                | Self::Font
                | Self::I
                | Self::Ins
                | Self::Kbd
                | Self::Label
                | Self::Q
                | Self::S
                | Self::Samp
                | Self::Small
                | Self::Span
                | Self::Strike
                | Self::Strong
                | Self::Sub
                | Self::Sup
                | Self::Tt
                | Self::U
                | Self::Var
                | Self::Basefont
        )
    }

    /// Elements that never produce renderables.
    #[must_use]
    pub const fn is_invisible(&self) -> bool {
        matches!(
            self,
            Self::Head
                | Self::Title
                | Self::Meta
                | Self::Link
                | Self::Base
                | Self::Style
                | Self::Script
                | Self::Param
                | Self::Map
                | Self::Area
        )
    }

    /// `ul`, `ol`, `dir` and `menu`.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::Ul | Self::Ol | Self::Dir | Self::Menu)
    }
}

/// An attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum HtmlAttr {
    Class,
    Id,
    Style,
    Title,
    Xmlns,
    #[strum(serialize = "xml:lang")]
    XmlLang,
    Align,
    Bgcolor,
    Link,
    Text,
    Version,
    Cite,
    Accesskey,
    Charset,
    Href,
    Hreflang,
    Rel,
    Rev,
    Tabindex,
    Type,
    Action,
    Enctype,
    Method,
    Width,
    Height,
    Alt,
    Hspace,
    Vspace,
    Longdesc,
    Localsrc,
    Src,
    Size,
    Checked,
    Emptyok,
    Format,
    Istyle,
    Maxlength,
    Name,
    Value,
    For,
    #[strum(serialize = "xml:space")]
    XmlSpace,
    Multiple,
    Selected,
    Abbr,
    Axis,
    Colspan,
    Headers,
    Rowspan,
    Scope,
    Valign,
    Start,
    Media,
    Label,
    Summary,
    Content,
    #[strum(serialize = "http-equiv")]
    HttpEquiv,
    Scheme,
    Cols,
    Rows,
    Dir,
    Border,
    Color,
    Face,
    Shape,
    Coords,
    Usemap,
    Lang,
    Cellspacing,
    Cellpadding,
    Frame,
    Rules,
    Disabled,
    Readonly,
    Ismap,
    /// An attribute outside the supported vocabulary, kept lowercased.
    #[strum(default)]
    Other(String),
}

impl HtmlAttr {
    /// Parse an attribute name; unknown names become [`HtmlAttr::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.parse::<Self>() {
            Ok(Self::Other(_)) | Err(_) => Self::Other(name.to_ascii_lowercase()),
            Ok(known) => known,
        }
    }

    /// The lowercase attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => known.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_lookup_is_case_insensitive() {
        assert_eq!(HtmlTag::from_name("TABLE"), HtmlTag::Table);
        assert_eq!(HtmlTag::from_name("option"), HtmlTag::SelectOption);
        assert_eq!(HtmlTag::SelectOption.name(), "option");
    }

    #[test]
    fn test_unknown_names_are_kept() {
        let tag = HtmlTag::from_name("Blink");
        assert_eq!(tag.name(), "blink");
        assert_eq!(HtmlAttr::from_name("data-x").name(), "data-x");
        assert_eq!(HtmlAttr::from_name("xml:lang"), HtmlAttr::XmlLang);
    }
}
