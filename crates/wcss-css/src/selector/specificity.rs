//! Simple selector analysis: pseudo-classes, tag, class and id, and the
//! specificity they contribute.

use bitflags::bitflags;

use super::predicate::AttributePredicate;

bitflags! {
    /// Pseudo-classes and pseudo-elements of a simple selector.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PseudoClass: u8 {
        /// `:focus`, and `:hover` which handsets treat the same way.
        const FOCUS = 1;
        /// `:active`.
        const ACTIVE = 1 << 1;
        /// `:link`.
        const LINK = 1 << 2;
        /// `:visited`.
        const VISITED = 1 << 3;
        /// `:before`.
        const BEFORE = 1 << 4;
        /// `:after`.
        const AFTER = 1 << 5;
        /// `:first-child`.
        const FIRST_CHILD = 1 << 6;
    }
}

impl PseudoClass {
    /// Pseudo-classes that only make sense on links.
    pub const LINK_STATES: Self = Self::FOCUS
        .union(Self::ACTIVE)
        .union(Self::LINK)
        .union(Self::VISITED);

    /// `:before` and `:after`.
    pub const GENERATED: Self = Self::BEFORE.union(Self::AFTER);

    /// Look a pseudo-class up by name, without the colon.
    #[must_use]
    pub fn from_css_name(name: &str) -> Option<Self> {
        let flag = match name.to_ascii_lowercase().as_str() {
            "hover" | "focus" => Self::FOCUS,
            "active" => Self::ACTIVE,
            "link" => Self::LINK,
            "visited" => Self::VISITED,
            "before" => Self::BEFORE,
            "after" => Self::AFTER,
            "first-child" => Self::FIRST_CHILD,
            _ => return None,
        };
        Some(flag)
    }
}

/// The parts of a simple selector once attribute predicates are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleSelector {
    /// Required tag name.
    pub tag: Option<String>,
    /// Required classes, dot separated when there are several.
    pub class: Option<String>,
    /// Required id.
    pub id: Option<String>,
    /// Pseudo-classes.
    pub pseudo: PseudoClass,
    /// `:lang()` codes.
    pub lang: Vec<String>,
    /// Specificity of this simple selector alone.
    pub specificity: u32,
}

/// Analyze `name`, the selector text with bracket groups removed.
///
/// An id counts 100, a class 10, a tag or pseudo-class 1. A repeated
/// pseudo-class counts once. A link state pseudo-class with no tag implies
/// `a`.
#[must_use]
pub fn analyze(name: &str) -> SimpleSelector {
    let mut selector = SimpleSelector::default();
    let mut rest = name.strip_prefix('*').unwrap_or(name);

    while let Some(colon) = rest.rfind(':') {
        let suffix = &rest[colon + 1..];
        rest = &rest[..colon];
        if let Some(flag) = PseudoClass::from_css_name(suffix) {
            if !selector.pseudo.contains(flag) {
                selector.pseudo |= flag;
                selector.specificity += 1;
            }
        } else if crate::CSS2
            && let Some(code) = suffix.strip_prefix("lang(")
        {
            selector.lang.push(code.strip_suffix(')').unwrap_or(code).to_string());
            selector.specificity += 1;
        }
    }

    if rest.is_empty() && selector.pseudo.intersects(PseudoClass::LINK_STATES) {
        rest = "a";
    }

    let tag = if let Some(hash) = rest.find('#') {
        selector.specificity += 100;
        selector.id = Some(rest[hash + 1..].to_string());
        &rest[..hash]
    } else if let Some(dot) = rest.find('.') {
        selector.specificity += 10;
        selector.class = Some(rest[dot + 1..].to_string());
        &rest[..dot]
    } else {
        rest
    };
    if !tag.is_empty() {
        selector.specificity += 1;
        selector.tag = Some(tag.to_string());
    }
    selector
}

/// Specificity contributed by attribute predicates: one each.
#[must_use]
pub fn predicate_specificity(predicates: &[AttributePredicate]) -> u32 {
    u32::try_from(predicates.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights() {
        assert_eq!(analyze("p").specificity, 1);
        assert_eq!(analyze(".warn").specificity, 10);
        assert_eq!(analyze("p.warn").specificity, 11);
        assert_eq!(analyze("div#main").specificity, 101);
        assert_eq!(analyze("*").specificity, 0);
    }

    #[test]
    fn test_id_wins_over_class_part() {
        let selector = analyze("p#x.y");
        assert_eq!(selector.id.as_deref(), Some("x.y"));
        assert_eq!(selector.class, None);
        assert_eq!(selector.tag.as_deref(), Some("p"));
    }

    #[test]
    fn test_link_states_imply_anchor() {
        let selector = analyze(":visited");
        assert_eq!(selector.tag.as_deref(), Some("a"));
        assert_eq!(selector.pseudo, PseudoClass::VISITED);
        assert_eq!(selector.specificity, 2);
    }

    #[test]
    fn test_repeated_pseudo_class_counts_once() {
        let selector = analyze("a:hover:focus");
        assert_eq!(selector.pseudo, PseudoClass::FOCUS);
        assert_eq!(selector.specificity, 2);
    }

    #[test]
    #[cfg(feature = "css2")]
    fn test_lang_pseudo_class() {
        let selector = analyze("p:lang(en)");
        assert_eq!(selector.lang, vec!["en".to_string()]);
        assert_eq!(selector.specificity, 2);
    }
}
