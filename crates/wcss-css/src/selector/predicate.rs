//! Attribute and `:lang()` constraints.

use wcss_dom::{NodeId, TagTree};

/// How an attribute value is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `[attr]`: the attribute exists.
    Present,
    /// `[attr=value]`: exact, case-sensitive.
    Equals(String),
    /// `[attr|=value]`: equal to `value` or starting with `value-`.
    DashMatch(String),
    /// `[attr~=value]`: `value` is one of the space separated words.
    ContainsWord(String),
}

/// One predicate of a simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributePredicate {
    /// An attribute constraint.
    Attribute {
        /// Attribute name as written.
        name: String,
        /// The comparison.
        constraint: Constraint,
    },
    /// `:lang(code)`, matched against the element's own or inherited `lang`.
    Lang(String),
}

/// The result of splitting `name[...][...]` into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bracketed {
    /// The selector text with every bracket group removed.
    pub base: String,
    /// The attribute predicates, in source order.
    pub predicates: Vec<AttributePredicate>,
    /// Set on a syntax error; the selector then never matches.
    pub illegal: bool,
}

/// Split attribute selections off a simple selector.
///
/// Text between and after bracket groups stays part of the base name, so
/// `a[href]:hover` keeps its pseudo-class. Without CSS2 support any bracket
/// makes the selector illegal.
#[must_use]
pub fn split_brackets(name: &str) -> Bracketed {
    let Some(open) = name.find('[') else {
        return Bracketed {
            base: name.to_string(),
            ..Bracketed::default()
        };
    };

    let mut result = Bracketed {
        base: name[..open].to_string(),
        ..Bracketed::default()
    };
    if !crate::CSS2 {
        result.illegal = true;
        return result;
    }

    let mut rest = &name[open..];
    while let Some(open) = rest.find('[') {
        result.base.push_str(&rest[..open]);
        let inner = &rest[open + 1..];
        let Some(close) = inner.find(']').filter(|&close| close > 0) else {
            result.illegal = true;
            return result;
        };
        match parse_selection(&inner[..close]) {
            Some(predicate) => result.predicates.push(predicate),
            None => {
                result.illegal = true;
                return result;
            }
        }
        rest = &inner[close + 1..];
    }
    result.base.push_str(rest);
    result
}

/// Parse the inside of one bracket group. `None` for `[=...]`.
fn parse_selection(expression: &str) -> Option<AttributePredicate> {
    let Some(eq) = expression.find('=') else {
        return Some(AttributePredicate::Attribute {
            name: expression.to_string(),
            constraint: Constraint::Present,
        });
    };
    if eq == 0 {
        return None;
    }

    let value = unquote(&expression[eq + 1..]).to_string();
    let (name, constraint) = match &expression[..eq] {
        prefix if prefix.ends_with('~') => (&prefix[..prefix.len() - 1], Constraint::ContainsWord(value)),
        prefix if prefix.ends_with('|') => (&prefix[..prefix.len() - 1], Constraint::DashMatch(value)),
        prefix => (prefix, Constraint::Equals(value)),
    };
    Some(AttributePredicate::Attribute {
        name: name.to_string(),
        constraint,
    })
}

/// Strip matching quotes on both ends.
fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value)
}

impl AttributePredicate {
    /// Test the predicate against a tag tree node. Text nodes have no
    /// attributes and fail every attribute constraint.
    #[must_use]
    pub fn matches(&self, doc: &TagTree, node: NodeId) -> bool {
        match self {
            Self::Lang(wanted) => doc.lang(node).is_some_and(|lang| {
                lang == wanted
                    || lang
                        .strip_prefix(wanted.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }),
            Self::Attribute { name, constraint } => {
                let Some(value) = doc.as_element(node).and_then(|e| e.attr_named(name)) else {
                    return false;
                };
                match constraint {
                    Constraint::Present => true,
                    Constraint::Equals(wanted) => value == wanted,
                    Constraint::DashMatch(wanted) => {
                        value == wanted
                            || value
                                .strip_prefix(wanted.as_str())
                                .is_some_and(|rest| rest.starts_with('-'))
                    }
                    Constraint::ContainsWord(wanted) => value.split(' ').any(|word| word == wanted),
                }
            }
        }
    }
}
