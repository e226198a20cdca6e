//! Integration tests for style sheet parsing.

use std::cell::RefCell;
use std::rc::Rc;

use wcss_css::selector::{AttributePredicate, Constraint};
use wcss_css::{CssContext, ErrorCode, Property, SelectorTree, parse_stylesheet};

fn parse_with(ctx: &mut CssContext, css: &str) -> SelectorTree {
    parse_stylesheet(ctx, css, None).unwrap().tree
}

fn parse(css: &str) -> SelectorTree {
    parse_with(&mut CssContext::new(), css)
}

/// A context recording every diagnostic code it is handed.
fn recording_context() -> (CssContext, Rc<RefCell<Vec<ErrorCode>>>) {
    let mut ctx = CssContext::new();
    let codes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&codes);
    ctx.set_handler(move |diagnostic| {
        sink.borrow_mut().push(diagnostic.code);
        true
    });
    (ctx, codes)
}

#[test]
fn test_margin_collation() {
    let tree = parse("p { margin: 1px 2px 3px } div { padding: 4px 5px 6px 7px }");
    let p = &tree.get(tree.roots()[0]).values;
    assert_eq!(p.get(Property::MarginTop), Some(1));
    assert_eq!(p.get(Property::MarginRight), Some(2));
    assert_eq!(p.get(Property::MarginBottom), Some(3));
    assert_eq!(p.get(Property::MarginLeft), Some(2));

    let div = &tree.get(tree.roots()[1]).values;
    assert_eq!(div.get(Property::PaddingTop), Some(4));
    assert_eq!(div.get(Property::PaddingRight), Some(5));
    assert_eq!(div.get(Property::PaddingBottom), Some(6));
    assert_eq!(div.get(Property::PaddingLeft), Some(7));
}

#[test]
fn test_border_shorthand_reaches_every_side() {
    let tree = parse("td { border: thin solid #ff0000 }");
    let values = &tree.get(tree.roots()[0]).values;
    for property in [
        Property::BorderTopWidth,
        Property::BorderRightWidth,
        Property::BorderBottomWidth,
        Property::BorderLeftWidth,
    ] {
        assert_eq!(values.get(property), Some(1));
    }
    assert_eq!(values.get(Property::BorderLeftColor), Some(0xff0000));
}

#[test]
fn test_unknown_property_is_reported_and_skipped() {
    let (mut ctx, codes) = recording_context();
    let tree = parse_with(&mut ctx, "p { zoom: 2; color: #00ff00 }");
    assert_eq!(tree.get(tree.roots()[0]).values.get(Property::Color), Some(0x00ff00));
    assert_eq!(*codes.borrow(), vec![ErrorCode::AttributeNotSupported]);
}

#[test]
fn test_invalid_value_is_reported() {
    let (mut ctx, codes) = recording_context();
    let _ = parse_with(&mut ctx, "p { margin-left: wide }");
    assert_eq!(*codes.borrow(), vec![ErrorCode::AttributeValueInvalid]);
}

#[test]
fn test_handler_refusal_aborts_parse() {
    let mut ctx = CssContext::new();
    ctx.set_handler(|_| false);
    assert!(parse_stylesheet(&mut ctx, "p { zoom: 2 }", None).is_err());
}

#[test]
fn test_import_without_base_is_reported() {
    let (mut ctx, codes) = recording_context();
    let parsed = parse_stylesheet(&mut ctx, "@import \"more.css\";", None).unwrap();
    assert!(parsed.imports.is_empty());
    assert_eq!(*codes.borrow(), vec![ErrorCode::NoBaseUrl]);
}

#[test]
fn test_unknown_at_rule_is_skipped() {
    let tree = parse("@font-face { font-family: x } p { color: #000001 }");
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.get(tree.roots()[0]).tag.as_deref(), Some("p"));
}

#[cfg(feature = "css2")]
mod css2 {
    use super::*;

    #[test]
    fn test_media_blocks_follow_context_media() {
        let tree = parse("@media handheld { p { color: #000001 } } @media print { h1 { color: #000002 } }");
        let tags: Vec<_> = tree
            .roots()
            .iter()
            .filter_map(|&id| tree.get(id).tag.clone())
            .collect();
        assert_eq!(tags, vec!["p"]);

        let mut ctx = CssContext::new();
        ctx.set_media(["print"]);
        let tree = parse_with(&mut ctx, "@media handheld { p { color: red } } @media print { h1 { color: red } }");
        assert_eq!(tree.get(tree.roots()[0]).tag.as_deref(), Some("h1"));
        assert_eq!(tree.roots().len(), 1);
    }

    #[test]
    fn test_attribute_selectors() {
        let tree = parse("input[type=text] { color: red } a[rel~=next] { color: red } p[lang|=en] { color: red } td[nowrap] { color: red }");
        let constraint = |index: usize| match &tree.get(tree.roots()[index]).predicates[0] {
            AttributePredicate::Attribute { constraint, .. } => constraint.clone(),
            AttributePredicate::Lang(_) => panic!("unexpected :lang predicate"),
        };
        assert_eq!(constraint(0), Constraint::Equals("text".to_string()));
        assert_eq!(constraint(1), Constraint::ContainsWord("next".to_string()));
        assert_eq!(constraint(2), Constraint::DashMatch("en".to_string()));
        assert_eq!(constraint(3), Constraint::Present);
    }

    #[test]
    fn test_malformed_attribute_selector() {
        let (mut ctx, codes) = recording_context();
        let tree = parse_with(&mut ctx, "a[=] b { color: red }");
        let a = tree.roots()[0];
        assert!(tree.get(a).illegal);
        assert_eq!(*codes.borrow(), vec![ErrorCode::MalformedSelector]);
    }
}
