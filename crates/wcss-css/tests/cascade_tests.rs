//! Integration tests for the cascade walk and specificity ordering.

use wcss_css::{CssContext, SortedSelectors, apply_stylesheets, parse_stylesheet};
use wcss_dom::builder::{BuildOptions, build_render_tree};
use wcss_dom::render::{RenderTree, Style, StyleState};
use wcss_dom::{NodeId, TagTree};

/// Style `doc` with `sheets`, given in cascade order.
fn style(doc: &mut TagTree, sheets: &[&str]) -> RenderTree {
    let mut ctx = CssContext::new();
    let mut render = build_render_tree(doc, &BuildOptions::default());
    let trees = sheets
        .iter()
        .map(|css| parse_stylesheet(&mut ctx, css, None).unwrap().tree)
        .collect();
    let sorted = SortedSelectors::new(trees);
    let _ = apply_stylesheets(doc, &mut render, &mut ctx, &sorted).unwrap();
    render
}

fn unselected<'a>(render: &'a RenderTree, doc: &TagTree, node: NodeId) -> &'a Style {
    render[doc.renderables(node)[0]].style(StyleState::Unselected)
}

#[test]
fn test_class_selector_colors_paragraph() {
    let mut doc = TagTree::new();
    let body = doc.append_element(NodeId::ROOT, "body", []);
    let warn = doc.append_element(body, "p", [("class", "warn")]);
    let _ = doc.append_text(warn, "Careful");
    let plain = doc.append_element(body, "p", []);
    let _ = doc.append_text(plain, "Fine");

    let render = style(&mut doc, &["p.warn { color: green }"]);
    assert_eq!(unselected(&render, &doc, warn).fg_color, Some(0x008000));
    assert_eq!(unselected(&render, &doc, plain).fg_color, None);
}

#[test]
fn test_class_beats_tag_selector() {
    let mut doc = TagTree::new();
    let p = doc.append_element(NodeId::ROOT, "p", [("class", "warn")]);
    let _ = doc.append_text(p, "Hi");
    let render = style(&mut doc, &["p {color: #ff0000} p.warn {color: #00ff00}"]);
    assert_eq!(unselected(&render, &doc, p).fg_color, Some(0x00ff00));
}

#[test]
fn test_higher_specificity_wins_regardless_of_order() {
    let mut doc = TagTree::new();
    let p = doc.append_element(NodeId::ROOT, "p", [("id", "lead"), ("class", "note")]);
    let _ = doc.append_text(p, "x");

    let render = style(
        &mut doc,
        &["#lead { color: #000003 } p.note { color: #000002 } p { color: #000001 }"],
    );
    assert_eq!(unselected(&render, &doc, p).fg_color, Some(0x000003));
}

#[test]
fn test_equal_specificity_later_rule_wins() {
    let mut doc = TagTree::new();
    let p = doc.append_element(NodeId::ROOT, "p", [("class", "a b")]);
    let _ = doc.append_text(p, "x");

    let render = style(&mut doc, &[".a { color: #000001 } .b { color: #000002 }"]);
    assert_eq!(unselected(&render, &doc, p).fg_color, Some(0x000002));

    let mut doc = TagTree::new();
    let p = doc.append_element(NodeId::ROOT, "p", [("class", "a b")]);
    let _ = doc.append_text(p, "x");
    let render = style(&mut doc, &[".b { color: #000002 }", ".a { color: #000001 }"]);
    assert_eq!(unselected(&render, &doc, p).fg_color, Some(0x000001));
}

#[test]
fn test_child_combinator_needs_direct_parent() {
    let mut doc = TagTree::new();
    let div = doc.append_element(NodeId::ROOT, "div", []);
    let direct = doc.append_element(div, "p", []);
    let _ = doc.append_text(direct, "direct");
    let blockquote = doc.append_element(div, "blockquote", []);
    let nested = doc.append_element(blockquote, "p", []);
    let _ = doc.append_text(nested, "nested");

    let render = style(&mut doc, &["div > p { color: #0000ff } div p { background-color: #ffff00 }"]);
    assert_eq!(unselected(&render, &doc, direct).fg_color, Some(0x0000ff));
    assert_eq!(unselected(&render, &doc, nested).fg_color, None);
    assert_eq!(unselected(&render, &doc, nested).bg_color, Some(0xffff00));
    assert_eq!(unselected(&render, &doc, direct).bg_color, Some(0xffff00));
}

#[test]
fn test_margins_in_pixels_and_ems() {
    let mut doc = TagTree::new();
    let div = doc.append_element(NodeId::ROOT, "div", []);
    let render = style(&mut doc, &["div { margin: 3px 1em }"]);
    let margin = unselected(&render, &doc, div).margin;
    let font_height = unselected(&render, &doc, div).font.height();
    assert_eq!(margin.top, 3);
    assert_eq!(margin.bottom, 3);
    assert_eq!(margin.left, font_height);
    assert_eq!(margin.right, font_height);
}

#[cfg(feature = "css2")]
mod css2 {
    use super::*;

    #[test]
    fn test_bordered_table_cells() {
        let mut doc = TagTree::new();
        let bordered = doc.append_element(NodeId::ROOT, "table", [("border", "1")]);
        let row = doc.append_element(bordered, "tr", []);
        let cell = doc.append_element(row, "td", []);
        let _ = doc.append_text(cell, "1");
        let plain = doc.append_element(NodeId::ROOT, "table", []);
        let row = doc.append_element(plain, "tr", []);
        let plain_cell = doc.append_element(row, "td", []);
        let _ = doc.append_text(plain_cell, "2");

        let render = style(
            &mut doc,
            &["table[border] td { border-width: thin; border-style: solid }"],
        );
        let border = unselected(&render, &doc, cell).border.clone().unwrap();
        assert_eq!(border.top.map(|side| side.width), Some(1));
        assert_eq!(border.left.map(|side| side.width), Some(1));
        assert!(unselected(&render, &doc, plain_cell).border.is_none());
    }

    #[test]
    fn test_malformed_selector_never_matches() {
        let mut doc = TagTree::new();
        let a = doc.append_element(NodeId::ROOT, "a", [("href", "/")]);
        let b = doc.append_element(a, "b", []);
        let _ = doc.append_text(b, "bold");

        let render = style(&mut doc, &["a[=] b { color: #ff0000 }"]);
        assert_eq!(unselected(&render, &doc, b).fg_color, None);
    }

    #[test]
    fn test_first_child() {
        let mut doc = TagTree::new();
        let ul = doc.append_element(NodeId::ROOT, "ul", []);
        let first = doc.append_element(ul, "li", []);
        let _ = doc.append_text(first, "one");
        let second = doc.append_element(ul, "li", []);
        let _ = doc.append_text(second, "two");

        let render = style(&mut doc, &["li:first-child { background-color: #00ff00 }"]);
        assert_eq!(unselected(&render, &doc, first).bg_color, Some(0x00ff00));
        assert_eq!(unselected(&render, &doc, second).bg_color, None);
    }

    #[test]
    fn test_media_handheld_beats_print() {
        let mut doc = TagTree::new();
        let body = doc.append_element(NodeId::ROOT, "body", []);
        let _ = doc.append_text(body, "text");
        let render = style(
            &mut doc,
            &["@media handheld { body { background-color: #000000 } } \
               @media print { body { background-color: #ffffff } }"],
        );
        assert_eq!(unselected(&render, &doc, body).bg_color, Some(0x000000));
    }

    #[test]
    fn test_attribute_value_matching() {
        let mut doc = TagTree::new();
        let exact = doc.append_element(NodeId::ROOT, "p", [("title", "test"), ("class", "foo bar")]);
        let longer = doc.append_element(NodeId::ROOT, "p", [("title", "testing"), ("class", "bar foo")]);
        let joined = doc.append_element(NodeId::ROOT, "p", [("class", "foobar")]);
        for p in [exact, longer, joined] {
            let _ = doc.append_text(p, "x");
        }

        let render = style(
            &mut doc,
            &["p[title=test] { color: #000001 } p[class~=foo] { background-color: #000002 }"],
        );
        assert_eq!(unselected(&render, &doc, exact).fg_color, Some(0x000001));
        assert_eq!(unselected(&render, &doc, longer).fg_color, None);
        assert_eq!(unselected(&render, &doc, exact).bg_color, Some(0x000002));
        assert_eq!(unselected(&render, &doc, longer).bg_color, Some(0x000002));
        assert_eq!(unselected(&render, &doc, joined).bg_color, None);
    }
}
