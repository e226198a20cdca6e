//! Integration tests for style application onto renderables.

use wcss_css::{CssContext, SortedSelectors, apply_stylesheets, parse_stylesheet};
use wcss_dom::builder::{BuildOptions, build_render_tree};
use wcss_dom::render::{ListStyleType, NodeFlags, RenderTree, StyleState, TextDecoration};
use wcss_dom::{NodeId, TagTree};

fn style(doc: &mut TagTree, css: &str) -> RenderTree {
    let mut ctx = CssContext::new();
    let mut render = build_render_tree(doc, &BuildOptions::default());
    let sheet = parse_stylesheet(&mut ctx, css, None).unwrap().tree;
    let _ = apply_stylesheets(doc, &mut render, &mut ctx, &SortedSelectors::new(vec![sheet])).unwrap();
    render
}

fn paragraph(doc: &mut TagTree, text: &str) -> NodeId {
    let p = doc.append_element(NodeId::ROOT, "p", []);
    let _ = doc.append_text(p, text);
    p
}

#[test]
fn test_display_none_detaches_box() {
    let mut doc = TagTree::new();
    let body = doc.append_element(NodeId::ROOT, "body", []);
    let hidden = doc.append_element(body, "div", [("class", "ad")]);
    let _ = doc.append_text(hidden, "buy");
    let shown = doc.append_element(body, "div", []);
    let _ = doc.append_text(shown, "read");

    let render = style(&mut doc, ".ad { display: none }");
    let hidden_box = doc.renderables(hidden)[0];
    assert_eq!(render.parent(hidden_box), None);
    assert!(render.parent(doc.renderables(shown)[0]).is_some());
}

#[test]
fn test_visibility_hidden_flags_subtree() {
    let mut doc = TagTree::new();
    let p = paragraph(&mut doc, "secret text");
    let render = style(&mut doc, "p { visibility: hidden }");
    let container = doc.renderables(p)[0];
    for id in render.descendants(container) {
        assert!(render[id].flags.contains(NodeFlags::HIDDEN));
    }
}

#[test]
fn test_visible_child_reenables_hidden_ancestors() {
    let mut doc = TagTree::new();
    let div = doc.append_element(NodeId::ROOT, "div", [("class", "folded")]);
    let p = doc.append_element(div, "p", []);
    let _ = doc.append_text(p, "shown anyway");

    let render = style(&mut doc, ".folded { visibility: hidden } p { visibility: visible }");
    let container = doc.renderables(div)[0];
    let inner = doc.renderables(p)[0];
    assert!(!render[container].flags.intersects(NodeFlags::HIDDEN | NodeFlags::DISABLED));
    for id in render.descendants(inner) {
        assert!(!render[id].flags.intersects(NodeFlags::HIDDEN | NodeFlags::DISABLED));
    }
}

#[test]
fn test_bold_italic_font_reaches_runs() {
    let mut doc = TagTree::new();
    let p = paragraph(&mut doc, "loud words");
    let render = style(&mut doc, "p { font-weight: bold; font-style: italic }");
    let container = doc.renderables(p)[0];
    for id in render.children(container) {
        let font = &render[*id].style(StyleState::Unselected).font;
        assert!(font.bold && font.italic);
    }
}

#[test]
fn test_underline_on_every_word() {
    let mut doc = TagTree::new();
    let p = paragraph(&mut doc, "two words");
    let render = style(&mut doc, "p { text-decoration: underline }");
    let container = doc.renderables(p)[0];
    for id in render.children(container) {
        let decoration = render[*id].style(StyleState::Unselected).decoration;
        assert!(decoration.contains(TextDecoration::UNDERLINE));
    }
}

#[test]
fn test_list_style_type_on_list() {
    let mut doc = TagTree::new();
    let ol = doc.append_element(NodeId::ROOT, "ol", []);
    for text in ["a", "b", "c"] {
        let li = doc.append_element(ol, "li", []);
        let _ = doc.append_text(li, text);
    }
    let render = style(&mut doc, "ol { list-style-type: lower-alpha }");
    let markers: Vec<_> = render
        .descendants(doc.renderables(ol)[0])
        .into_iter()
        .filter_map(|id| render[id].list_marker.clone())
        .collect();
    assert_eq!(markers.len(), 3);
    assert!(markers.iter().all(|m| m.style == ListStyleType::LowerAlpha));
}

#[test]
fn test_background_color_is_opaque() {
    let mut doc = TagTree::new();
    let p = paragraph(&mut doc, "x");
    let render = style(&mut doc, "p { background-color: #123456 }");
    let style = render[doc.renderables(p)[0]].style(StyleState::Selected);
    assert_eq!(style.bg_color, Some(0x123456));
    assert_eq!(style.bg_transparency, 255);
}

#[cfg(feature = "css2")]
mod css2 {
    use super::*;
    use wcss_dom::render::RenderId;

    fn texts(render: &RenderTree, ids: &[RenderId]) -> Vec<String> {
        ids.iter().filter_map(|&id| render[id].text.clone()).collect()
    }

    #[test]
    fn test_nowrap_then_uppercase() {
        let mut doc = TagTree::new();
        let p = paragraph(&mut doc, "keep these together");
        let render = style(&mut doc, "p { white-space: nowrap; text-transform: uppercase }");
        let container = doc.renderables(p)[0];
        assert_eq!(texts(&render, render.children(container)), vec!["KEEP THESE TOGETHER"]);
    }

    #[test]
    fn test_generated_marker_before_text() {
        let mut doc = TagTree::new();
        let p = paragraph(&mut doc, "note");
        let render = style(&mut doc, "p:before { content: '>' }");
        let container = doc.renderables(p)[0];
        assert_eq!(texts(&render, render.children(container)), vec![">", "note"]);
    }

    #[test]
    fn test_counters_number_items() {
        let mut doc = TagTree::new();
        let body = doc.append_element(NodeId::ROOT, "body", []);
        let headings: Vec<_> = ["One", "Two"]
            .into_iter()
            .map(|text| {
                let h3 = doc.append_element(body, "h3", []);
                let _ = doc.append_text(h3, text);
                h3
            })
            .collect();
        let render = style(
            &mut doc,
            "body { counter-reset: section } \
             h3 { counter-increment: section } \
             h3:before { content: counter(section) }",
        );
        for (heading, number) in headings.into_iter().zip(["1", "2"]) {
            let container = doc.renderables(heading)[0];
            assert_eq!(texts(&render, render.children(container))[0], number);
        }
    }
}
