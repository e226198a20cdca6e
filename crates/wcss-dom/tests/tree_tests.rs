//! Integration tests for the tag tree and the default render builder.

use wcss_dom::builder::{BuildOptions, build_render_tree};
use wcss_dom::render::{ListStyleType, RenderKind, RenderTree};
use wcss_dom::{HtmlAttr, NodeId, TagTree};

#[test]
fn test_sibling_links() {
    let mut tree = TagTree::new();
    let ul = tree.append_element(NodeId::ROOT, "ul", []);
    let li1 = tree.append_element(ul, "li", []);
    let text = tree.append_text(ul, " ");
    let li2 = tree.append_element(ul, "li", []);

    assert_eq!(tree.next_sibling(li1), Some(text));
    assert_eq!(tree.prev_sibling(li2), Some(text));
    assert!(tree.is_first_element_child(li1));
    assert!(!tree.is_first_element_child(li2));
    assert!(!tree.is_first_element_child(text));
}

#[test]
fn test_lang_is_inherited() {
    let mut tree = TagTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", [("lang", "en-GB")]);
    let body = tree.append_element(html, "body", []);
    let p = tree.append_element(body, "p", [("LANG", "fr")]);
    let span = tree.append_element(body, "span", []);

    assert_eq!(tree.lang(p), Some("fr"));
    assert_eq!(tree.lang(span), Some("en-GB"));
    assert_eq!(tree.as_element(p).unwrap().attr(&HtmlAttr::Lang), Some("fr"));
}

#[test]
fn test_multi_class_match() {
    let mut tree = TagTree::new();
    let p = tree.append_element(NodeId::ROOT, "p", [("class", "note warn big")]);
    let element = tree.as_element(p).unwrap();

    assert!(element.has_classes("warn"));
    assert!(element.has_classes("big.note"));
    assert!(!element.has_classes("war"));
    assert!(!element.has_classes("warn.small"));
}

#[test]
fn test_list_item_structure() {
    let mut doc = TagTree::new();
    let ol = doc.append_element(NodeId::ROOT, "ol", []);
    let _ = doc.append_element(ol, "li", []);
    let li = doc.append_element(ol, "li", []);
    let _ = doc.append_text(li, "second");
    let tree = build_render_tree(&mut doc, &BuildOptions::default());

    let content = doc.renderables(li)[0];
    let row = tree.parent(content).unwrap();
    let holder = tree.children(row)[0];
    let bullet = tree.children(holder)[0];
    let marker = tree[bullet].list_marker.as_ref().unwrap();
    assert_eq!(marker.style, ListStyleType::Decimal);
    assert_eq!(marker.ordinal, 2);
}

#[test]
fn test_table_wrapper_holds_caption_first() {
    let mut doc = TagTree::new();
    let table = doc.append_element(NodeId::ROOT, "table", [("border", "1")]);
    let tr = doc.append_element(table, "tr", []);
    let td = doc.append_element(tr, "td", []);
    let _ = doc.append_text(td, "cell");
    let caption = doc.append_element(table, "caption", []);
    let _ = doc.append_text(caption, "Title");
    let tree = build_render_tree(&mut doc, &BuildOptions::default());

    let table_id = doc.renderables(table)[0];
    assert_eq!(tree[table_id].kind, RenderKind::Table);
    let wrapper = tree.parent(table_id).unwrap();
    assert_eq!(tree.children(wrapper)[0], doc.renderables(caption)[0]);
    assert_eq!(tree.children(wrapper)[1], table_id);
}

#[test]
fn test_head_elements_have_no_renderables() {
    let mut doc = TagTree::new();
    let html = doc.append_element(NodeId::ROOT, "html", []);
    let head = doc.append_element(html, "head", []);
    let style = doc.append_element(head, "style", []);
    let _ = doc.append_text(style, "p { color: red }");
    let tree = build_render_tree(&mut doc, &BuildOptions::default());

    assert!(doc.renderables(head).is_empty());
    assert!(doc.renderables(style).is_empty());
    let html_box = doc.renderables(html)[0];
    assert!(tree.children(html_box).is_empty());
    assert_eq!(tree.parent(html_box), Some(RenderTree::ROOT));
}

#[test]
fn test_quotes_alternate_when_nested() {
    let mut doc = TagTree::new();
    let p = doc.append_element(NodeId::ROOT, "p", []);
    let outer = doc.append_element(p, "q", []);
    let inner = doc.append_element(outer, "q", []);
    let _ = doc.append_text(inner, "x");
    let tree = build_render_tree(&mut doc, &BuildOptions::default());

    let outer_runs = doc.renderables(outer);
    let quotes: Vec<_> = outer_runs.iter().map(|&r| tree[r].quote).collect();
    assert_eq!(quotes, vec![Some(0), Some(2), None, Some(3), Some(1)]);
    assert_eq!(tree[outer_runs[1]].text.as_deref(), Some("'"));
}
