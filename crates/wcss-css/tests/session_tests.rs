//! End-to-end tests: collecting, fetching and applying a document's sheets.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wcss_css::{
    CssContext, CssError, Fetcher, ImageRequest, ImageTarget, ResourceKind, ResourceQueue,
    SessionOptions, StaticFetcher, style_document,
};
use wcss_dom::builder::{BuildOptions, build_render_tree};
use wcss_dom::render::{RenderId, StyleState};
use wcss_dom::{NodeId, TagTree};

const BASE: &str = "http://wap.example.com/news/";

/// A document linking `sheets` in its head, with one paragraph.
fn document(sheets: &[&str]) -> (TagTree, NodeId) {
    let mut doc = TagTree::new();
    let html = doc.append_element(NodeId::ROOT, "html", []);
    let head = doc.append_element(html, "head", []);
    let _ = doc.append_element(head, "base", [("href", BASE)]);
    for href in sheets {
        let _ = doc.append_element(head, "link", [("rel", "stylesheet"), ("href", href)]);
    }
    let body = doc.append_element(html, "body", []);
    let p = doc.append_element(body, "p", [("class", "lead")]);
    let _ = doc.append_text(p, "Headline");
    (doc, p)
}

fn color(doc: &mut TagTree, p: NodeId, fetcher: &StaticFetcher, options: &SessionOptions) -> Option<u32> {
    let mut render = build_render_tree(doc, &BuildOptions::default());
    let _ = style_document(doc, &mut render, &mut CssContext::new(), fetcher, options).unwrap();
    render[doc.renderables(p)[0]].style(StyleState::Unselected).fg_color
}

#[test]
fn test_import_cycle_fetches_each_sheet_once() {
    let (mut doc, p) = document(&["a.css"]);
    let fetcher = StaticFetcher::new()
        .with(format!("{BASE}a.css"), "@import 'b.css'; p { color: #00000a }")
        .with(format!("{BASE}b.css"), "@import 'a.css'; p.lead { color: #00000b }");

    assert_eq!(color(&mut doc, p, &fetcher, &SessionOptions::default()), Some(0x00000b));
    assert_eq!(
        fetcher.requests(),
        vec![format!("{BASE}a.css"), format!("{BASE}b.css")]
    );
}

#[test]
fn test_latin1_sheet_is_decoded() {
    let (mut doc, p) = document(&["latin.css"]);
    let fetcher = StaticFetcher::new().with(
        format!("{BASE}latin.css"),
        b"@charset \"ISO-8859-1\"; /* caf\xE9 */ p { color: #0000ee }".to_vec(),
    );
    assert_eq!(color(&mut doc, p, &fetcher, &SessionOptions::default()), Some(0x0000ee));
}

#[test]
fn test_user_sheet_overrides_document() {
    let (mut doc, p) = document(&["site.css"]);
    let fetcher = StaticFetcher::new().with(format!("{BASE}site.css"), "p.lead { color: #000001 }");
    let options = SessionOptions {
        user_sheets: vec!["p.lead { color: #000002 }".to_string()],
        ..SessionOptions::default()
    };
    assert_eq!(color(&mut doc, p, &fetcher, &options), Some(0x000002));
}

#[test]
fn test_report_counts() {
    let (mut doc, _) = document(&["site.css", "missing.css"]);
    let fetcher = StaticFetcher::new().with(format!("{BASE}site.css"), "p { color: red } h1 { color: red }");
    let mut render = build_render_tree(&mut doc, &BuildOptions::default());
    let mut ctx = CssContext::new();
    ctx.set_handler(|_| true);
    let report = style_document(&mut doc, &mut render, &mut ctx, &fetcher, &SessionOptions::default()).unwrap();
    assert_eq!(report.external_sheets, 1);
    assert_eq!(report.rules, 2);
    assert_eq!(report.failed, vec![format!("{BASE}missing.css")]);
    assert_eq!(ctx.base_url(), Some(BASE));
}

#[test]
fn test_refusing_handler_stops_the_load() {
    let (mut doc, _) = document(&["missing.css"]);
    let mut render = build_render_tree(&mut doc, &BuildOptions::default());
    let mut ctx = CssContext::new();
    ctx.set_handler(|_| false);
    let result = style_document(
        &mut doc,
        &mut render,
        &mut ctx,
        &StaticFetcher::new(),
        &SessionOptions::default(),
    );
    assert!(matches!(result, Err(CssError::Aborted { .. })));
}

/// Counts calls and how many run at once.
#[derive(Default)]
struct CountingFetcher {
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl Fetcher for CountingFetcher {
    fn fetch(&self, _url: &str, _kind: ResourceKind) -> Result<Vec<u8>, CssError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.peak.fetch_max(now, Ordering::SeqCst);
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let _ = self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(b"GIF89a".to_vec())
    }
}

#[test]
fn test_pool_never_exceeds_worker_limit() {
    let fetcher = Arc::new(CountingFetcher::default());
    let mut queue = ResourceQueue::new(2);
    for i in 0..6 {
        assert!(queue.enqueue_image(ImageRequest {
            url: format!("http://h/{i}.gif"),
            target: ImageTarget::Foreground(RenderId(i + 1)),
        }));
    }
    let fetched = queue.run_images(&fetcher);
    assert_eq!(fetched.len(), 6);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 6);
    assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
}

#[test]
fn test_same_url_is_fetched_once_for_all_targets() {
    let fetcher = StaticFetcher::new().with("http://h/dot.gif", b"GIF89a".to_vec());
    let mut queue = ResourceQueue::new(3);
    for id in [1, 2, 3] {
        let _ = queue.enqueue_image(ImageRequest {
            url: "http://h/dot.gif".to_string(),
            target: ImageTarget::Foreground(RenderId(id)),
        });
    }
    let fetched = queue.run_images(&fetcher);
    assert_eq!(fetcher.requests().len(), 1);
    assert_eq!(fetched[0].targets.len(), 3);
}

#[test]
fn test_later_request_for_target_replaces_url() {
    let fetcher = StaticFetcher::new();
    let mut queue = ResourceQueue::default();
    let target = ImageTarget::Foreground(RenderId(4));
    let _ = queue.enqueue_image(ImageRequest {
        url: "http://h/old.png".to_string(),
        target,
    });
    let _ = queue.enqueue_image(ImageRequest {
        url: "http://h/new.png".to_string(),
        target,
    });
    assert_eq!(queue.pending_images(), 1);
    let _ = queue.run_images(&fetcher);
    assert_eq!(fetcher.requests(), vec!["http://h/new.png".to_string()]);
}

#[test]
fn test_cancelled_queue_returns_nothing() {
    let fetcher = StaticFetcher::new().with("http://h/a.css", "p{}");
    let mut queue = ResourceQueue::default();
    assert!(queue.enqueue_stylesheet("http://h/a.css"));
    queue.cancel_handle().cancel();
    assert!(queue.run_stylesheets(&fetcher).is_empty());
    assert!(fetcher.requests().is_empty());
}
