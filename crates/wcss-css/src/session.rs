//! End-to-end styling of one document.
//!
//! [`style_document`] drives a load in the order the engine requires:
//! collect the document's sheets, fetch external sheets (and whatever they
//! `@import`) until none are pending, run the cascade, then fetch images and
//! attach them. Fetching happens on the resource queue's workers; every
//! mutation of the document happens here, on the calling thread.

use serde::Serialize;
use wcss_common::url::resolve_url;
use wcss_common::warning::clear_warnings;
use wcss_dom::render::{ImageData, ImageFormat, ImageSlot, RenderTree};
use wcss_dom::{HtmlAttr, HtmlTag, NodeId, TagTree};

use crate::cascade::{SortedSelectors, apply_stylesheets};
use crate::context::CssContext;
use crate::diagnostics::{CssError, Diagnostic, ErrorCode};
use crate::parser::{parse_external_stylesheet, parse_stylesheet};
use crate::resources::{FetchedImage, Fetcher, ImageRequest, ImageTarget, ResourceQueue};
use crate::selector::SelectorTree;

/// Knobs of one styling run.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Concurrent fetches per phase.
    pub max_workers: usize,
    /// Extra sheets applied after the document's own, as embedded sheets.
    pub user_sheets: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_workers: ResourceQueue::DEFAULT_WORKERS,
            user_sheets: Vec::new(),
        }
    }
}

/// What a styling run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleReport {
    /// External and imported sheets fetched and parsed.
    pub external_sheets: usize,
    /// `<style>` elements and user sheets parsed.
    pub embedded_sheets: usize,
    /// Rules in the sorted cascade.
    pub rules: usize,
    /// Images requested, counted per receiver.
    pub images_requested: usize,
    /// Images attached, counted per receiver.
    pub images_attached: usize,
    /// URLs that could not be fetched or decoded.
    pub failed: Vec<String>,
}

/// Style `doc` and its render tree.
///
/// The context's base URL is taken from the first `<base href>` unless one
/// is set already. Counters, quote nesting and deduplicated warnings are
/// reset for the new document.
///
/// # Errors
///
/// Returns [`CssError::Aborted`] when the diagnostics handler asks to stop.
/// Fetch failures are diagnostics, not errors.
pub fn style_document<F: Fetcher + ?Sized>(
    doc: &mut TagTree,
    render: &mut RenderTree,
    ctx: &mut CssContext,
    fetcher: &F,
    options: &SessionOptions,
) -> Result<StyleReport, CssError> {
    clear_warnings();
    let mut report = StyleReport::default();
    let mut queue = ResourceQueue::new(options.max_workers);

    if ctx.base_url().is_none() {
        let base = document_base(doc);
        ctx.set_base_url(base);
    }

    let mut embedded = Vec::new();
    for node in doc.descendants(doc.root()) {
        let Some(element) = doc.as_element(node) else {
            continue;
        };
        match element.tag {
            HtmlTag::Link if is_stylesheet_link(doc, node) => {
                let href = element.attr(&HtmlAttr::Href).unwrap_or_default();
                if href.trim().is_empty()
                    || !ctx.media_matches(element.attr(&HtmlAttr::Media).unwrap_or_default())
                {
                    continue;
                }
                match resolve_url(href, ctx.base_url()) {
                    Some(url) => {
                        let _ = queue.enqueue_stylesheet(&url);
                    }
                    None => ctx.report(
                        &Diagnostic::new(
                            ErrorCode::NoBaseUrl,
                            "link",
                            format!("Cannot resolve style sheet '{href}' without a base URL."),
                        )
                        .with_attribute("href")
                        .with_value(href),
                    )?,
                }
            }
            HtmlTag::Style => {
                if !ctx.media_matches(element.attr(&HtmlAttr::Media).unwrap_or_default()) {
                    continue;
                }
                let text = element_text(doc, node);
                let parsed = parse_stylesheet(ctx, &text, None)?;
                for import in &parsed.imports {
                    let _ = queue.enqueue_stylesheet(import);
                }
                embedded.push(parsed.tree);
            }
            _ => {}
        }
    }

    let external = fetch_stylesheets(&mut queue, ctx, fetcher, &mut report)?;
    for text in &options.user_sheets {
        embedded.push(parse_stylesheet(ctx, text, None)?.tree);
    }
    report.external_sheets = external.len();
    report.embedded_sheets = embedded.len();

    let sheets: Vec<SelectorTree> = external.into_iter().chain(embedded).collect();
    let sorted = SortedSelectors::new(sheets);
    report.rules = sorted.rules().len();
    let styled = apply_stylesheets(doc, render, ctx, &sorted)?;

    let mut requests = if ctx.show_images() {
        image_elements(doc, render, ctx)?
    } else {
        Vec::new()
    };
    requests.extend(styled);
    for request in requests {
        if queue.enqueue_image(request) {
            report.images_requested += 1;
        }
    }
    for fetched in queue.run_images(fetcher) {
        attach_image(render, ctx, fetched, &mut report)?;
    }
    Ok(report)
}

/// `href` of the first `<base>` element.
fn document_base(doc: &TagTree) -> Option<String> {
    doc.descendants(doc.root()).find_map(|node| {
        let element = doc.as_element(node)?;
        if element.tag != HtmlTag::Base {
            return None;
        }
        element.attr(&HtmlAttr::Href).map(str::to_string)
    })
}

fn is_stylesheet_link(doc: &TagTree, node: NodeId) -> bool {
    doc.as_element(node)
        .and_then(|element| element.attr(&HtmlAttr::Rel))
        .is_some_and(|rel| {
            rel.split_whitespace()
                .any(|kind| kind.eq_ignore_ascii_case("stylesheet"))
        })
}

/// Concatenated text children of an element.
fn element_text(doc: &TagTree, node: NodeId) -> String {
    doc.children(node)
        .iter()
        .filter_map(|&child| doc.as_text(child))
        .collect()
}

/// Fetch queued sheets until none are pending. Sheets come back in the
/// order they were queued; imports found in a round are fetched by the next.
fn fetch_stylesheets<F: Fetcher + ?Sized>(
    queue: &mut ResourceQueue,
    ctx: &mut CssContext,
    fetcher: &F,
    report: &mut StyleReport,
) -> Result<Vec<SelectorTree>, CssError> {
    let mut sheets = Vec::new();
    while queue.pending_stylesheets() > 0 && !queue.is_cancelled() {
        for fetched in queue.run_stylesheets(fetcher) {
            let bytes = match fetched.result {
                Ok(bytes) => bytes,
                Err(err) => {
                    ctx.report(&Diagnostic::new(
                        ErrorCode::ResourceNotFound,
                        fetched.url.as_str(),
                        format!("Style sheet '{}' could not be loaded: {err}", fetched.url),
                    ))?;
                    report.failed.push(fetched.url);
                    continue;
                }
            };
            let parsed = parse_external_stylesheet(ctx, &bytes, &fetched.url)?;
            for import in &parsed.imports {
                let _ = queue.enqueue_stylesheet(import);
            }
            sheets.push(parsed.tree);
        }
    }
    Ok(sheets)
}

/// Foreground requests for every `img` with a resolvable `src`. The slot's
/// `src` is made absolute on the way.
fn image_elements(
    doc: &TagTree,
    render: &mut RenderTree,
    ctx: &mut CssContext,
) -> Result<Vec<ImageRequest>, CssError> {
    let mut requests = Vec::new();
    for node in doc.descendants(doc.root()) {
        if !doc.as_element(node).is_some_and(|element| element.tag == HtmlTag::Img) {
            continue;
        }
        let Some(&ui) = doc.renderables(node).first() else {
            continue;
        };
        let Some(slot) = render[ui].image.as_mut() else {
            continue;
        };
        if slot.src.is_empty() {
            continue;
        }
        let Some(url) = resolve_url(&slot.src, ctx.base_url()) else {
            let src = slot.src.clone();
            ctx.report(
                &Diagnostic::new(
                    ErrorCode::NoBaseUrl,
                    "img",
                    format!("Cannot resolve image '{src}' without a base URL."),
                )
                .with_attribute("src")
                .with_value(src),
            )?;
            continue;
        };
        slot.src.clone_from(&url);
        requests.push(ImageRequest {
            url,
            target: ImageTarget::Foreground(ui),
        });
    }
    Ok(requests)
}

/// Hand a fetched image to everything waiting for it. Failures leave the
/// receivers as they were, alt text included.
fn attach_image(
    render: &mut RenderTree,
    ctx: &mut CssContext,
    fetched: FetchedImage,
    report: &mut StyleReport,
) -> Result<(), CssError> {
    let bytes = match fetched.result {
        Ok(bytes) => bytes,
        Err(err) => {
            ctx.report(&Diagnostic::new(
                ErrorCode::ResourceNotFound,
                fetched.url.as_str(),
                format!("Image '{}' could not be loaded: {err}", fetched.url),
            ))?;
            report.failed.push(fetched.url);
            return Ok(());
        }
    };
    let Some(format) = ImageFormat::sniff(&bytes) else {
        ctx.report(&Diagnostic::new(
            ErrorCode::ResourceBadFormat,
            fetched.url.as_str(),
            format!("'{}' is not a supported image.", fetched.url),
        ))?;
        report.failed.push(fetched.url);
        return Ok(());
    };

    let data = ImageData {
        url: fetched.url.clone(),
        format,
        byte_len: bytes.len(),
    };
    for target in fetched.targets {
        match target {
            ImageTarget::Foreground(ui) => {
                let slot = render[ui].image.get_or_insert_with(|| ImageSlot {
                    src: fetched.url.clone(),
                    ..ImageSlot::default()
                });
                slot.data = Some(data.clone());
            }
            ImageTarget::Background(ui, mask) => {
                for state in mask.states() {
                    render[ui].style_mut(state).background.image = Some(data.clone());
                }
            }
        }
        report.images_attached += 1;
    }
    Ok(())
}
