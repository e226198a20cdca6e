//! Bounded fetch pool for style sheets and images.
//!
//! Work runs in two strictly ordered phases. Every queued style sheet
//! (including the `@import`s found while parsing fetched ones) is fetched
//! before the image phase may start, and once it has started no style sheet
//! is accepted anymore. Each phase fans out over at most `max_workers`
//! scoped threads; results travel back over a channel and are returned to
//! the calling thread, which alone mutates documents.
//!
//! Images are queued per target. A later request for the same target
//! replaces the earlier URL, and targets waiting for the same URL share one
//! fetch.

mod fetcher;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use serde::Serialize;
use wcss_dom::render::{RenderId, StateMask};

pub use fetcher::{Fetcher, HttpFetcher, StaticFetcher};

use crate::diagnostics::CssError;

/// What a fetch is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    /// An external or imported style sheet.
    Stylesheet,
    /// An image.
    Image,
}

/// Where a fetched image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageTarget {
    /// The renderable's own image (an `img`, a bullet, generated `url()`).
    Foreground(RenderId),
    /// The background image of the given style states.
    Background(RenderId, StateMask),
}

impl ImageTarget {
    /// The renderable receiving the image.
    #[must_use]
    pub const fn renderable(self) -> RenderId {
        match self {
            Self::Foreground(id) | Self::Background(id, _) => id,
        }
    }
}

/// An image asked for by the style applier or the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    /// Absolute URL.
    pub url: String,
    /// Receiver.
    pub target: ImageTarget,
}

/// Shared cancellation flag of a [`ResourceQueue`].
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Cancel the load. Calling it again has no further effect.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A fetched style sheet.
#[derive(Debug)]
pub struct FetchedStylesheet {
    /// Absolute URL, also the base of its relative URLs.
    pub url: String,
    /// Payload or failure.
    pub result: Result<Vec<u8>, CssError>,
}

/// A fetched image and everything waiting for it.
#[derive(Debug)]
pub struct FetchedImage {
    /// Absolute URL.
    pub url: String,
    /// Receivers, in request order.
    pub targets: Vec<ImageTarget>,
    /// Payload or failure.
    pub result: Result<Vec<u8>, CssError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stylesheets,
    Images,
}

/// Pending fetches of one document load.
#[derive(Debug)]
pub struct ResourceQueue {
    max_workers: usize,
    cancel: CancelHandle,
    phase: Phase,
    stylesheets: Vec<String>,
    /// Every style sheet ever queued; stops `@import` cycles.
    seen_stylesheets: HashSet<String>,
    images: Vec<ImageRequest>,
}

impl ResourceQueue {
    /// Default number of concurrent fetches.
    pub const DEFAULT_WORKERS: usize = 2;

    /// An empty queue running at most `max_workers` fetches at once.
    #[must_use]
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            cancel: CancelHandle::default(),
            phase: Phase::Stylesheets,
            stylesheets: Vec::new(),
            seen_stylesheets: HashSet::new(),
            images: Vec::new(),
        }
    }

    /// A handle that cancels this queue from anywhere.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// True once cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Queue a style sheet. Returns false if it was queued before, the load
    /// was cancelled, or the image phase has begun.
    #[must_use]
    pub fn enqueue_stylesheet(&mut self, url: &str) -> bool {
        if self.is_cancelled() || self.phase != Phase::Stylesheets {
            return false;
        }
        if !self.seen_stylesheets.insert(url.to_string()) {
            return false;
        }
        self.stylesheets.push(url.to_string());
        true
    }

    /// Queue an image, replacing any earlier request for the same target.
    /// Returns false if the load was cancelled.
    #[must_use]
    pub fn enqueue_image(&mut self, request: ImageRequest) -> bool {
        if self.is_cancelled() {
            return false;
        }
        match self.images.iter_mut().find(|r| r.target == request.target) {
            Some(existing) => existing.url = request.url,
            None => self.images.push(request),
        }
        true
    }

    /// Style sheets waiting to be fetched.
    #[must_use]
    pub fn pending_stylesheets(&self) -> usize {
        self.stylesheets.len()
    }

    /// Images waiting to be fetched.
    #[must_use]
    pub fn pending_images(&self) -> usize {
        self.images.len()
    }

    /// Fetch every queued style sheet. Sheets queued while handling the
    /// results are fetched by the next call.
    pub fn run_stylesheets<F: Fetcher + ?Sized>(&mut self, fetcher: &F) -> Vec<FetchedStylesheet> {
        let urls = std::mem::take(&mut self.stylesheets);
        fetch_all(fetcher, &urls, ResourceKind::Stylesheet, self.max_workers, &self.cancel)
            .into_iter()
            .map(|(url, result)| FetchedStylesheet { url, result })
            .collect()
    }

    /// Close the style sheet phase and fetch every queued image, one fetch
    /// per distinct URL.
    pub fn run_images<F: Fetcher + ?Sized>(&mut self, fetcher: &F) -> Vec<FetchedImage> {
        self.phase = Phase::Images;
        self.stylesheets.clear();

        let mut groups: Vec<(String, Vec<ImageTarget>)> = Vec::new();
        for request in std::mem::take(&mut self.images) {
            match groups.iter_mut().find(|(url, _)| *url == request.url) {
                Some((_, targets)) => targets.push(request.target),
                None => groups.push((request.url, vec![request.target])),
            }
        }
        let urls: Vec<String> = groups.iter().map(|(url, _)| url.clone()).collect();
        let mut results =
            fetch_all(fetcher, &urls, ResourceKind::Image, self.max_workers, &self.cancel).into_iter();

        let mut fetched = Vec::new();
        for (url, targets) in groups {
            let Some((fetched_url, result)) = results.next() else {
                break;
            };
            debug_assert_eq!(url, fetched_url);
            fetched.push(FetchedImage {
                url,
                targets,
                result,
            });
        }
        fetched
    }

    /// Cancel the load and drop all queued work. Idempotent.
    pub fn discard(&mut self) {
        self.cancel.cancel();
        self.stylesheets.clear();
        self.images.clear();
    }
}

impl Default for ResourceQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORKERS)
    }
}

/// Fetch `urls` on up to `max_workers` threads. Results come back in the
/// order of `urls`; nothing is returned once `cancel` is set.
fn fetch_all<F: Fetcher + ?Sized>(
    fetcher: &F,
    urls: &[String],
    kind: ResourceKind,
    max_workers: usize,
    cancel: &CancelHandle,
) -> Vec<(String, Result<Vec<u8>, CssError>)> {
    if urls.is_empty() || cancel.is_cancelled() {
        return Vec::new();
    }
    let next = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..max_workers.min(urls.len()) {
            let sender = sender.clone();
            let next = &next;
            let _ = scope.spawn(move || {
                loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(url) = urls.get(index) else {
                        break;
                    };
                    if cancel.is_cancelled() {
                        break;
                    }
                    let result = fetcher.fetch(url, kind);
                    // A cancelled load discards what was in flight.
                    if cancel.is_cancelled() || sender.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(sender);

    if cancel.is_cancelled() {
        return Vec::new();
    }
    let mut results: Vec<(usize, Result<Vec<u8>, CssError>)> = receiver.into_iter().collect();
    results.sort_by_key(|&(index, _)| index);
    results
        .into_iter()
        .map(|(index, result)| (urls[index].clone(), result))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheets_are_deduplicated() {
        let mut queue = ResourceQueue::new(2);
        assert!(queue.enqueue_stylesheet("http://h/a.css"));
        assert!(!queue.enqueue_stylesheet("http://h/a.css"));
        assert_eq!(queue.pending_stylesheets(), 1);
    }

    #[test]
    fn test_image_phase_closes_stylesheets() {
        let fetcher = StaticFetcher::new();
        let mut queue = ResourceQueue::new(1);
        let _ = queue.run_images(&fetcher);
        assert!(!queue.enqueue_stylesheet("http://h/late.css"));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut queue = ResourceQueue::default();
        let handle = queue.cancel_handle();
        queue.discard();
        queue.discard();
        handle.cancel();
        assert!(queue.is_cancelled());
        assert!(!queue.enqueue_image(ImageRequest {
            url: "http://h/i.png".to_string(),
            target: ImageTarget::Foreground(RenderId(1)),
        }));
    }
}
