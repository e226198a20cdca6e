//! Fetch collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use wcss_common::net;

use super::ResourceKind;
use crate::diagnostics::CssError;

/// Retrieves the bytes behind an absolute URL.
///
/// Implementations are called from worker threads and must be shareable.
pub trait Fetcher: Send + Sync {
    /// Fetch `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CssError::Fetch`] when the resource cannot be retrieved.
    fn fetch(&self, url: &str, kind: ResourceKind) -> Result<Vec<u8>, CssError>;
}

impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    fn fetch(&self, url: &str, kind: ResourceKind) -> Result<Vec<u8>, CssError> {
        (**self).fetch(url, kind)
    }
}

/// Fetches over HTTP(S), and `file:` URLs from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, _kind: ResourceKind) -> Result<Vec<u8>, CssError> {
        let bytes = if url.starts_with("file:") {
            net::read_file_url(url)
        } else {
            net::fetch_bytes(url)
        };
        bytes.map_err(CssError::Fetch)
    }
}

/// In-memory fetcher for tests and offline use. Records every request.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    resources: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// An empty fetcher; every request fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// Serve `bytes` for `url`, replacing any earlier entry.
    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let _ = self.resources.insert(url.into(), bytes.into());
    }

    /// URLs requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str, _kind: ResourceKind) -> Result<Vec<u8>, CssError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        self.resources
            .get(url)
            .cloned()
            .ok_or_else(|| CssError::Fetch(format!("no resource at {url}")))
    }
}
