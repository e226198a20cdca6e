//! Per-document styling context.
//!
//! Everything the parser and applier need beyond the document itself lives
//! here: supported media, the base URL, the viewport used for percentages,
//! registered fonts, counters, quote nesting, visited links, named access
//! keys and the diagnostics handler. One context is created per document
//! load and passed down explicitly.

use std::collections::{HashMap, HashSet};
use std::fmt;

use wcss_dom::render::Font;

use crate::config::Viewport;
use crate::diagnostics::{CssError, Diagnostic, DiagnosticHandler, dispatch};

/// Family name selected by `font-variant: small-caps`.
pub const SMALL_CAPS_FAMILY: &str = "smallcaps";

/// Registered fonts and a cache of resolved requests.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: Vec<Font>,
    cache: HashMap<Font, Font>,
}

impl FontTable {
    /// An empty table. Requests then resolve to themselves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an available font.
    pub fn register(&mut self, font: Font) {
        self.cache.clear();
        self.fonts.push(font);
    }

    /// True if some registered font has this family.
    #[must_use]
    pub fn has_family(&self, family: &str) -> bool {
        self.fonts.iter().any(|f| f.family.eq_ignore_ascii_case(family))
    }

    /// The registered font closest to `request`.
    ///
    /// A family mismatch costs 30, each pixel of size difference 5, and a
    /// bold or italic mismatch 10. Ties go to the earlier registration.
    pub fn resolve(&mut self, request: &Font) -> Font {
        if self.fonts.is_empty() {
            return request.clone();
        }
        if let Some(hit) = self.cache.get(request) {
            return hit.clone();
        }
        let best = self
            .fonts
            .iter()
            .min_by_key(|font| Self::distance(font, request))
            .cloned()
            .unwrap_or_else(|| request.clone());
        let _ = self.cache.insert(request.clone(), best.clone());
        best
    }

    fn distance(font: &Font, request: &Font) -> i32 {
        let mut score = (font.size - request.size).abs() * 5;
        if !font.family.eq_ignore_ascii_case(&request.family) {
            score += 30;
        }
        if font.bold != request.bold {
            score += 10;
        }
        if font.italic != request.italic {
            score += 10;
        }
        score
    }
}

/// Explicit context for styling one document.
pub struct CssContext {
    media: Vec<String>,
    base_url: Option<String>,
    viewport: Viewport,
    show_images: bool,
    fonts: FontTable,
    counters: HashMap<String, i32>,
    quote_depth: u32,
    visited: HashSet<String>,
    special_keys: HashMap<String, u32>,
    handler: Option<DiagnosticHandler>,
}

impl fmt::Debug for CssContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssContext")
            .field("media", &self.media)
            .field("base_url", &self.base_url)
            .field("viewport", &self.viewport)
            .field("show_images", &self.show_images)
            .field("fonts", &self.fonts)
            .field("counters", &self.counters)
            .field("quote_depth", &self.quote_depth)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for CssContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CssContext {
    /// A context with media `all` and `handheld`, a 240x320 viewport and
    /// images enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            media: vec!["all".to_string(), "handheld".to_string()],
            base_url: None,
            viewport: Viewport::default(),
            show_images: true,
            fonts: FontTable::new(),
            counters: HashMap::new(),
            quote_depth: 0,
            visited: HashSet::new(),
            special_keys: HashMap::new(),
            handler: None,
        }
    }

    /// Install the diagnostics handler. Returning `false` from it aborts
    /// the current operation.
    pub fn set_handler(&mut self, handler: impl FnMut(&Diagnostic) -> bool + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Remove the diagnostics handler; diagnostics become warnings.
    pub fn clear_handler(&mut self) {
        self.handler = None;
    }

    /// Offer a diagnostic to the handler.
    pub fn report(&mut self, diagnostic: &Diagnostic) -> Result<(), CssError> {
        dispatch(self.handler.as_mut(), diagnostic)
    }

    /// Replace the supported media types.
    pub fn set_media<I, S>(&mut self, media: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media = media.into_iter().map(Into::into).collect();
    }

    /// The supported media types.
    #[must_use]
    pub fn media(&self) -> &[String] {
        &self.media
    }

    /// True if the comma separated media list is empty or names a supported
    /// medium.
    #[must_use]
    pub fn media_matches(&self, list: &str) -> bool {
        if list.trim().is_empty() {
            return true;
        }
        list.split(',')
            .map(str::trim)
            .any(|medium| self.media.iter().any(|m| m.eq_ignore_ascii_case(medium)))
    }

    /// The document base URL.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Set the document base URL.
    pub fn set_base_url(&mut self, url: Option<String>) {
        self.base_url = url;
    }

    /// The viewport used as the percentage reference.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Set the viewport.
    pub const fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Whether background and list images are requested.
    #[must_use]
    pub const fn show_images(&self) -> bool {
        self.show_images
    }

    /// Enable or disable image requests.
    pub const fn set_show_images(&mut self, show: bool) {
        self.show_images = show;
    }

    /// The font table.
    pub const fn fonts_mut(&mut self) -> &mut FontTable {
        &mut self.fonts
    }

    /// The font table.
    #[must_use]
    pub const fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    /// Resolve a font request through the table.
    pub fn resolve_font(&mut self, request: &Font) -> Font {
        self.fonts.resolve(request)
    }

    /// `counter-reset`: set `name` to `value`.
    pub fn reset_counter(&mut self, name: &str, value: i32) {
        let _ = self.counters.insert(name.to_string(), value);
    }

    /// `counter-increment`: add `step` to `name`, starting from zero.
    pub fn increment_counter(&mut self, name: &str, step: i32) {
        *self.counters.entry(name.to_string()).or_insert(0) += step;
    }

    /// The value of a counter, zero if never set.
    #[must_use]
    pub fn counter(&self, name: &str) -> i32 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Enter a quotation. Returns the quote index: 0 for an outer opening
    /// quote, 2 when nested.
    pub const fn open_quote(&mut self) -> u8 {
        let index = if self.quote_depth == 0 { 0 } else { 2 };
        self.quote_depth += 1;
        index
    }

    /// Leave a quotation. Returns 1 for an outer closing quote, 3 when still
    /// nested.
    pub const fn close_quote(&mut self) -> u8 {
        self.quote_depth = self.quote_depth.saturating_sub(1);
        if self.quote_depth == 0 { 1 } else { 3 }
    }

    /// Mark a link target as visited.
    pub fn mark_visited(&mut self, url: impl Into<String>) {
        let _ = self.visited.insert(url.into());
    }

    /// Visited link targets.
    #[must_use]
    pub const fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Name a special key for `-wap-access-key`.
    pub fn add_special_key(&mut self, name: impl Into<String>, code: u32) {
        let _ = self.special_keys.insert(name.into(), code);
    }

    /// The code of a named special key.
    #[must_use]
    pub fn special_key(&self, name: &str) -> Option<u32> {
        self.special_keys.get(name).copied()
    }

    /// Forget per-document state: counters and quote nesting.
    pub fn reset_document(&mut self) {
        self.counters.clear();
        self.quote_depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(family: &str, size: i32, bold: bool) -> Font {
        Font {
            family: family.to_string(),
            size,
            bold,
            italic: false,
        }
    }

    #[test]
    fn test_media_matching() {
        let ctx = CssContext::new();
        assert!(ctx.media_matches(""));
        assert!(ctx.media_matches("print, Handheld"));
        assert!(!ctx.media_matches("print"));
    }

    #[test]
    fn test_font_resolution_prefers_family_then_size() {
        let mut table = FontTable::new();
        table.register(font("serif", 12, false));
        table.register(font("mono", 15, false));
        table.register(font("mono", 20, true));
        assert_eq!(table.resolve(&font("mono", 16, false)), font("mono", 15, false));
        assert_eq!(table.resolve(&font("serif", 14, false)), font("serif", 12, false));
        assert_eq!(table.resolve(&font("serif", 20, true)), font("mono", 20, true));
    }

    #[test]
    fn test_quotes_nest() {
        let mut ctx = CssContext::new();
        assert_eq!(ctx.open_quote(), 0);
        assert_eq!(ctx.open_quote(), 2);
        assert_eq!(ctx.close_quote(), 3);
        assert_eq!(ctx.close_quote(), 1);
        assert_eq!(ctx.close_quote(), 1);
    }

    #[test]
    fn test_counters() {
        let mut ctx = CssContext::new();
        ctx.increment_counter("item", 1);
        ctx.increment_counter("item", 2);
        assert_eq!(ctx.counter("item"), 3);
        ctx.reset_counter("item", 10);
        assert_eq!(ctx.counter("item"), 10);
        ctx.reset_document();
        assert_eq!(ctx.counter("item"), 0);
    }
}
