//! WCSS tokenizer, parser, selector model, cascade and style applier.
//!
//! # Scope
//!
//! This crate implements the styling core of a handset browser for
//! HTML4/XHTML-MP documents:
//!
//! - **Tokenizer** - mode driven tokens for selectors, property names and
//!   values, with comment and segment handling
//! - **Parser** - style sheets and declaration blocks into a selector tree,
//!   including `@import`, `@media` and `@charset`, grouping, child and
//!   sibling combinators and shorthand expansion
//! - **Selector model** - tag, class, id, pseudo-class and attribute
//!   constraints, specificity
//! - **Cascade** - one walk over the tag tree with nested and sibling
//!   candidate pools
//! - **Style applier** - mutates the renderables of matched elements
//! - **Resources** - a bounded fetch pool for style sheets and images
//!
//! The `css2` feature (on by default) enables the CSS2 extensions of the
//! WCSS profile.

/// Cascade walk and specificity ordering.
pub mod cascade;
/// Engine configuration loaded from JSON.
pub mod config;
/// Per-document styling context.
pub mod context;
/// Diagnostic codes, the handler contract and the error type.
pub mod diagnostics;
/// Declaration parsing and at-rule handling.
pub mod parser;
/// The property table.
pub mod properties;
/// Bounded fetch pool for style sheets and images.
pub mod resources;
/// Selector trees.
pub mod selector;
/// End-to-end styling of a document.
pub mod session;
/// Style application onto renderables.
pub mod apply;
/// Tokenizer.
pub mod tokenizer;
/// Value conversion.
pub mod values;

pub use cascade::{SelectorRef, SortedSelectors, apply_stylesheets};
pub use config::{EngineConfig, FontConfig, Viewport};
pub use context::{CssContext, FontTable};
pub use diagnostics::{CssError, Diagnostic, DiagnosticHandler, ErrorCode};
pub use parser::{parse_declaration_block, parse_external_stylesheet, parse_stylesheet, ParsedStylesheet};
pub use properties::{Property, Shorthand};
pub use resources::{
    CancelHandle, FetchedImage, FetchedStylesheet, Fetcher, HttpFetcher, ImageRequest, ImageTarget, ResourceKind,
    ResourceQueue, StaticFetcher,
};
pub use selector::{SelectorId, SelectorNode, SelectorTree};
pub use session::{SessionOptions, StyleReport, style_document};

/// True when the CSS2 extensions are compiled in.
pub(crate) const CSS2: bool = cfg!(feature = "css2");
