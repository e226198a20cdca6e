//! Common utilities for the WCSS cascade engine.
//!
//! This crate provides shared infrastructure used by the document and CSS crates:
//! - **Warning System** - deduplicated colored terminal output for diagnostics
//!   nobody else consumed
//! - **URL Resolution** - joining relative stylesheet/image references with a base
//! - **Networking** - blocking HTTP helpers behind the default resource fetcher

pub mod net;
pub mod url;
pub mod warning;
