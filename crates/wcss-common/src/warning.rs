//! Engine warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used as the fallback sink for CSS diagnostics and fetch failures when the
//! embedding application did not register its own handler.

use std::collections::HashSet;
use std::sync::Mutex;

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a problem (prints once per unique component/message pair).
///
/// Returns `true` if the warning was printed, `false` if it was a repeat.
/// A poisoned warning set is treated as empty-and-unusable: the message is
/// printed without deduplication.
///
/// # Example
/// ```ignore
/// warn_once("CSS", "CSS Attribute 'zoom' (Appeared in selector 'p') is not supported in WCSS.");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED.lock().map_or(true, |mut guard| {
        guard.get_or_insert_with(HashSet::new).insert(key)
    });

    if should_print {
        eprintln!("{YELLOW}[WCSS {component}] ⚠ {message}{RESET}");
    }
    should_print
}

/// Clear all recorded warnings (call when loading a new document)
pub fn clear_warnings() {
    if let Ok(mut guard) = WARNED.lock()
        && let Some(set) = guard.as_mut()
    {
        set.clear();
    }
}
