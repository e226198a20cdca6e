//! URL resolution utilities.
//!
//! Stylesheets, `@import` targets, background images, list-style images and
//! generated `url(...)` content are all written relative to either the
//! document base or the stylesheet that referenced them.
//!
//! [URL Standard](https://url.spec.whatwg.org/)

/// Returns true if `href` carries its own scheme and needs no base.
///
/// [URL Standard § 4.3](https://url.spec.whatwg.org/#url-parsing)
/// "An absolute-URL string is a URL-scheme string, followed by U+003A (:),
/// followed by a scheme-specific part."
#[must_use]
pub fn is_absolute_url(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolve a potentially relative URL against a base URL.
///
/// # Algorithm
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// Returns `None` when `href` is relative and there is no base to resolve
/// against; callers report that as a missing-base diagnostic.
///
/// NOTE: This covers scheme-relative, path-absolute and path-relative
/// references including `.`/`..` segments. Query and fragment handling is
/// left to the fetcher.
#[must_use]
pub fn resolve_url(href: &str, base_url: Option<&str>) -> Option<String> {
    let href = href.trim();

    // STEP 1: Already absolute.
    if is_absolute_url(href) {
        return Some(href.to_string());
    }

    // STEP 2: Resolve relative URL against base.
    let base = base_url?;
    let (scheme, rest) = base.split_once("://").unwrap_or(("", base));
    let (authority, base_path) = rest.find('/').map_or((rest, "/"), |i| rest.split_at(i));
    let origin = if scheme.is_empty() {
        authority.to_string()
    } else {
        format!("{scheme}://{authority}")
    };

    if let Some(stripped) = href.strip_prefix("//") {
        // Scheme-relative
        let scheme = if scheme.is_empty() { "http" } else { scheme };
        return Some(format!("{scheme}://{stripped}"));
    }

    let joined = if href.starts_with('/') {
        href.to_string()
    } else {
        let dir = base_path.rsplit_once('/').map_or("", |(dir, _)| dir);
        format!("{dir}/{href}")
    };

    Some(format!("{origin}{}", remove_dot_segments(&joined)))
}

/// [RFC 3986 § 5.2.4](https://www.rfc-editor.org/rfc/rfc3986#section-5.2.4)
fn remove_dot_segments(path: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if i == last {
                    output.push("");
                }
            }
            ".." => {
                if output.len() > 1 {
                    let _ = output.pop();
                }
                if i == last {
                    output.push("");
                }
            }
            other => output.push(other),
        }
    }
    let mut result = output.join("/");
    if !result.starts_with('/') {
        result.insert(0, '/');
    }
    result
}
