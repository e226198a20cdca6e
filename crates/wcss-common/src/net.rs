//! HTTP fetch utilities for the WCSS engine.
//!
//! Provides simple blocking HTTP GET wrappers used by the default resource
//! fetcher for external stylesheets and images.

use std::time::Duration;

/// User-Agent header sent with all requests.
///
/// Identifies as a handset browser so WAP gateways serve the mobile profile.
const USER_AGENT: &str = "Mozilla/5.0 (Linux; U; Mobile) WCSS/0.1 Profile/MIDP-2.0";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

fn get(url: &str) -> Result<reqwest::blocking::Response, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {e}"))?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| format!("Request failed: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()));
    }
    Ok(response)
}

/// Fetch a URL and return its body as raw bytes.
///
/// Stylesheets are fetched as bytes too, since their `@charset` rule decides
/// how they are decoded.
///
/// # Errors
///
/// Returns an error string if the HTTP client cannot be created, the request
/// fails, the response has a non-success status, or the body cannot be read.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    get(url)?
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| format!("Failed to read response body: {e}"))
}

/// Read a `file:` URL from the local filesystem.
///
/// # Errors
///
/// Returns an error string if the path cannot be read.
pub fn read_file_url(url: &str) -> Result<Vec<u8>, String> {
    let path = url
        .strip_prefix("file://")
        .or_else(|| url.strip_prefix("file:"))
        .unwrap_or(url);
    std::fs::read(path).map_err(|e| format!("Failed to read {path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_url_forms() {
        let path = std::env::temp_dir().join("wcss-net-read-file-url.css");
        std::fs::write(&path, b"p { color: red }").unwrap();
        let path = path.to_string_lossy().into_owned();

        assert_eq!(read_file_url(&format!("file://{path}")).unwrap(), b"p { color: red }");
        assert_eq!(read_file_url(&format!("file:{path}")).unwrap(), b"p { color: red }");
        assert!(read_file_url("file:///no/such/sheet.css").is_err());
    }
}
