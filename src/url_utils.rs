//! URL Utility Functions
//!
//! Scheme validation for submitted URLs, resolution of relative references
//! found in page metadata, and hostname helpers.

use url::Url;

use crate::error::{Error, Result};

/// Parse a submitted URL, accepting only absolute `http`/`https` URLs.
///
/// # Errors
/// Returns [`Error::InvalidUrl`] for unparsable input, other schemes, or a
/// missing host.
pub fn validate_http_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "{trimmed}: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(format!("{trimmed}: missing host")));
    }
    Ok(url)
}

/// Whether the string is an absolute `http`/`https` URL.
#[must_use]
pub fn is_http_url(input: &str) -> bool {
    validate_http_url(input).is_ok()
}

/// Parse a URL string into a Url object.
///
/// # Returns
/// * `Some(Url)` if valid absolute URL, `None` otherwise
#[must_use]
pub fn parse_url(url_str: &str) -> Option<Url> {
    Url::parse(url_str.trim()).ok()
}

/// Resolve a possibly relative reference against `base`.
///
/// Absolute references are returned as-is (re-serialized). `data:` URIs are
/// kept untouched. Returns `None` when the reference cannot be resolved.
#[must_use]
pub fn resolve(reference: &str, base: Option<&Url>) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.starts_with("data:") {
        return Some(reference.to_string());
    }
    if let Ok(absolute) = Url::parse(reference) {
        return Some(absolute.to_string());
    }
    base.and_then(|b| b.join(reference).ok()).map(|u| u.to_string())
}

/// Hostname of a URL with a leading `www.` removed.
///
/// # Examples
/// ```
/// use story_extractor::url_utils::site_hostname;
///
/// assert_eq!(site_hostname("https://www.example.com/a").as_deref(), Some("example.com"));
/// assert_eq!(site_hostname("not a url"), None);
/// ```
#[must_use]
pub fn site_hostname(url_str: &str) -> Option<String> {
    let url = parse_url(url_str)?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    (!host.is_empty()).then(|| host.to_string())
}

/// Whether two URLs point to the same page, ignoring fragments.
#[must_use]
pub fn urls_match(a: &str, b: &str) -> bool {
    match (parse_url(a), parse_url(b)) {
        (Some(mut a), Some(mut b)) => {
            a.set_fragment(None);
            b.set_fragment(None);
            a == b
        }
        _ => a == b,
    }
}
