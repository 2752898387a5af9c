use crate::{UrlError, UrlResult};
use url::Url;

/// Scheme used when the user omits one
const DEFAULT_SCHEME: &str = "https";

/// Normalizes free-form user input into an absolute URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. If the input has no `scheme://` prefix, prepend `https://`
/// 3. Parse as an absolute URL (WHATWG serialization: lowercase host,
///    default port dropped, empty path becomes `/`)
///
/// Any explicit scheme is accepted here; a seed the gateway cannot fetch
/// simply yields an empty crawl.
///
/// # Arguments
///
/// * `raw` - The text the user typed
///
/// # Returns
///
/// * `Ok(Url)` - Canonical absolute URL
/// * `Err(UrlError)` - The input is empty or does not parse
///
/// # Examples
///
/// ```
/// use linkweave::url::normalize_url;
///
/// let url = normalize_url("  Example.COM/docs ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_url(raw: &str) -> UrlResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if has_scheme_prefix(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, trimmed)
    };

    Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))
}

/// Resolves a possibly-relative reference against a base URL
///
/// Never fails loudly: link extraction must tolerate malformed individual
/// links, so an unresolvable reference yields `None`.
///
/// # Examples
///
/// ```
/// use linkweave::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/a/b").unwrap();
/// assert_eq!(resolve_link("../c", &base).unwrap().as_str(), "https://example.com/c");
/// assert!(resolve_link("http://[::1", &base).is_none());
/// ```
pub fn resolve_link(raw: &str, base: &Url) -> Option<Url> {
    base.join(raw).ok()
}

/// Returns true for URLs the fetch gateway can retrieve
pub fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Checks for a leading `scheme://` where the scheme is
/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn has_scheme_prefix(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
