use url::{Origin, Url};

/// Returns true if both URLs share a scheme, host and port
///
/// Opaque origins (`data:`, `mailto:` and friends) never match anything,
/// including themselves.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkweave::url::same_origin;
///
/// let a = Url::parse("https://example.com/a").unwrap();
/// let b = Url::parse("https://example.com:443/b?q=1").unwrap();
/// let c = Url::parse("http://example.com/a").unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    matches_origin(&a.origin(), b)
}

/// Returns true if `url` belongs to an already computed origin
pub fn matches_origin(origin: &Origin, url: &Url) -> bool {
    origin.is_tuple() && *origin == url.origin()
}
