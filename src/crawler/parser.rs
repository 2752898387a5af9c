//! HTML link extraction
//!
//! Parses fetched markup and collects the URLs a page points at:
//! `<a href>` targets first, then `<form action>` targets, in document order.

use crate::url::resolve_link;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Element/attribute pairs that reference other pages
const LINK_SOURCES: &[(&str, &str)] = &[("a[href]", "href"), ("form[action]", "action")];

/// Extracts the absolute URLs referenced by a document
///
/// # Extraction Rules
///
/// - `href` of every `<a>` and `action` of every `<form>`
/// - Each value is resolved against `base_url`; values that fail to resolve
///   are dropped silently
/// - Every resolved URL is kept whatever its scheme (`mailto:`, `tel:`...);
///   deciding what can be fetched is left to the fetch gateway
/// - Duplicates are removed, keeping the first occurrence
///
/// Malformed markup never fails: the parser recovers what it can, and a
/// document with nothing recoverable yields an empty list. `base_url` itself
/// appears only if the document references it.
///
/// # Example
///
/// ```
/// use linkweave::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/docs">Docs</a><form action="search"></form>"#;
/// let base = Url::parse("https://example.com/index.html").unwrap();
/// let links = extract_links(&base, html);
/// assert_eq!(links[0].as_str(), "https://example.com/docs");
/// assert_eq!(links[1].as_str(), "https://example.com/search");
/// ```
pub fn extract_links(base_url: &Url, document_text: &str) -> Vec<Url> {
    let document = Html::parse_document(document_text);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (selector, attribute) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(attribute) else {
                continue;
            };

            match resolve_link(raw, base_url) {
                Some(url) => {
                    if seen.insert(url.clone()) {
                        links.push(url);
                    }
                }
                None => {
                    tracing::trace!("Skipping unresolvable link {:?} on {}", raw, base_url);
                }
            }
        }
    }

    links
}
