//! URL handling module for Linkweave
//!
//! This module turns user input into canonical absolute URLs, resolves
//! extracted references against the page they came from, and answers
//! same-origin questions for the crawl filter.

mod normalize;
mod origin;

// Re-export main functions
pub use normalize::{is_web_url, normalize_url, resolve_link};
pub use origin::{matches_origin, same_origin};
