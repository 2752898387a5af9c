//! Host/path tree built from a flat URL list
//!
//! Each URL is split into `[host, path segments..., ?query]` and inserted
//! into a trie under a synthetic root. A node's `leaf_urls` are the URLs that
//! end exactly at that path; its `children` share the path as a prefix.

use std::collections::BTreeMap;
use url::Url;

const NO_HOST_LABEL: &str = "(no host)";

/// One trie node; the root has an empty segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlTreeNode {
    pub segment: String,
    /// Children keyed (and therefore ordered) by segment
    pub children: BTreeMap<String, UrlTreeNode>,
    /// URLs terminating at this node, in input order
    pub leaf_urls: Vec<String>,
}

impl UrlTreeNode {
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            ..Self::default()
        }
    }

    /// True for a node with no children and no leaves
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.leaf_urls.is_empty()
    }

    pub fn child(&self, segment: &str) -> Option<&UrlTreeNode> {
        self.children.get(segment)
    }

    /// Display text for the segment; host-less URLs group under `(no host)`
    pub fn label(&self) -> &str {
        if self.segment.is_empty() {
            NO_HOST_LABEL
        } else {
            &self.segment
        }
    }

    /// Number of leaf URLs in this subtree
    pub fn leaf_count(&self) -> usize {
        self.leaf_urls.len()
            + self
                .children
                .values()
                .map(UrlTreeNode::leaf_count)
                .sum::<usize>()
    }

    fn insert(&mut self, segments: &[String], url: &str) {
        let mut node = self;
        for segment in segments {
            node = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| UrlTreeNode::new(segment.clone()));
        }
        node.leaf_urls.push(url.to_string());
    }
}

/// Splits a URL into its tree path
///
/// Empty path segments are dropped and a non-empty query becomes one final
/// `?query` segment. A URL without a host (`mailto:`, `tel:`) starts with an
/// empty host segment followed by its path. Input that does not parse is a
/// single segment equal to the raw text.
pub fn url_segments(raw: &str) -> Vec<String> {
    let Ok(url) = Url::parse(raw) else {
        return vec![raw.to_string()];
    };

    let mut segments = vec![url.host_str().unwrap_or_default().to_string()];
    segments.extend(
        url.path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        segments.push(format!("?{}", query));
    }
    segments
}

/// Builds a fresh tree from a flat URL list
///
/// # Example
///
/// ```
/// use linkweave::output::build_url_tree;
///
/// let tree = build_url_tree(&["https://a.com/x/y", "https://b.com/"]);
/// assert_eq!(tree.children.len(), 2);
/// assert_eq!(tree.child("b.com").unwrap().leaf_urls, vec!["https://b.com/"]);
/// ```
pub fn build_url_tree<S: AsRef<str>>(urls: &[S]) -> UrlTreeNode {
    let mut root = UrlTreeNode::new("");
    for url in urls {
        let url = url.as_ref();
        root.insert(&url_segments(url), url);
    }
    root
}
