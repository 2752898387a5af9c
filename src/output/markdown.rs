//! Markdown report generation
//!
//! This module renders a saved crawl as a human-readable markdown document:
//! run information followed by the discovered links grouped by host and path.

use crate::output::text::display_url;
use crate::output::traits::OutputResult;
use crate::output::tree::{build_url_tree, UrlTreeNode};
use crate::storage::SavedCrawl;
use chrono::SecondsFormat;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report for a saved crawl
///
/// # Arguments
///
/// * `saved` - The crawl to report on
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown report
/// * `Err(OutputError)` - Failed to write report
pub fn generate_markdown_report(saved: &SavedCrawl, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(saved);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote report for crawl {} to {}", saved.id, output_path.display());
    Ok(())
}

/// Formats a saved crawl as markdown
pub fn format_markdown_report(saved: &SavedCrawl) -> String {
    let record = &saved.record;
    let mut md = String::new();

    md.push_str("# Linkweave Crawl Report\n\n");

    md.push_str("## Crawl Information\n\n");
    md.push_str(&format!("- **Crawl ID**: {}\n", saved.id));
    md.push_str(&format!("- **Seed**: {}\n", record.seed));
    md.push_str(&format!(
        "- **Crawled**: {}\n",
        record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    md.push_str(&format!("- **Owner**: {}\n", saved.owner_id));
    md.push_str(&format!("- **Unique Links**: {}\n\n", record.url_count));

    md.push_str("## Links\n\n");
    if record.urls.is_empty() {
        md.push_str("No links found\n");
        return md;
    }

    let tree = build_url_tree(&record.urls);
    for child in tree.children.values() {
        push_node(&mut md, child, 0);
    }

    md
}

fn push_node(md: &mut String, node: &UrlTreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    md.push_str(&format!("{}- `{}`\n", indent, node.label()));

    for url in &node.leaf_urls {
        md.push_str(&format!("{}  - [{}](<{}>)\n", indent, display_url(url), url));
    }
    for child in node.children.values() {
        push_node(md, child, depth + 1);
    }
}
