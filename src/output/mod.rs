//! Output module for presenting and exporting crawl results
//!
//! This module handles:
//! - Building the host/path tree from a flat URL list
//! - Rendering results as a tree or a flat list
//! - Exporting saved crawls as CSV or a markdown report

mod csv;
mod markdown;
mod text;
mod traits;
mod tree;

pub use self::csv::{format_csv, write_csv};
pub use markdown::{format_markdown_report, generate_markdown_report};
pub use text::{display_url, TextRenderer};
pub use traits::{ExportFormat, OutputError, OutputResult, ResultRenderer, ViewMode};
pub use tree::{build_url_tree, url_segments, UrlTreeNode};

use crate::storage::SavedCrawl;
use std::path::Path;

/// Exports a saved crawl in the requested format
///
/// # Arguments
///
/// * `saved` - The crawl to export
/// * `format` - Target file format
/// * `output_path` - Destination file (created or truncated)
pub fn export_crawl(saved: &SavedCrawl, format: ExportFormat, output_path: &Path) -> OutputResult<()> {
    match format {
        ExportFormat::Csv => write_csv(&saved.record.urls, output_path),
        ExportFormat::Markdown => generate_markdown_report(saved, output_path),
    }
}
