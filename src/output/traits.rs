//! Renderer traits and shared output types
//!
//! This module defines the interface for presenting a crawl's URL list and
//! the error type shared by every renderer and exporter.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// How a URL list is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewMode {
    /// Grouped by host and path segment
    #[default]
    Tree,

    /// One URL per line in discovery order
    Flat,
}

/// File formats a saved crawl can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Markdown,
}

/// Presents a list of URLs
///
/// Called after a crawl completes, or when a history entry is selected for
/// viewing. The display mode is passed on every call; renderers keep no
/// mode of their own.
pub trait ResultRenderer {
    fn render(&mut self, urls: &[String], mode: ViewMode) -> OutputResult<()>;
}
