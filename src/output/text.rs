//! Plain-text renderer for terminals and pipes

use crate::output::traits::{OutputResult, ResultRenderer, ViewMode};
use crate::output::tree::{build_url_tree, UrlTreeNode};
use std::borrow::Cow;
use std::io::Write;

const INDENT: &str = "  ";

/// Writes a URL list as text to any `Write` sink
///
/// Output starts with a `N unique link(s) found` line. Tree mode then prints
/// one line per segment, indented by depth, with the URLs ending at a node
/// listed beneath it; flat mode prints one URL per line. URLs are
/// percent-decoded for display only.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_tree(&mut self, root: &UrlTreeNode) -> OutputResult<()> {
        for child in root.children.values() {
            self.write_node(child, 0)?;
        }
        Ok(())
    }

    fn write_node(&mut self, node: &UrlTreeNode, depth: usize) -> OutputResult<()> {
        let indent = INDENT.repeat(depth);
        writeln!(self.out, "{}{}", indent, node.label())?;

        for url in &node.leaf_urls {
            writeln!(self.out, "{}{}- {}", indent, INDENT, display_url(url))?;
        }
        for child in node.children.values() {
            self.write_node(child, depth + 1)?;
        }
        Ok(())
    }
}

impl<W: Write> ResultRenderer for TextRenderer<W> {
    fn render(&mut self, urls: &[String], mode: ViewMode) -> OutputResult<()> {
        writeln!(self.out, "{} unique link(s) found", urls.len())?;

        if urls.is_empty() {
            writeln!(self.out, "No links found")?;
            return Ok(());
        }

        match mode {
            ViewMode::Tree => self.write_tree(&build_url_tree(urls))?,
            ViewMode::Flat => {
                for url in urls {
                    writeln!(self.out, "{}", display_url(url))?;
                }
            }
        }

        self.out.flush()?;
        Ok(())
    }
}

/// Percent-decoded form of a URL for display; the raw text if decoding fails
pub fn display_url(url: &str) -> Cow<'_, str> {
    urlencoding::decode(url).unwrap_or(Cow::Borrowed(url))
}
