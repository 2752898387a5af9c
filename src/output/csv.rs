//! CSV export
//!
//! A `url` header followed by one double-quoted URL per row, with embedded
//! quotes doubled. Rows are separated by `\n` and there is no trailing newline.

use crate::output::traits::OutputResult;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::Path;

const HEADER: &[u8] = b"url\n";

/// Formats URLs as CSV text
///
/// # Example
///
/// ```
/// use linkweave::output::format_csv;
///
/// let csv = format_csv(&["https://example.com/a\"b"]).unwrap();
/// assert_eq!(csv, "url\n\"https://example.com/a\"\"b\"");
/// ```
pub fn format_csv<S: AsRef<str>>(urls: &[S]) -> OutputResult<String> {
    // The header stays bare; only data rows are quoted
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(HEADER.to_vec());

    for url in urls {
        writer.write_record([url.as_ref()])?;
    }

    let mut bytes = writer.into_inner().map_err(|e| e.into_error())?;
    if !urls.is_empty() {
        bytes.pop();
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes URLs as CSV to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_csv<S: AsRef<str>>(urls: &[S], output_path: &Path) -> OutputResult<()> {
    std::fs::write(output_path, format_csv(urls)?)?;
    tracing::info!("Wrote {} URLs to {}", urls.len(), output_path.display());
    Ok(())
}
