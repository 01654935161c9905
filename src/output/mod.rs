//! Output module for crawl results
//!
//! This module handles:
//! - The `PageResult` wire type shared by the stream and the webhook
//! - Newline-delimited JSON framing of the output stream
//! - Per-crawl statistics

mod page;
pub mod stats;

pub use page::{PageKind, PageResult};
pub use stats::CrawlStatistics;

/// Content type of the output stream
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Encodes a page result as one NDJSON line (JSON object plus `\n`)
///
/// # Example
///
/// ```
/// use sumi_scrape::output::{to_ndjson_line, PageResult};
///
/// let line = to_ndjson_line(&PageResult::main_page("https://example.com", "Hi")).unwrap();
/// assert_eq!(line, "{\"url\":\"https://example.com\",\"type\":\"MAIN_PAGE\",\"markdown\":\"Hi\"}\n");
/// ```
pub fn to_ndjson_line(page: &PageResult) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(page)?;
    line.push('\n');
    Ok(line)
}
