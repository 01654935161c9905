//! Anchor extraction from rendered documents
//!
//! Supplies the in-page link source of discovery. Every `<a href>` left in the
//! cleaned document is resolved against the page URL, the way a browser
//! reports an anchor's `href` property.

use scraper::{Html, Selector};
use url::Url;

/// Extracts every resolvable anchor target from a document
///
/// # Exclusions
///
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to an HTTP(S) URL
///
/// # Arguments
///
/// * `document` - The parsed (and usually cleaned) page
/// * `base_url` - The page URL relative links are resolved against
///
/// # Returns
///
/// Absolute URLs in document order, duplicates included
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use sumi_scrape::crawler::extract_anchor_links;
/// use url::Url;
///
/// let html = Html::parse_document(r#"<a href="/about">About</a><a href="mailto:x@y.z">Mail</a>"#);
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_anchor_links(&html, &base), vec!["https://example.com/about"]);
/// ```
pub fn extract_anchor_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
