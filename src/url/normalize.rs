use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates the URL a crawl starts from
///
/// # Validation Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. Parse the URL; reject if malformed
/// 3. Accept only HTTP and HTTPS schemes
/// 4. Require a host
///
/// # Examples
///
/// ```
/// use sumi_scrape::url::parse_start_url;
///
/// let url = parse_start_url("https://example.com/blog/post").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
/// assert!(parse_start_url("ftp://example.com").is_err());
/// ```
pub fn parse_start_url(url_str: &str) -> UrlResult<Url> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("URL is empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Normalizes a candidate URL for deduplication
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything from the first `#`)
/// 2. Remove every trailing slash
///
/// Nothing else is rewritten: scheme, host case, and query are kept as found,
/// so two candidates only collapse when they differ by fragment or trailing slash.
///
/// # Examples
///
/// ```
/// use sumi_scrape::url::normalize_candidate;
///
/// assert_eq!(normalize_candidate("https://example.com/docs/#intro"), "https://example.com/docs");
/// assert_eq!(normalize_candidate("https://example.com/"), "https://example.com");
/// ```
pub fn normalize_candidate(url_str: &str) -> String {
    let without_fragment = match url_str.find('#') {
        Some(pos) => &url_str[..pos],
        None => url_str,
    };

    without_fragment.trim().trim_end_matches('/').to_string()
}
