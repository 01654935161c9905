use url::Url;

/// Extracts the network location (host plus explicit port) from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scrape::url::extract_netloc;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(extract_netloc(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_netloc(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_netloc(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Returns the domain root (`scheme://netloc`) of a URL
///
/// This is the page rendered as the crawl's main page, whatever path the
/// crawl was started from.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scrape::url::domain_root;
///
/// let url = Url::parse("https://example.com/blog/post?x=1#top").unwrap();
/// assert_eq!(domain_root(&url), "https://example.com");
/// ```
pub fn domain_root(url: &Url) -> String {
    match extract_netloc(url) {
        Some(netloc) => format!("{}://{}", url.scheme(), netloc),
        None => url.origin().ascii_serialization(),
    }
}

/// Counts the `/` characters in a URL's path
///
/// A URL with nothing between its authority and its query or fragment
/// (`https://example.com?lang=en`) has depth zero, even though the parsed
/// form reports its path as `/`. Unparseable input has depth zero too.
pub fn path_depth(url_str: &str) -> usize {
    match Url::parse(url_str) {
        Ok(url) if has_written_path(url_str) => url.path().matches('/').count(),
        _ => 0,
    }
}

/// Returns true if the raw string has a `/` after `scheme://authority`
fn has_written_path(url_str: &str) -> bool {
    let rest = match url_str.split_once("://") {
        Some((_, rest)) => rest,
        None => return false,
    };
    let end = rest.find(|c| c == '?' || c == '#').unwrap_or(rest.len());
    rest[..end].contains('/')
}

/// Returns true if `href` mentions the crawl's network location
///
/// This is a substring test: an off-site URL that carries the domain in its
/// path or query also passes.
pub fn is_same_site(href: &str, netloc: &str) -> bool {
    !netloc.is_empty() && href.contains(netloc)
}
