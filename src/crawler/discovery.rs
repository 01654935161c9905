//! Candidate discovery
//!
//! Candidates come from two sources that are unioned without priority:
//! - Source A: the site's sitemaps, walked from the conventional locations.
//!   Best-effort; any failure contributes zero URLs.
//! - Source B: the anchors left on the rendered home page, kept only when they
//!   mention the crawl's domain.
//!
//! Sitemap URLs are trusted to be same-site; only in-page links are scoped.

use crate::url::{domain_root, extract_netloc, is_same_site, normalize_candidate};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::{Client, StatusCode};
use sitemap::reader::{SiteMapEntity, SiteMapReader};
use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Most sitemap documents fetched for one crawl
pub const MAX_SITEMAP_DOCUMENTS: usize = 50;

/// Most URLs collected from sitemaps for one crawl
pub const MAX_SITEMAP_URLS: usize = 10_000;

/// Paths tried when robots.txt declares no sitemap
const CONVENTIONAL_SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml"];

/// Leading bytes of a gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors from the sitemap source
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Sitemap request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("No sitemap found for {0}")]
    NotFound(String),
}

/// Supplies candidate URLs listed in a site's sitemaps
#[async_trait]
pub trait SitemapSource: Send + Sync {
    /// Returns every URL listed in the sitemaps reachable from `homepage`
    async fn sitemap_urls(&self, homepage: &Url) -> Result<Vec<String>, DiscoveryError>;
}

/// Sitemap source that never yields URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSitemap;

#[async_trait]
impl SitemapSource for NoSitemap {
    async fn sitemap_urls(&self, _homepage: &Url) -> Result<Vec<String>, DiscoveryError> {
        Ok(Vec::new())
    }
}

/// Walks sitemaps over HTTP
///
/// # Lookup Order
///
/// 1. `Sitemap:` directives in `/robots.txt`
/// 2. If none are declared, `/sitemap.xml` and `/sitemap_index.xml`
/// 3. Sitemap indexes are followed recursively, each document at most once
#[derive(Debug, Clone)]
pub struct HttpSitemapSource {
    client: Client,
}

impl HttpSitemapSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches a document body, treating anything but HTTP 200 as absent
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, DiscoveryError> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            tracing::trace!("{} answered {}", url, response.status());
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }

    /// Reads `Sitemap:` directives from robots.txt
    async fn declared_sitemaps(&self, root: &str) -> Vec<String> {
        let robots_url = format!("{}/robots.txt", root);
        match self.fetch(&robots_url).await {
            Ok(Some(body)) => parse_sitemap_directives(&String::from_utf8_lossy(&body)),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", robots_url, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SitemapSource for HttpSitemapSource {
    async fn sitemap_urls(&self, homepage: &Url) -> Result<Vec<String>, DiscoveryError> {
        let root = domain_root(homepage);

        let mut pending: VecDeque<String> = self.declared_sitemaps(&root).await.into();
        if pending.is_empty() {
            pending.extend(
                CONVENTIONAL_SITEMAP_PATHS
                    .iter()
                    .map(|path| format!("{}{}", root, path)),
            );
        }

        let mut visited = HashSet::new();
        let mut collected = Vec::new();
        let mut documents_read = 0;
        let mut last_error = None;

        while let Some(sitemap_url) = pending.pop_front() {
            if visited.len() >= MAX_SITEMAP_DOCUMENTS || collected.len() >= MAX_SITEMAP_URLS {
                break;
            }
            if !visited.insert(sitemap_url.clone()) {
                continue;
            }

            let body = match self.fetch(&sitemap_url).await {
                Ok(Some(body)) => body,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("Failed to fetch sitemap {}: {}", sitemap_url, e);
                    last_error = Some(e);
                    continue;
                }
            };
            let xml = match decompress_sitemap(&body) {
                Ok(xml) => xml,
                Err(e) => {
                    tracing::debug!("Failed to inflate sitemap {}: {}", sitemap_url, e);
                    continue;
                }
            };
            documents_read += 1;

            let parsed = parse_sitemap(&xml);
            tracing::debug!(
                "Parsed {}: {} URLs, {} nested sitemaps",
                sitemap_url,
                parsed.urls.len(),
                parsed.sitemaps.len()
            );

            let room = MAX_SITEMAP_URLS - collected.len();
            collected.extend(parsed.urls.into_iter().take(room));
            pending.extend(parsed.sitemaps);
        }

        if documents_read == 0 {
            return Err(last_error.unwrap_or(DiscoveryError::NotFound(root)));
        }

        Ok(collected)
    }
}

/// Contents of one sitemap document
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedSitemap {
    /// Page URLs from `<url><loc>` entries
    pub urls: Vec<String>,
    /// Nested sitemap URLs from `<sitemap><loc>` index entries
    pub sitemaps: Vec<String>,
}

/// Inflates a gzip-compressed sitemap (`sitemap.xml.gz`)
///
/// Bodies without the gzip magic bytes are returned unchanged. Servers that
/// set `Content-Encoding: gzip` are already decoded by the HTTP client.
pub fn decompress_sitemap(body: &[u8]) -> std::io::Result<Cow<'_, [u8]>> {
    if !body.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(body));
    }
    let mut xml = Vec::new();
    GzDecoder::new(body).read_to_end(&mut xml)?;
    Ok(Cow::Owned(xml))
}

/// Parses a sitemap or sitemap index document
pub fn parse_sitemap(xml: &[u8]) -> ParsedSitemap {
    let mut parsed = ParsedSitemap::default();

    for entity in SiteMapReader::new(Cursor::new(xml)) {
        match entity {
            SiteMapEntity::Url(entry) => {
                if let Some(url) = entry.loc.get_url() {
                    parsed.urls.push(url.to_string());
                }
            }
            SiteMapEntity::SiteMap(entry) => {
                if let Some(url) = entry.loc.get_url() {
                    parsed.sitemaps.push(url.to_string());
                }
            }
            SiteMapEntity::Err(e) => tracing::trace!("Skipping sitemap entry: {:?}", e),
        }
    }

    parsed
}

/// Extracts `Sitemap:` directive targets from robots.txt content
pub fn parse_sitemap_directives(robots_txt: &str) -> Vec<String> {
    robots_txt
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            if !key.trim().eq_ignore_ascii_case("sitemap") {
                return None;
            }
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect()
}

/// Set of candidate URLs under consideration for one crawl
///
/// Entries are normalized on insert, so there are never duplicates, and URLs
/// marked processed up front are never admitted.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryQueue {
    candidates: HashSet<String>,
    processed: HashSet<String>,
}

impl DiscoveryQueue {
    /// Creates a queue that rejects the given already-processed URLs
    pub fn new<I, S>(processed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            candidates: HashSet::new(),
            processed: processed
                .into_iter()
                .map(|url| normalize_candidate(url.as_ref()))
                .collect(),
        }
    }

    /// Adds a candidate, returning true if it was new and not processed
    pub fn insert(&mut self, url: &str) -> bool {
        let normalized = normalize_candidate(url);
        if normalized.is_empty() || self.processed.contains(&normalized) {
            return false;
        }
        self.candidates.insert(normalized)
    }

    /// Adds every candidate, returning how many were new
    pub fn extend<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter()
            .filter(|url| self.insert(url.as_ref()))
            .count()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.candidates.contains(&normalize_candidate(url))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Consumes the queue, returning its candidates in no particular order
    pub fn into_candidates(self) -> Vec<String> {
        self.candidates.into_iter().collect()
    }
}

/// Produces candidate URLs for a crawl
#[derive(Clone)]
pub struct Discoverer {
    sitemap: Arc<dyn SitemapSource>,
}

impl Discoverer {
    pub fn new(sitemap: Arc<dyn SitemapSource>) -> Self {
        Self { sitemap }
    }

    /// Unions sitemap URLs and same-site home page links
    ///
    /// # Arguments
    ///
    /// * `homepage` - The crawl's domain root
    /// * `home_links` - Anchor targets from the rendered home page
    ///
    /// # Returns
    ///
    /// Normalized candidates; sitemap failures only shrink the set
    pub async fn discover(&self, homepage: &Url, home_links: &[String]) -> HashSet<String> {
        let mut candidates = HashSet::new();

        match self.sitemap.sitemap_urls(homepage).await {
            Ok(urls) => {
                tracing::info!("Sitemap listed {} URLs for {}", urls.len(), homepage);
                candidates.extend(
                    urls.iter()
                        .map(|url| normalize_candidate(url))
                        .filter(|url| !url.is_empty()),
                );
            }
            Err(e) => tracing::warn!("Sitemap discovery skipped for {}: {}", homepage, e),
        }

        let netloc = extract_netloc(homepage).unwrap_or_default();
        let before = candidates.len();
        candidates.extend(
            home_links
                .iter()
                .filter(|href| is_same_site(href, &netloc))
                .map(|href| normalize_candidate(href))
                .filter(|url| !url.is_empty()),
        );
        tracing::debug!(
            "Home page links added {} candidates ({} links seen)",
            candidates.len() - before,
            home_links.len()
        );

        candidates
    }
}
