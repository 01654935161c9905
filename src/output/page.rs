//! Page result types streamed to callers and carried in webhook events

use serde::{Deserialize, Serialize};

/// Distinguishes the crawl's entry point from discovered pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageKind {
    /// The rendered domain root
    MainPage,
    /// A page found through the sitemap or home page links
    SupportingData,
}

/// The unit of crawl output
///
/// Created once per successfully rendered page and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Absolute page URL, without fragment or trailing slash
    pub url: String,

    #[serde(rename = "type")]
    pub kind: PageKind,

    /// Normalized readable text extracted from the page
    #[serde(rename = "markdown")]
    pub content: String,
}

impl PageResult {
    pub fn main_page(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: PageKind::MainPage,
            content: content.into(),
        }
    }

    pub fn supporting(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: PageKind::SupportingData,
            content: content.into(),
        }
    }

    /// Character count of the extracted content
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if the content is longer than `min_len` characters
    pub fn exceeds(&self, min_len: usize) -> bool {
        self.content_len() > min_len
    }
}
