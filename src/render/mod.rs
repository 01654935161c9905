//! Rendering module
//!
//! This module turns a URL into readable text:
//! - `Renderer`: the narrow capability the crawl pipeline depends on
//! - `extract`: the extraction policy (noise removal, image filtering, markdown)
//! - `ChromeRenderer`: one isolated headless Chrome session per render
//! - `HttpRenderer`: plain HTTP fetch for sites that need no script execution

mod browser;
pub mod extract;
mod http;

pub use browser::ChromeRenderer;
pub use http::HttpRenderer;

use crate::config::{RenderEngine, RendererConfig};
use crate::crawler::extract_anchor_links;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors from a single render
///
/// For supporting pages these are logged and dropped; for the home page they
/// abort the crawl.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Render timed out after {0:?}")]
    Timeout(Duration),

    #[error("Content extraction failed: {0}")]
    Content(String),

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Expected HTML, got {content_type}")]
    ContentMismatch { content_type: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A rendered and extracted page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// URL the page ended up at after redirects
    pub final_url: String,

    /// Dense markdown extracted from the cleaned document
    pub content: String,

    /// Absolute anchor targets left in the cleaned document
    pub links: Vec<String>,
}

impl RenderedPage {
    /// Applies the extraction policy to serialized page HTML
    ///
    /// Links are collected after noise removal, so navigation, header, and
    /// footer anchors do not contribute.
    pub fn from_html(final_url: &str, html: &str) -> Result<Self, RenderError> {
        let base = Url::parse(final_url)
            .map_err(|e| RenderError::Content(format!("Invalid page URL {}: {}", final_url, e)))?;

        let document = extract::clean_document(html);
        let content = extract::to_dense_markdown(&document.html())?;
        let links = extract_anchor_links(&document, &base);

        Ok(Self {
            final_url: final_url.to_string(),
            content,
            links,
        })
    }
}

/// Renders a URL into readable text
///
/// Implementations must release every resource they acquire before returning,
/// on success and failure alike.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Loads `url`, waits `settle` for dynamic content, and extracts the page
    async fn render(&self, url: &str, settle: Duration) -> Result<RenderedPage, RenderError>;

    /// Short engine name for logs
    fn name(&self) -> &'static str;
}

/// Builds the renderer selected by the configuration
pub fn build_renderer(config: &RendererConfig) -> Result<Arc<dyn Renderer>, RenderError> {
    match config.engine {
        RenderEngine::Browser => Ok(Arc::new(ChromeRenderer::new(config.clone()))),
        RenderEngine::Http => Ok(Arc::new(HttpRenderer::new(config)?)),
    }
}
