//! Plain HTTP renderer
//!
//! Fetches the served HTML without executing scripts and applies the same
//! extraction policy as the browser renderer. The settle delay is ignored since
//! nothing populates after the response arrives.

use crate::config::RendererConfig;
use crate::render::{RenderError, RenderedPage, Renderer};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Renders pages with a single HTTP GET
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Builds a renderer with the configured identity and timeout
    ///
    /// # Returns
    ///
    /// * `Ok(HttpRenderer)` - Successfully built HTTP client
    /// * `Err(RenderError)` - Failed to build client
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.navigation_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, _settle: Duration) -> Result<RenderedPage, RenderError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Navigation(format!("Request timeout: {}", e))
            } else {
                RenderError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("text/html") {
            return Err(RenderError::ContentMismatch { content_type });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;

        RenderedPage::from_html(&final_url, &body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
