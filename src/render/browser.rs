//! Headless Chrome renderer
//!
//! Every render launches its own browser with a throwaway profile directory and
//! tears it down before returning, so nothing leaks between pages and nothing
//! accumulates over a long crawl.

use crate::config::RendererConfig;
use crate::render::{RenderError, RenderedPage, Renderer};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;

/// Renders pages in a fresh headless Chrome session per call
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    config: RendererConfig,
}

impl ChromeRenderer {
    /// Creates a renderer; no browser is started until the first render
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.navigation_timeout_secs)
    }

    /// Builds the launch configuration for an unattended, sandboxed session
    fn browser_config(&self, profile_dir: &std::path::Path) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .window_size(self.config.window_width, self.config.window_height)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", self.config.user_agent));

        if let Some(executable) = &self.config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(RenderError::Launch)
    }

    /// Navigates, waits for the page to settle, and extracts it
    async fn load(browser: &Browser, url: &str, settle: Duration) -> Result<RenderedPage, RenderError> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        tokio::time::sleep(settle).await;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::Content(e.to_string()))?;

        RenderedPage::from_html(&final_url, &html)
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str, settle: Duration) -> Result<RenderedPage, RenderError> {
        let profile = tempfile::Builder::new()
            .prefix("sumi-scrape-")
            .tempdir()
            .map_err(|e| RenderError::Launch(format!("Failed to create profile dir: {}", e)))?;

        let (mut browser, mut handler) = Browser::launch(self.browser_config(profile.path())?)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // The session is closed below on every outcome; a cancelled render
        // relies on Browser's Drop to kill the child process.
        let timeout = self.navigation_timeout() + settle;
        let outcome = match tokio::time::timeout(timeout, Self::load(&browser, url, settle)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(timeout)),
        };

        if let Err(e) = browser.close().await {
            tracing::debug!(url, "Browser close error: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(url, "Browser wait error: {}", e);
        }
        events.abort();
        drop(profile);

        outcome
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}
