//! Shared fixtures for the integration tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_scrape::config::CrawlerConfig;
use sumi_scrape::crawler::{Coordinator, Discoverer, NoSitemap};
use sumi_scrape::{NotifierHandle, RenderError, RenderedPage, Renderer};

/// Domain root every stub site lives under
pub const ROOT: &str = "https://example.com";

enum StubPage {
    Ok { content: String, links: Vec<String> },
    Fail,
}

/// Renderer serving canned pages and recording how it was driven
pub struct StubRenderer {
    pages: HashMap<String, StubPage>,
    delay: Duration,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delay: Duration::ZERO,
            delays: HashMap::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn page(mut self, url: &str, content: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            StubPage::Ok {
                content: content.to_string(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), StubPage::Fail);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Overrides the render delay for one URL
    pub fn delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Every URL rendered so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of renders observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render(&self, url: &str, _settle: Duration) -> Result<RenderedPage, RenderError> {
        self.calls.lock().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.delays.get(url).copied().unwrap_or(self.delay);
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(url) {
            Some(StubPage::Ok { content, links }) => Ok(RenderedPage {
                final_url: url.to_string(),
                content: content.clone(),
                links: links.clone(),
            }),
            Some(StubPage::Fail) => Err(RenderError::Navigation(format!("{} crashed", url))),
            None => Err(RenderError::Http { status: 404 }),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Content of exactly `len` characters
pub fn text(len: usize) -> String {
    "x".repeat(len)
}

/// Crawler settings with no settle delays
pub fn crawler_config(page_limit: usize, max_concurrent_renders: usize) -> CrawlerConfig {
    let mut config = CrawlerConfig::new(page_limit);
    config.max_concurrent_renders = max_concurrent_renders;
    config.home_settle_ms = 0;
    config.page_settle_ms = 0;
    config
}

/// Coordinator over a stub renderer, without sitemap discovery
pub fn coordinator(
    renderer: Arc<StubRenderer>,
    config: CrawlerConfig,
    notifier: NotifierHandle,
) -> Coordinator {
    Coordinator::new(
        renderer,
        Discoverer::new(Arc::new(NoSitemap)),
        config,
        notifier,
        "site-42",
    )
}
