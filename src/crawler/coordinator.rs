//! Crawler coordinator - the streaming crawl pipeline
//!
//! A crawl moves through `RENDER_HOME → DISCOVER → PRIORITIZE → FETCH_BATCH →
//! DRAIN → DONE`. The home page is rendered before a stream is handed out, so
//! a home page failure surfaces as an error with no output at all. Everything
//! after that runs lazily inside the returned stream:
//! - The home page result is yielded first
//! - Supporting pages are rendered concurrently under a [`RenderGate`]
//! - Results are yielded in completion order, filtered by content length
//! - A `COMPLETED` event is queued once every render has finished
//!
//! Dropping the stream aborts any renders still in flight.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::discovery::{Discoverer, DiscoveryQueue, HttpSitemapSource};
use crate::crawler::scheduler::{prioritize, RenderGate};
use crate::notify::{CrawlEvent, NotifierHandle};
use crate::output::{CrawlStatistics, PageResult};
use crate::render::{build_renderer, Renderer};
use crate::state::{CrawlPhase, PhaseTracker};
use crate::url::{domain_root, normalize_candidate, parse_start_url};
use crate::ScrapeError;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Stream of page results produced by one crawl
pub type CrawlStream = Pin<Box<dyn Stream<Item = PageResult> + Send>>;

/// Main crawler coordinator structure
///
/// One coordinator drives one crawl; [`Coordinator::start`] consumes it.
pub struct Coordinator {
    renderer: Arc<dyn Renderer>,
    discoverer: Discoverer,
    config: CrawlerConfig,
    notifier: NotifierHandle,
    site_id: String,
}

impl Coordinator {
    /// Creates a coordinator from explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `renderer` - Renders the home page and every supporting page
    /// * `discoverer` - Produces candidates from the rendered home page
    /// * `config` - Page limit, concurrency, threshold and settle delays
    /// * `notifier` - Receives `PAGE_COMPLETED` and `COMPLETED` events
    /// * `site_id` - Opaque identifier echoed in every event
    pub fn new(
        renderer: Arc<dyn Renderer>,
        discoverer: Discoverer,
        config: CrawlerConfig,
        notifier: NotifierHandle,
        site_id: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            discoverer,
            config,
            notifier,
            site_id: site_id.into(),
        }
    }

    /// Creates a coordinator with the configured renderer and HTTP sitemap walk
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - The renderer or sitemap client could not be built
    pub fn from_config(
        config: &Config,
        notifier: NotifierHandle,
        site_id: impl Into<String>,
    ) -> crate::Result<Self> {
        let renderer = build_renderer(&config.renderer)?;
        let sitemap = HttpSitemapSource::new(
            &config.renderer.user_agent,
            Duration::from_secs(config.renderer.navigation_timeout_secs),
        )?;

        Ok(Self::new(
            renderer,
            Discoverer::new(Arc::new(sitemap)),
            config.crawler.clone(),
            notifier,
            site_id,
        ))
    }

    /// Renders the home page and returns the stream for the rest of the crawl
    ///
    /// The home page is the domain root of `start_url`, not the URL itself. Its
    /// `PAGE_COMPLETED` event is queued before this returns.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStream)` - Yields the `MAIN_PAGE` result first, then supporting pages
    /// * `Err(ScrapeError::InvalidStartUrl)` - `start_url` is not an absolute HTTP(S) URL
    /// * `Err(ScrapeError::HomePage)` - The home page could not be rendered
    pub async fn start(self, start_url: &str) -> crate::Result<CrawlStream> {
        let started = Instant::now();
        let mut phases = PhaseTracker::new();

        let start = parse_start_url(start_url)
            .map_err(|e| ScrapeError::InvalidStartUrl(format!("{}: {}", start_url, e)))?;
        let root = domain_root(&start);
        let homepage = Url::parse(&root)?;

        tracing::info!(site_id = %self.site_id, "Rendering home page {}", root);
        let settle = Duration::from_millis(self.config.home_settle_ms);
        let home = self
            .renderer
            .render(&root, settle)
            .await
            .map_err(|e| {
                tracing::error!(site_id = %self.site_id, "Home page {} failed: {}", root, e);
                ScrapeError::HomePage {
                    url: root.clone(),
                    message: e.to_string(),
                }
            })?;

        let main_page = PageResult::main_page(root.clone(), home.content);
        self.notifier
            .notify(CrawlEvent::page_completed(&self.site_id, main_page.clone()));

        let Coordinator {
            renderer,
            discoverer,
            config,
            notifier,
            site_id,
        } = self;
        let already_processed = [normalize_candidate(start.as_str()), root.clone()];
        let home_links = home.links;
        let start_url = start.to_string();

        let stream = async_stream::stream! {
            let mut stats = CrawlStatistics::default();

            stats.pages_emitted += 1;
            yield main_page;

            enter(&mut phases, CrawlPhase::Discover);
            let mut queue = DiscoveryQueue::new(already_processed);
            queue.extend(discoverer.discover(&homepage, &home_links).await);
            stats.candidates_discovered = queue.len();
            tracing::info!(site_id = %site_id, "Discovered {} candidate pages", queue.len());

            enter(&mut phases, CrawlPhase::Prioritize);
            let selected = prioritize(queue.into_candidates(), config.page_limit);
            stats.pages_selected = selected.len();

            enter(&mut phases, CrawlPhase::FetchBatch);
            let gate = RenderGate::new(config.max_concurrent_renders);
            let settle = Duration::from_millis(config.page_settle_ms);
            let mut tasks = JoinSet::new();
            for url in selected {
                tasks.spawn(render_supporting(
                    url,
                    renderer.clone(),
                    gate.clone(),
                    notifier.clone(),
                    site_id.clone(),
                    settle,
                ));
            }
            tracing::debug!(
                "Scheduled {} renders, at most {} at a time",
                tasks.len(),
                gate.capacity()
            );

            enter(&mut phases, CrawlPhase::Drain);
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Some(page)) => {
                        stats.pages_rendered += 1;
                        if page.exceeds(config.min_content_length) {
                            stats.pages_emitted += 1;
                            yield page;
                        } else {
                            stats.pages_filtered += 1;
                            tracing::debug!(
                                "Dropping {} ({} chars, needs more than {})",
                                page.url,
                                page.content_len(),
                                config.min_content_length
                            );
                        }
                    }
                    Ok(None) => stats.pages_failed += 1,
                    Err(e) => {
                        stats.pages_failed += 1;
                        tracing::warn!("Render task ended abnormally: {}", e);
                    }
                }
            }

            enter(&mut phases, CrawlPhase::Done);
            stats.elapsed = started.elapsed();
            notifier.notify(CrawlEvent::completed(&site_id, stats.elapsed));
            stats.log(&start_url);
        };

        Ok(Box::pin(stream))
    }
}

/// Moves the tracker forward, logging if the pipeline skipped a phase
fn enter(phases: &mut PhaseTracker, next: CrawlPhase) {
    if let Err((from, to)) = phases.advance(next) {
        tracing::error!("Invalid crawl phase transition: {} -> {}", from, to);
    }
}

/// Renders one supporting page while holding a render permit
///
/// A successful render queues its `PAGE_COMPLETED` event immediately, whatever
/// its content length. Failures are logged and reported as `None`.
async fn render_supporting(
    url: String,
    renderer: Arc<dyn Renderer>,
    gate: RenderGate,
    notifier: NotifierHandle,
    site_id: String,
    settle: Duration,
) -> Option<PageResult> {
    let _permit = match gate.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::warn!(url = %url, "Render gate closed: {}", e);
            return None;
        }
    };
    tracing::debug!(
        url = %url,
        in_flight = gate.in_flight(),
        capacity = gate.capacity(),
        "Render started"
    );

    match renderer.render(&url, settle).await {
        Ok(rendered) => {
            tracing::debug!(url = %url, "Rendered {} chars", rendered.content.chars().count());
            let page = PageResult::supporting(url, rendered.content);
            notifier.notify(CrawlEvent::page_completed(&site_id, page.clone()));
            Some(page)
        }
        Err(e) => {
            tracing::warn!(url = %url, "Render failed: {}", e);
            None
        }
    }
}

/// Starts a crawl with collaborators built from `config`
///
/// This is the main entry point for embedding the crawler. Events go to
/// `notifier`; the caller owns delivery.
///
/// # Arguments
///
/// * `start_url` - Any URL on the site; the crawl starts from its domain root
/// * `site_id` - Opaque identifier echoed in every event
/// * `config` - The crawler configuration
/// * `notifier` - Receives crawl events
///
/// # Returns
///
/// * `Ok(CrawlStream)` - The home page rendered; the stream yields it first
/// * `Err(ScrapeError)` - The crawl could not start
pub async fn crawl(
    start_url: &str,
    site_id: &str,
    config: &Config,
    notifier: NotifierHandle,
) -> crate::Result<CrawlStream> {
    Coordinator::from_config(config, notifier, site_id)?
        .start(start_url)
        .await
}
