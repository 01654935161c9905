//! HTTP transport for the crawler
//!
//! - `POST /scrape` starts a crawl and streams its results as NDJSON
//! - `GET /health` reports readiness
//!
//! All requests share one renderer, one sitemap client and one notification
//! queue. Dropping a client connection drops its crawl stream.

mod handlers;

pub use handlers::{ErrorResponse, HealthResponse, ScrapeRequest};

use crate::config::Config;
use crate::crawler::{Discoverer, HttpSitemapSource};
use crate::notify::NotifierHandle;
use crate::render::{build_renderer, Renderer};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Shared state injected into every route handler via `State<AppState>`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub renderer: Arc<dyn Renderer>,
    pub discoverer: Discoverer,
    pub notifier: NotifierHandle,
}

impl AppState {
    pub fn new(
        config: Config,
        renderer: Arc<dyn Renderer>,
        discoverer: Discoverer,
        notifier: NotifierHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            renderer,
            discoverer,
            notifier,
        }
    }

    /// Builds the configured renderer and an HTTP sitemap walker
    pub fn from_config(config: Config, notifier: NotifierHandle) -> crate::Result<Self> {
        let renderer = build_renderer(&config.renderer)?;
        let sitemap = HttpSitemapSource::new(
            &config.renderer.user_agent,
            Duration::from_secs(config.renderer.navigation_timeout_secs),
        )?;
        tracing::info!("Using {} renderer", renderer.name());

        Ok(Self::new(
            config,
            renderer,
            Discoverer::new(Arc::new(sitemap)),
            notifier,
        ))
    }
}

/// Builds the application router
///
/// Separate from [`serve`] so tests can drive it without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scrape", post(handlers::scrape_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
}

/// Serves the router on `bind` until Ctrl-C
pub async fn serve(state: AppState, bind: SocketAddr) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
