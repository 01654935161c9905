//! Sumi-Scrape: a streaming site scraper
//!
//! This crate crawls a website from a start URL, renders each page in a headless
//! browser, extracts readable markdown, and streams per-page results to the caller
//! while notifying a backend webhook as pages complete.

pub mod config;
pub mod crawler;
pub mod notify;
pub mod output;
pub mod render;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scrape operations
///
/// Only [`ScrapeError::HomePage`] ends a crawl once it has started. Per-page,
/// sitemap, and webhook failures are contained inside the pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Home page {url} could not be rendered: {message}")]
    HomePage { url: String, message: String },

    #[error("Invalid start URL: {0}")]
    InvalidStartUrl(String),

    #[error("Renderer error: {0}")]
    Render(#[from] render::RenderError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid environment override {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlStream};
pub use notify::{CrawlEvent, EventStatus, NotificationDispatcher, NotifierHandle};
pub use output::{PageKind, PageResult};
pub use render::{RenderError, RenderedPage, Renderer};
pub use state::CrawlPhase;
pub use url::{domain_root, normalize_candidate, path_depth};
