//! Crawler module for site discovery and rendering
//!
//! This module contains the core crawling logic, including:
//! - Anchor extraction from rendered pages
//! - Sitemap walking and candidate discovery
//! - Page selection and render concurrency
//! - Overall crawl coordination as a stream of results

mod coordinator;
pub mod discovery;
mod parser;
mod scheduler;

pub use coordinator::{crawl, Coordinator, CrawlStream};
pub use discovery::{
    Discoverer, DiscoveryError, DiscoveryQueue, HttpSitemapSource, NoSitemap, SitemapSource,
};
pub use parser::extract_anchor_links;
pub use scheduler::{prioritize, QueuedUrl, RenderGate};
