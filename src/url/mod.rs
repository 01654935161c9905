//! URL handling module for Sumi-Scrape
//!
//! This module provides start URL validation, candidate normalization for
//! deduplication, domain root derivation, and the path depth used to rank
//! discovered pages.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{domain_root, extract_netloc, is_same_site, path_depth};
pub use normalize::{normalize_candidate, parse_start_url};
