//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The pipeline phases (render home, discover, prioritize, fetch, drain, done)
//! - `PhaseTracker`: Enforces forward-only, single-step movement through the phases

mod crawl_phase;

// Re-export main types
pub use crawl_phase::{CrawlPhase, PhaseTracker};
