//! Per-crawl statistics
//!
//! Collected by the coordinator while a crawl runs and logged once it is done.
//! They are the only place where "no supporting pages existed" and "every
//! supporting render failed" can be told apart.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Distinct candidates left after discovery
    pub candidates_discovered: usize,

    /// Candidates kept after prioritization and truncation
    pub pages_selected: usize,

    /// Supporting pages rendered successfully
    pub pages_rendered: usize,

    /// Supporting pages whose render failed
    pub pages_failed: usize,

    /// Rendered supporting pages held back for being too short
    pub pages_filtered: usize,

    /// Results written to the output stream, main page included
    pub pages_emitted: usize,

    /// Wall-clock duration of the whole crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Fraction of selected pages that rendered successfully, as a percentage
    pub fn render_success_rate(&self) -> f64 {
        if self.pages_selected == 0 {
            return 100.0;
        }
        (self.pages_rendered as f64 / self.pages_selected as f64) * 100.0
    }

    /// Logs the statistics at info level
    pub fn log(&self, start_url: &str) {
        tracing::info!(
            start_url,
            discovered = self.candidates_discovered,
            selected = self.pages_selected,
            rendered = self.pages_rendered,
            failed = self.pages_failed,
            filtered = self.pages_filtered,
            emitted = self.pages_emitted,
            "Crawl finished in {:.2}s ({:.1}% of selected pages rendered)",
            self.elapsed.as_secs_f64(),
            self.render_success_rate()
        );
    }
}
