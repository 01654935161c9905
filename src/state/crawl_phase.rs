//! Crawl phase definitions for tracking pipeline progress
//!
//! A crawl walks the phases strictly forward, one step at a time, and visits
//! each phase exactly once.

use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrawlPhase {
    /// Rendering the domain root and emitting it as the main page
    RenderHome,

    /// Collecting candidates from the sitemap and home page links
    Discover,

    /// Ranking candidates and truncating to the page limit
    Prioritize,

    /// Scheduling supporting page renders behind the concurrency gate
    FetchBatch,

    /// Emitting supporting pages in completion order
    Drain,

    /// Crawl finished; completion event sent and stream closed
    Done,
}

impl CrawlPhase {
    /// Returns the phase that follows this one, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::RenderHome => Some(Self::Discover),
            Self::Discover => Some(Self::Prioritize),
            Self::Prioritize => Some(Self::FetchBatch),
            Self::FetchBatch => Some(Self::Drain),
            Self::Drain => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if moving from this phase to `to` is allowed
    ///
    /// Only the single forward step is valid; skipping and going back are not.
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the log representation of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RenderHome => "render_home",
            Self::Discover => "discover",
            Self::Prioritize => "prioritize",
            Self::FetchBatch => "fetch_batch",
            Self::Drain => "drain",
            Self::Done => "done",
        }
    }

    /// Returns all phases in pipeline order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::RenderHome,
            Self::Discover,
            Self::Prioritize,
            Self::FetchBatch,
            Self::Drain,
            Self::Done,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks a single crawl's progress through its phases
#[derive(Debug)]
pub struct PhaseTracker {
    current: CrawlPhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: CrawlPhase::RenderHome,
        }
    }

    pub fn current(&self) -> CrawlPhase {
        self.current
    }

    /// Moves to `to`, returning the previous phase
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlPhase)` - The phase that was left
    /// * `Err((from, to))` - The transition is not a single forward step
    pub fn advance(&mut self, to: CrawlPhase) -> Result<CrawlPhase, (CrawlPhase, CrawlPhase)> {
        let from = self.current;
        if !from.can_transition_to(to) {
            return Err((from, to));
        }
        tracing::debug!("Crawl phase {} -> {}", from, to);
        self.current = to;
        Ok(from)
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
