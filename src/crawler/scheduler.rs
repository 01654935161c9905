//! Page selection and render concurrency
//!
//! This module handles:
//! - Ordering candidates shallowest first and cutting them to the page limit
//! - Gating concurrent renders with a semaphore

use crate::url::path_depth;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// A candidate URL with its selection key
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// The candidate URL
    pub url: String,

    /// Number of `/` characters in the URL path
    pub depth: usize,
}

impl QueuedUrl {
    pub fn new(url: String) -> Self {
        let depth = path_depth(&url);
        Self { url, depth }
    }

    fn length(&self) -> usize {
        self.url.chars().count()
    }
}

// Lower (depth, length, url) is selected first, so comparison is reversed for BinaryHeap
impl Ord for QueuedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .depth
            .cmp(&self.depth)
            .then_with(|| other.length().cmp(&self.length()))
            .then_with(|| other.url.cmp(&self.url))
    }
}

impl PartialOrd for QueuedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for QueuedUrl {}

/// Selects the pages to render after the home page
///
/// Candidates are ordered by path depth, then URL length, then lexically, and
/// the first `page_limit` are kept. The home page does not count against it.
///
/// # Arguments
///
/// * `candidates` - Normalized candidate URLs, already deduplicated
/// * `page_limit` - Maximum number of supporting pages rendered
///
/// # Returns
///
/// The selected URLs in selection order
pub fn prioritize<I>(candidates: I, page_limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut frontier: BinaryHeap<QueuedUrl> = candidates.into_iter().map(QueuedUrl::new).collect();

    let mut selected = Vec::with_capacity(page_limit.min(frontier.len()));
    while selected.len() < page_limit {
        match frontier.pop() {
            Some(queued) => selected.push(queued.url),
            None => break,
        }
    }

    tracing::debug!(
        "Selected {} of {} candidates (limit {})",
        selected.len(),
        selected.len() + frontier.len(),
        page_limit
    );

    selected
}

/// Bounds the number of renders in flight
///
/// Each render holds an owned permit for its whole duration; dropping the
/// permit, including on task abort, frees the slot.
#[derive(Debug, Clone)]
pub struct RenderGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl RenderGate {
    /// Creates a gate admitting `capacity` renders at once (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a render slot
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of renders currently admitted
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}
