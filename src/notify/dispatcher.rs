//! Detached webhook delivery
//!
//! Events are queued on an unbounded channel and delivered one at a time by a
//! background task, so a slow or failing webhook never holds up the output
//! stream. Delivery order follows send order.

use crate::notify::{CrawlEvent, WebhookNotifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Cheap, cloneable sender of crawl events
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    tx: mpsc::UnboundedSender<CrawlEvent>,
}

impl NotifierHandle {
    /// Creates a handle whose events land on the returned receiver
    ///
    /// Useful for embedding the pipeline with a custom consumer and in tests.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues an event for delivery without waiting
    pub fn notify(&self, event: CrawlEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(
                site_id = %e.0.site_id,
                "Notification queue closed, dropping {:?} event",
                e.0.status
            );
        }
    }
}

/// Owns the background task that drains the notification queue
pub struct NotificationDispatcher {
    handle: NotifierHandle,
    worker: JoinHandle<DeliveryReport>,
}

/// Outcome counts reported when a dispatcher shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl NotificationDispatcher {
    /// Spawns the delivery task on the current tokio runtime
    pub fn spawn(notifier: WebhookNotifier) -> Self {
        let (handle, mut rx) = NotifierHandle::channel();

        let worker = tokio::spawn(async move {
            let mut report = DeliveryReport::default();
            while let Some(event) = rx.recv().await {
                if notifier.deliver(&event).await {
                    report.delivered += 1;
                } else {
                    report.failed += 1;
                }
            }
            report
        });

        tracing::debug!("Notification dispatcher started");
        Self { handle, worker }
    }

    /// Returns a sender for this dispatcher's queue
    pub fn handle(&self) -> NotifierHandle {
        self.handle.clone()
    }

    /// Closes the queue and waits until every queued event has been attempted
    ///
    /// The queue only closes once all handles obtained from [`Self::handle`]
    /// have been dropped as well.
    pub async fn shutdown(self) -> DeliveryReport {
        drop(self.handle);
        match self.worker.await {
            Ok(report) => {
                tracing::debug!(
                    delivered = report.delivered,
                    failed = report.failed,
                    "Notification dispatcher drained"
                );
                report
            }
            Err(e) => {
                tracing::error!("Notification worker ended abnormally: {}", e);
                DeliveryReport::default()
            }
        }
    }
}
