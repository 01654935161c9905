//! Webhook client with bounded retries
//!
//! Every attempt is a JSON POST with its own timeout. Only an explicit HTTP 200
//! counts as delivered; any other status, timeout, or network error is retried
//! after a fixed backoff until the attempts run out.

use crate::config::WebhookConfig;
use crate::notify::CrawlEvent;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors from a single delivery attempt
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook answered with status {0}")]
    Status(u16),
}

/// Delivers crawl events to the backend webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    max_attempts: u32,
    backoff: Duration,
    timeout: Duration,
}

impl WebhookNotifier {
    /// Builds a notifier from the webhook configuration
    ///
    /// # Returns
    ///
    /// * `Ok(WebhookNotifier)` - Ready to deliver
    /// * `Err(reqwest::Error)` - Failed to build the HTTP client
    pub fn new(config: &WebhookConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Returns the endpoint events are posted to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Delivers an event, retrying on failure
    ///
    /// Never fails: the final failure is logged and `false` returned.
    ///
    /// # Returns
    ///
    /// * `true` - The webhook acknowledged with HTTP 200
    /// * `false` - Every attempt failed
    pub async fn deliver(&self, event: &CrawlEvent) -> bool {
        for attempt in 1..=self.max_attempts {
            match self.attempt(event).await {
                Ok(()) => {
                    tracing::debug!(
                        site_id = %event.site_id,
                        status = ?event.status,
                        attempt,
                        "Webhook delivered"
                    );
                    return true;
                }
                Err(e) if attempt == self.max_attempts => {
                    tracing::error!(
                        site_id = %event.site_id,
                        status = ?event.status,
                        "Webhook permanently failed after {} attempts: {}",
                        attempt,
                        e
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        site_id = %event.site_id,
                        attempt,
                        "Webhook attempt failed, retrying in {:?}: {}",
                        self.backoff,
                        e
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }

        false
    }

    /// Makes a single delivery attempt
    async fn attempt(&self, event: &CrawlEvent) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(NotifyError::Status(response.status().as_u16()))
        }
    }
}
