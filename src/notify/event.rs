use crate::output::PageResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Progress status carried by a crawl event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// A single page finished rendering
    PageCompleted,
    /// The whole crawl finished
    Completed,
}

/// Payload posted to the backend webhook
///
/// `data` is present only for [`EventStatus::PageCompleted`] and `total_time`
/// only for [`EventStatus::Completed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlEvent {
    pub site_id: String,

    pub status: EventStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PageResult>,

    /// Crawl duration in seconds, rounded to two decimals
    #[serde(rename = "total_time", default, skip_serializing_if = "Option::is_none")]
    pub total_time_seconds: Option<f64>,
}

impl CrawlEvent {
    pub fn page_completed(site_id: impl Into<String>, page: PageResult) -> Self {
        Self {
            site_id: site_id.into(),
            status: EventStatus::PageCompleted,
            data: Some(page),
            total_time_seconds: None,
        }
    }

    pub fn completed(site_id: impl Into<String>, elapsed: Duration) -> Self {
        let seconds = (elapsed.as_secs_f64() * 100.0).round() / 100.0;
        Self {
            site_id: site_id.into(),
            status: EventStatus::Completed,
            data: None,
            total_time_seconds: Some(seconds),
        }
    }
}
