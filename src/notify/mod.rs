//! Notification module for backend progress updates
//!
//! This module handles:
//! - The `CrawlEvent` payload posted to the backend
//! - Webhook delivery with bounded retries and fixed backoff
//! - A detached dispatcher that keeps delivery off the output path
//!
//! Webhook failures are logged and swallowed; they never reach the crawl.

mod dispatcher;
mod event;
mod webhook;

pub use dispatcher::{DeliveryReport, NotificationDispatcher, NotifierHandle};
pub use event::{CrawlEvent, EventStatus};
pub use webhook::{NotifyError, WebhookNotifier};
