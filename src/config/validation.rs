use crate::config::types::{Config, CrawlerConfig, RendererConfig, ServerConfig, WebhookConfig};
use crate::{ConfigError, ConfigResult};
use std::net::SocketAddr;
use url::Url;

/// Upper bound on simultaneous browser sessions
const MAX_CONCURRENT_RENDERS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_webhook_config(&config.webhook)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates crawler configuration
///
/// Public so per-request overrides can be checked with the same rules.
pub fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "page_limit must be >= 1, got {}",
            config.page_limit
        )));
    }

    if config.max_concurrent_renders < 1 || config.max_concurrent_renders > MAX_CONCURRENT_RENDERS
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_renders must be between 1 and {}, got {}",
            MAX_CONCURRENT_RENDERS, config.max_concurrent_renders
        )));
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.navigation_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "navigation_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    Ok(())
}

/// Validates webhook configuration
fn validate_webhook_config(config: &WebhookConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webhook url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Webhook url must use http or https, got '{}'",
            config.url
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> ConfigResult<()> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid bind address '{}': {}", config.bind, e))
    })?;
    Ok(())
}
