use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides (`WEBHOOK_URL`, `MAX_CONCURRENT_RENDERS`, `PAGE_LIMIT`)
/// are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_scrape::config::load_config;
///
/// let config = load_config(Path::new("scrape.toml")).unwrap();
/// println!("Webhook: {}", config.webhook.url);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, |name| std::env::var(name).ok())
}

/// Parses configuration text, applies overrides from `env`, and validates
pub fn parse_config<F>(content: &str, env: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content)?;
    apply_env_overrides(&mut config, env)?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment-style overrides to a configuration
///
/// `WEBHOOK_URL` wins over the legacy `BACKEND_WEBHOOK_URL` when both are set.
pub fn apply_env_overrides<F>(config: &mut Config, env: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("WEBHOOK_URL").or_else(|| env("BACKEND_WEBHOOK_URL")) {
        config.webhook.url = url;
    }

    if let Some(value) = env("MAX_CONCURRENT_RENDERS") {
        config.crawler.max_concurrent_renders = parse_env("MAX_CONCURRENT_RENDERS", &value)?;
    }

    if let Some(value) = env("PAGE_LIMIT") {
        config.crawler.page_limit = parse_env("PAGE_LIMIT", &value)?;
    }

    Ok(())
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a crawl's behavior can be tied to the exact file it ran with.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
