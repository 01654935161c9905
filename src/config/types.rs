use serde::Deserialize;

/// Default webhook endpoint used when neither the config file nor the
/// environment names one
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:8000/ingest/progress";

/// Default browser identity presented to crawled sites
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Main configuration structure for Sumi-Scrape
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Creates a configuration with every optional value at its default
    ///
    /// The page limit has no default and must always be chosen by the caller.
    pub fn new(page_limit: usize) -> Self {
        Self {
            crawler: CrawlerConfig::new(page_limit),
            renderer: RendererConfig::default(),
            webhook: WebhookConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Crawl pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of supporting pages fetched per crawl
    #[serde(rename = "page-limit")]
    pub page_limit: usize,

    /// Maximum number of renders running at once
    #[serde(rename = "max-concurrent-renders", default = "default_max_concurrent_renders")]
    pub max_concurrent_renders: usize,

    /// Supporting pages must have more than this many characters to be streamed
    #[serde(rename = "min-content-length", default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Settle delay after loading the home page (milliseconds)
    #[serde(rename = "home-settle-ms", default = "default_home_settle_ms")]
    pub home_settle_ms: u64,

    /// Settle delay after loading a supporting page (milliseconds)
    #[serde(rename = "page-settle-ms", default = "default_page_settle_ms")]
    pub page_settle_ms: u64,
}

impl CrawlerConfig {
    pub fn new(page_limit: usize) -> Self {
        Self {
            page_limit,
            max_concurrent_renders: default_max_concurrent_renders(),
            min_content_length: default_min_content_length(),
            home_settle_ms: default_home_settle_ms(),
            page_settle_ms: default_page_settle_ms(),
        }
    }
}

/// Which rendering engine backs the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderEngine {
    /// Headless Chrome, one isolated session per render
    #[default]
    Browser,
    /// Plain HTTP fetch without script execution
    Http,
}

/// Rendering engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default)]
    pub engine: RenderEngine,

    /// Client identity string sent by every session
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound on a single navigation plus extraction (seconds)
    #[serde(rename = "navigation-timeout-secs", default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Explicit Chrome binary; auto-detected when absent
    #[serde(rename = "chrome-executable", default)]
    pub chrome_executable: Option<String>,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            engine: RenderEngine::default(),
            user_agent: default_user_agent(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            chrome_executable: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

/// Webhook delivery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint receiving crawl events
    #[serde(default = "default_webhook_url")]
    pub url: String,

    /// Total delivery attempts per event
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "backoff-ms", default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Per-attempt request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the server listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_max_concurrent_renders() -> usize {
    1
}

fn default_min_content_length() -> usize {
    150
}

fn default_home_settle_ms() -> u64 {
    4000
}

fn default_page_settle_ms() -> u64 {
    1500
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_webhook_url() -> String {
    DEFAULT_WEBHOOK_URL.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}
