//! Sumi-Scrape main entry point
//!
//! This is the command-line interface for the Sumi-Scrape site scraper.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use std::net::SocketAddr;
use std::path::PathBuf;
use sumi_scrape::config::{
    apply_env_overrides, load_config_with_hash, validate, Config, RenderEngine,
};
use sumi_scrape::notify::{NotificationDispatcher, WebhookNotifier};
use sumi_scrape::output::to_ndjson_line;
use sumi_scrape::server::{self, AppState};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

/// Sumi-Scrape: a streaming site scraper
///
/// Sumi-Scrape renders a site's home page and its most prominent supporting
/// pages in a headless browser, and streams their content as markdown while
/// reporting progress to a webhook.
#[derive(Parser, Debug)]
#[command(name = "sumi-scrape")]
#[command(version = "1.0.0")]
#[command(about = "A streaming site scraper", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the scrape API over HTTP
    Serve {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Address to listen on (overrides `server.bind`)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Crawl one site and write NDJSON results to stdout
    Crawl {
        /// Any URL on the site to crawl
        #[arg(value_name = "URL")]
        url: String,

        /// Identifier echoed in every webhook event
        #[arg(long)]
        site_id: String,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

#[derive(Args, Debug)]
struct SettingsArgs {
    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of supporting pages to render (required without --config)
    #[arg(long)]
    page_limit: Option<usize>,

    /// Maximum number of renders in flight
    #[arg(long)]
    max_concurrent_renders: Option<usize>,

    /// Rendering engine
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Browser,
    Http,
}

impl From<EngineArg> for RenderEngine {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Browser => RenderEngine::Browser,
            EngineArg::Http => RenderEngine::Http,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pure NDJSON
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve { settings, bind } => handle_serve(&settings, bind).await,
        Command::Crawl {
            url,
            site_id,
            settings,
        } => handle_crawl(&url, &site_id, &settings).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scrape=info,warn"),
            1 => EnvFilter::new("sumi_scrape=debug,info"),
            2 => EnvFilter::new("sumi_scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and layers command-line overrides on top
fn resolve_config(settings: &SettingsArgs) -> anyhow::Result<Config> {
    let mut config = match &settings.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            let page_limit = match settings.page_limit {
                Some(page_limit) => page_limit,
                None => match std::env::var("PAGE_LIMIT") {
                    Ok(value) => value
                        .trim()
                        .parse()
                        .with_context(|| format!("Invalid PAGE_LIMIT: {}", value))?,
                    Err(_) => bail!("--page-limit is required when no --config is given"),
                },
            };
            let mut config = Config::new(page_limit);
            apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
            config
        }
    };

    if let Some(page_limit) = settings.page_limit {
        config.crawler.page_limit = page_limit;
    }
    if let Some(max_concurrent_renders) = settings.max_concurrent_renders {
        config.crawler.max_concurrent_renders = max_concurrent_renders;
    }
    if let Some(engine) = settings.engine {
        config.renderer.engine = engine.into();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles `serve`: runs the HTTP API until interrupted
async fn handle_serve(settings: &SettingsArgs, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    let mut config = resolve_config(settings)?;
    if let Some(bind) = bind {
        config.server.bind = bind.to_string();
    }
    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

    let dispatcher = NotificationDispatcher::spawn(WebhookNotifier::new(&config.webhook)?);
    tracing::info!("Webhook: {}", config.webhook.url);

    let state = AppState::from_config(config, dispatcher.handle())?;
    server::serve(state, bind).await?;

    let report = dispatcher.shutdown().await;
    tracing::info!(
        "Notifications: {} delivered, {} failed",
        report.delivered,
        report.failed
    );
    Ok(())
}

/// Handles `crawl`: streams one site's results to stdout
async fn handle_crawl(url: &str, site_id: &str, settings: &SettingsArgs) -> anyhow::Result<()> {
    let config = resolve_config(settings)?;
    let dispatcher = NotificationDispatcher::spawn(WebhookNotifier::new(&config.webhook)?);

    let mut pages = match sumi_scrape::crawl(url, site_id, &config, dispatcher.handle()).await {
        Ok(pages) => pages,
        Err(e) => {
            dispatcher.shutdown().await;
            return Err(e).context("Crawl failed");
        }
    };

    let mut stdout = tokio::io::stdout();
    let mut written = 0usize;
    while let Some(page) = pages.next().await {
        let line = to_ndjson_line(&page)?;
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
        written += 1;
    }
    drop(pages);

    let report = dispatcher.shutdown().await;
    tracing::info!(
        "Wrote {} pages; notifications: {} delivered, {} failed",
        written,
        report.delivered,
        report.failed
    );
    Ok(())
}
