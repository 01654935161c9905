use crate::config::{validate_crawler_config, CrawlerConfig};
use crate::crawler::Coordinator;
use crate::output::{to_ndjson_line, NDJSON_CONTENT_TYPE};
use crate::server::AppState;
use crate::ScrapeError;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Body of `POST /scrape`
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: String,

    pub site_id: String,

    /// Overrides `crawler.page-limit` for this crawl
    #[serde(default)]
    pub page_limit: Option<usize>,

    /// Overrides `crawler.max-concurrent-renders` for this crawl
    #[serde(default)]
    pub max_concurrent_renders: Option<usize>,
}

impl ScrapeRequest {
    /// Applies this request's overrides on top of the server's crawler settings
    pub fn crawler_config(&self, base: &CrawlerConfig) -> crate::Result<CrawlerConfig> {
        let mut config = base.clone();
        if let Some(page_limit) = self.page_limit {
            config.page_limit = page_limit;
        }
        if let Some(max_concurrent_renders) = self.max_concurrent_renders {
            config.max_concurrent_renders = max_concurrent_renders;
        }
        validate_crawler_config(&config)?;
        Ok(config)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ready".to_string(),
    })
}

/// Starts a crawl and streams one JSON page result per line
///
/// The home page is rendered before the response starts, so its failure is
/// reported as a 502 with no stream.
pub async fn scrape_handler(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Response, ApiError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "URL is required"));
    }

    let crawler_config = request
        .crawler_config(&state.config.crawler)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(site_id = %request.site_id, "Scrape requested for {}", url);

    let coordinator = Coordinator::new(
        state.renderer.clone(),
        state.discoverer.clone(),
        crawler_config,
        state.notifier.clone(),
        request.site_id.clone(),
    );

    let pages = coordinator.start(url).await.map_err(|e| match e {
        ScrapeError::InvalidStartUrl(_) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        ScrapeError::HomePage { .. } => api_error(StatusCode::BAD_GATEWAY, e.to_string()),
        other => {
            tracing::error!("Crawl could not start: {}", other);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    })?;

    let lines = pages.filter_map(|page| async move {
        match to_ndjson_line(&page) {
            Ok(line) => {
                tracing::info!("Streaming: {}", page.url);
                Some(Ok::<_, Infallible>(line))
            }
            Err(e) => {
                tracing::error!("Failed to encode {}: {}", page.url, e);
                None
            }
        }
    });

    Ok((
        [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
        Body::from_stream(lines),
    )
        .into_response())
}
