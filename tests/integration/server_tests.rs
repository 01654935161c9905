//! HTTP transport tests driven through the router without a socket

use crate::common::{text, StubRenderer, ROOT};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use sumi_scrape::config::Config;
use sumi_scrape::crawler::{Discoverer, NoSitemap};
use sumi_scrape::server::{router, AppState};
use sumi_scrape::{NotifierHandle, PageKind, PageResult};
use tower::ServiceExt;

fn app(renderer: StubRenderer) -> axum::Router {
    let mut config = Config::new(5);
    config.crawler.home_settle_ms = 0;
    config.crawler.page_settle_ms = 0;

    let (notifier, _rx) = NotifierHandle::channel();
    router(AppState::new(
        config,
        Arc::new(renderer),
        Discoverer::new(Arc::new(NoSitemap)),
        notifier,
    ))
}

fn scrape_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(StubRenderer::new())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, serde_json::json!({"status": "ready"}));
}

#[tokio::test]
async fn test_scrape_streams_ndjson() {
    let renderer = StubRenderer::new()
        .page(ROOT, &text(300), &["https://example.com/about"])
        .page("https://example.com/about", &text(300), &[]);

    let response = app(renderer)
        .oneshot(scrape_request(serde_json::json!({
            "url": "https://example.com/landing",
            "site_id": "site-7"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-ndjson"
    );

    let body = body_text(response).await;
    assert!(body.ends_with('\n'));
    let pages: Vec<PageResult> = body
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].kind, PageKind::MainPage);
    assert_eq!(pages[0].url, ROOT);
    assert_eq!(pages[1].url, "https://example.com/about");
}

#[tokio::test]
async fn test_scrape_rejects_empty_url() {
    let response = app(StubRenderer::new())
        .oneshot(scrape_request(serde_json::json!({"url": "  ", "site_id": "s"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "URL is required");
}

#[tokio::test]
async fn test_scrape_rejects_invalid_url() {
    let response = app(StubRenderer::new())
        .oneshot(scrape_request(serde_json::json!({"url": "ftp://example.com", "site_id": "s"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scrape_rejects_invalid_overrides() {
    let response = app(StubRenderer::new())
        .oneshot(scrape_request(serde_json::json!({
            "url": "https://example.com",
            "site_id": "s",
            "max_concurrent_renders": 0
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scrape_requires_site_id() {
    let response = app(StubRenderer::new())
        .oneshot(scrape_request(serde_json::json!({"url": "https://example.com"})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_home_failure_is_bad_gateway() {
    let response = app(StubRenderer::new().failing(ROOT))
        .oneshot(scrape_request(serde_json::json!({
            "url": "https://example.com",
            "site_id": "s"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("https://example.com"));
}
