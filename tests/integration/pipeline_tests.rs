//! End-to-end pipeline tests over a stub renderer

use crate::common::{coordinator, crawler_config, text, StubRenderer, ROOT};
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use sumi_scrape::config::CrawlerConfig;
use sumi_scrape::crawler::prioritize;
use sumi_scrape::notify::{CrawlEvent, EventStatus};
use sumi_scrape::{NotifierHandle, PageKind, PageResult, ScrapeError};
use tokio::sync::mpsc::UnboundedReceiver;

fn drain_events(rx: &mut UnboundedReceiver<CrawlEvent>) -> Vec<CrawlEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_main_page_emitted_first_from_domain_root() {
    let renderer = Arc::new(
        StubRenderer::new()
            .page(ROOT, &text(2000), &["https://example.com/about"])
            .page("https://example.com/about", &text(400), &[]),
    );
    let (notifier, _rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(5, 1), notifier)
        .start("https://example.com/blog/post?ref=x")
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].kind, PageKind::MainPage);
    assert_eq!(pages[0].url, ROOT);
    assert_eq!(pages[1].kind, PageKind::SupportingData);
    assert_eq!(pages[1].url, "https://example.com/about");
    assert_eq!(renderer.calls()[0], ROOT);
}

#[tokio::test]
async fn test_prioritize_keeps_shallow_pages() {
    let renderer = Arc::new(
        StubRenderer::new()
            .page(
                ROOT,
                &text(2000),
                &[
                    "https://example.com/a",
                    "https://example.com/b/c",
                    "https://example.com/b",
                ],
            )
            .page("https://example.com/a", &text(300), &[])
            .page("https://example.com/b", &text(300), &[])
            .page("https://example.com/b/c", &text(300), &[]),
    );
    let (notifier, _rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(2, 1), notifier)
        .start("https://example.com/blog/post")
        .await
        .unwrap()
        .collect()
        .await;

    let rendered: HashSet<String> = renderer.calls().into_iter().skip(1).collect();
    assert_eq!(
        rendered,
        HashSet::from([
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string()
        ])
    );
    assert_eq!(pages.len(), 3);
}

#[tokio::test]
async fn test_page_limit_caps_supporting_renders() {
    let links: Vec<String> = (0..20).map(|i| format!("https://example.com/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let mut stub = StubRenderer::new().page(ROOT, &text(500), &link_refs);
    for link in &links {
        stub = stub.page(link, &text(500), &[]);
    }
    let renderer = Arc::new(stub);
    let (notifier, _rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(4, 3), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(renderer.calls().len(), 1 + 4);
    assert_eq!(pages.len(), 1 + 4);
}

#[tokio::test]
async fn test_start_url_and_root_never_rerendered() {
    let renderer = Arc::new(
        StubRenderer::new()
            .page(
                ROOT,
                &text(500),
                &[
                    "https://example.com/",
                    "https://example.com/#top",
                    "https://example.com/blog/post/",
                    "https://example.com/blog/post#comments",
                    "https://example.com/pricing",
                ],
            )
            .page("https://example.com/pricing", &text(500), &[]),
    );
    let (notifier, _rx) = NotifierHandle::channel();

    let _: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(10, 1), notifier)
        .start("https://example.com/blog/post")
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(
        renderer.calls(),
        vec![ROOT.to_string(), "https://example.com/pricing".to_string()]
    );
}

#[tokio::test]
async fn test_offsite_links_ignored() {
    let renderer = Arc::new(StubRenderer::new().page(
        ROOT,
        &text(500),
        &["https://twitter.com/example", "https://other.org/page"],
    ));
    let (notifier, _rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(10, 1), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(pages.len(), 1);
    assert_eq!(renderer.calls(), vec![ROOT.to_string()]);
}

#[tokio::test]
async fn test_short_pages_filtered_but_still_notified() {
    let renderer = Arc::new(
        StubRenderer::new()
            .page(
                ROOT,
                &text(10),
                &["https://example.com/short", "https://example.com/long"],
            )
            .page("https://example.com/short", &text(150), &[])
            .page("https://example.com/long", &text(151), &[]),
    );
    let (notifier, mut rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer, crawler_config(10, 2), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    // A short home page is still emitted
    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec![ROOT, "https://example.com/long"]);

    let events = drain_events(&mut rx);
    let notified: HashSet<String> = events
        .iter()
        .filter_map(|e| e.data.as_ref().map(|page| page.url.clone()))
        .collect();
    assert_eq!(
        notified,
        HashSet::from([
            ROOT.to_string(),
            "https://example.com/short".to_string(),
            "https://example.com/long".to_string()
        ])
    );
}

#[tokio::test]
async fn test_event_order_and_completion() {
    let renderer = Arc::new(
        StubRenderer::new()
            .page(
                ROOT,
                &text(500),
                &["https://example.com/a", "https://example.com/b"],
            )
            .page("https://example.com/a", &text(500), &[])
            .page("https://example.com/b", &text(500), &[]),
    );
    let (notifier, mut rx) = NotifierHandle::channel();

    let _: Vec<PageResult> = coordinator(renderer, crawler_config(10, 2), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    let events = drain_events(&mut rx);
    assert_eq!(events.len(), 4);

    let first = &events[0];
    assert_eq!(first.status, EventStatus::PageCompleted);
    assert_eq!(first.data.as_ref().map(|p| p.kind), Some(PageKind::MainPage));

    let last = events.last().unwrap();
    assert_eq!(last.status, EventStatus::Completed);
    assert_eq!(last.site_id, "site-42");
    assert!(last.data.is_none());
    assert!(last.total_time_seconds.is_some());

    assert!(events[1..3]
        .iter()
        .all(|e| e.status == EventStatus::PageCompleted
            && e.data.as_ref().map(|p| p.kind) == Some(PageKind::SupportingData)));
}

#[tokio::test]
async fn test_failed_pages_dropped_silently() {
    let renderer = Arc::new(
        StubRenderer::new()
            .page(
                ROOT,
                &text(500),
                &[
                    "https://example.com/ok",
                    "https://example.com/broken",
                    "https://example.com/missing",
                ],
            )
            .page("https://example.com/ok", &text(500), &[])
            .failing("https://example.com/broken"),
    );
    let (notifier, mut rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(10, 3), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec![ROOT, "https://example.com/ok"]);
    assert_eq!(renderer.calls().len(), 4);

    let events = drain_events(&mut rx);
    let page_events = events
        .iter()
        .filter(|e| e.status == EventStatus::PageCompleted)
        .count();
    assert_eq!(page_events, 2);
    assert_eq!(events.last().unwrap().status, EventStatus::Completed);
}

#[tokio::test]
async fn test_concurrency_cap_respected() {
    let links: Vec<String> = (0..8).map(|i| format!("https://example.com/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let mut stub = StubRenderer::new()
        .page(ROOT, &text(500), &link_refs)
        .with_delay(Duration::from_millis(30));
    for link in &links {
        stub = stub.page(link, &text(500), &[]);
    }
    let renderer = Arc::new(stub);
    let (notifier, _rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(8, 2), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(pages.len(), 9);
    assert!(renderer.max_in_flight() <= 2, "saw {}", renderer.max_in_flight());
}

#[tokio::test]
async fn test_pages_emitted_in_completion_order() {
    let slow = "https://example.com/a";
    let fast = "https://example.com/bb";
    let renderer = Arc::new(
        StubRenderer::new()
            .page(ROOT, &text(500), &[fast, slow])
            .page(slow, &text(500), &[])
            .page(fast, &text(500), &[])
            .delay_for(slow, Duration::from_millis(200)),
    );
    let (notifier, _rx) = NotifierHandle::channel();

    let pages: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(5, 2), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    let emitted: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(emitted, vec![ROOT, fast, slow]);

    assert_eq!(
        prioritize(vec![fast.to_string(), slow.to_string()], 5),
        vec![slow.to_string(), fast.to_string()]
    );
    assert_eq!(renderer.calls().len(), 3);
}

#[tokio::test]
async fn test_single_render_at_a_time_by_default() {
    let mut stub = StubRenderer::new()
        .page(
            ROOT,
            &text(500),
            &["https://example.com/a", "https://example.com/b", "https://example.com/c"],
        )
        .with_delay(Duration::from_millis(20));
    for link in ["https://example.com/a", "https://example.com/b", "https://example.com/c"] {
        stub = stub.page(link, &text(500), &[]);
    }
    let renderer = Arc::new(stub);
    let (notifier, _rx) = NotifierHandle::channel();

    let default_cap = CrawlerConfig::new(10).max_concurrent_renders;

    let _: Vec<PageResult> = coordinator(renderer.clone(), crawler_config(10, default_cap), notifier)
        .start(ROOT)
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(renderer.max_in_flight(), 1);
}

#[tokio::test]
async fn test_home_failure_aborts_without_output() {
    let renderer = Arc::new(
        StubRenderer::new()
            .failing(ROOT)
            .page("https://example.com/a", &text(500), &[]),
    );
    let (notifier, mut rx) = NotifierHandle::channel();

    let result = coordinator(renderer.clone(), crawler_config(10, 1), notifier)
        .start("https://example.com/a")
        .await;

    assert!(matches!(result, Err(ScrapeError::HomePage { .. })));
    assert_eq!(renderer.calls(), vec![ROOT.to_string()]);
    assert!(drain_events(&mut rx).is_empty());
}

#[tokio::test]
async fn test_dropping_stream_stops_crawl() {
    let renderer = Arc::new(
        StubRenderer::new()
            .page(ROOT, &text(500), &["https://example.com/slow"])
            .page("https://example.com/slow", &text(500), &[])
            .with_delay(Duration::from_millis(10)),
    );
    let (notifier, mut rx) = NotifierHandle::channel();

    let mut stream = coordinator(renderer, crawler_config(10, 1), notifier)
        .start(ROOT)
        .await
        .unwrap();
    let first = stream.next().await.unwrap();
    assert_eq!(first.kind, PageKind::MainPage);
    drop(stream);

    let events = drain_events(&mut rx);
    assert!(events.iter().all(|e| e.status != EventStatus::Completed));
}
